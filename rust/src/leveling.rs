//! Dependency leveling within a single epic.
//!
//! Builds the blocker -> dependent graph restricted to same-epic edges, computes a
//! downstream weight for every ticket and groups tickets into topological levels
//! with Kahn's algorithm. Tickets caught in a cycle are never rejected; they are
//! appended after everything else with the configured cyclic level and weight 0.

use rustc_hash::FxHashSet;

use crate::interner::{TicketId, TicketInterner};
use crate::models::Ticket;

/// A ticket annotated with its level and downstream weight, in processing order.
#[derive(Clone, Debug, PartialEq)]
pub struct LeveledTicket<'a> {
    pub ticket: &'a Ticket,
    /// Topological level (0 = no same-epic blockers).
    pub level: u32,
    /// `dev_days` plus the weight of every direct dependent.
    pub weight: u32,
}

/// Same-epic dependency graph over interned ticket IDs.
struct EpicGraph<'a> {
    tickets: Vec<&'a Ticket>,
    dependents: Vec<Vec<TicketId>>,
    in_degree: Vec<usize>,
}

impl<'a> EpicGraph<'a> {
    fn new(epic_tickets: &[&'a Ticket]) -> Self {
        let mut interner = TicketInterner::with_capacity(epic_tickets.len());
        let mut tickets: Vec<&'a Ticket> = Vec::with_capacity(epic_tickets.len());
        for &ticket in epic_tickets {
            // Duplicate keys: the first ticket wins.
            if interner.get(&ticket.key).is_none() {
                interner.intern(&ticket.key);
                tickets.push(ticket);
            }
        }

        let n = tickets.len();
        let mut dependents: Vec<Vec<TicketId>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for (idx, ticket) in tickets.iter().enumerate() {
            let mut seen: FxHashSet<TicketId> = FxHashSet::default();
            for blocker in &ticket.blocked_by {
                // Keys outside this epic have no ID and are ignored.
                let Some(blocker_id) = interner.get(blocker) else {
                    continue;
                };
                if seen.insert(blocker_id) {
                    dependents[blocker_id as usize].push(idx as TicketId);
                    in_degree[idx] += 1;
                }
            }
        }

        Self {
            tickets,
            dependents,
            in_degree,
        }
    }

    /// Kahn's algorithm, one level at a time. Tickets left out are on or behind a cycle.
    fn levels(&self) -> Vec<Vec<TicketId>> {
        let mut in_degree = self.in_degree.clone();
        let mut current: Vec<TicketId> = (0..self.tickets.len() as TicketId)
            .filter(|&id| in_degree[id as usize] == 0)
            .collect();
        let mut levels: Vec<Vec<TicketId>> = Vec::new();

        while !current.is_empty() {
            let mut next: Vec<TicketId> = Vec::new();
            for &id in &current {
                for &dependent in &self.dependents[id as usize] {
                    let degree = &mut in_degree[dependent as usize];
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(dependent);
                    }
                }
            }
            levels.push(current);
            current = next;
        }

        levels
    }

    /// Downstream weights, computed bottom-up over the levels so no recursion is needed.
    /// Unreached (cyclic) tickets keep weight 0 and contribute nothing upstream.
    fn weights(&self, levels: &[Vec<TicketId>]) -> Vec<u32> {
        let mut weights = vec![0u32; self.tickets.len()];
        for level in levels.iter().rev() {
            for &id in level {
                let downstream: u32 = self.dependents[id as usize]
                    .iter()
                    .fold(0u32, |acc, &d| acc.saturating_add(weights[d as usize]));
                weights[id as usize] = self.tickets[id as usize]
                    .dev_days
                    .saturating_add(downstream);
            }
        }
        weights
    }
}

/// Order an epic's tickets for placement.
///
/// Levels come in topological order; within a level heavier tickets go first, ties
/// keep input order. Tickets not reached by the sweep follow in input order.
pub fn level_epic<'a>(epic_tickets: &[&'a Ticket], cyclic_level: u32) -> Vec<LeveledTicket<'a>> {
    let graph = EpicGraph::new(epic_tickets);
    let mut levels = graph.levels();
    let weights = graph.weights(&levels);

    let mut ordered: Vec<LeveledTicket<'a>> = Vec::with_capacity(graph.tickets.len());
    let mut reached = vec![false; graph.tickets.len()];

    for (level_idx, level) in levels.iter_mut().enumerate() {
        level.sort_by(|a, b| {
            weights[*b as usize]
                .cmp(&weights[*a as usize])
                .then(a.cmp(b))
        });
        for &id in level.iter() {
            reached[id as usize] = true;
            ordered.push(LeveledTicket {
                ticket: graph.tickets[id as usize],
                level: level_idx as u32,
                weight: weights[id as usize],
            });
        }
    }

    for (idx, &ticket) in graph.tickets.iter().enumerate() {
        if !reached[idx] {
            ordered.push(LeveledTicket {
                ticket,
                level: cyclic_level,
                weight: 0,
            });
        }
    }

    ordered
}
