//! Greedy placement of leveled tickets onto the capacity map.

use rustc_hash::FxHashMap;

use crate::capacity::CapacityMap;
use crate::leveling::LeveledTicket;
use crate::models::{ScheduledTicket, Ticket};
use crate::{log_changes, log_checks};

use super::ordering::EpicPlan;

/// Flag every ticket processed after one with a missing estimate.
///
/// This is a fold over processing order: a ticket's own missing estimate does not
/// mark it, only those after it.
pub fn uncertainty_flags(tickets: &[LeveledTicket<'_>]) -> Vec<bool> {
    tickets
        .iter()
        .scan(false, |seen_missing, leveled| {
            let uncertain = *seen_missing;
            *seen_missing |= leveled.ticket.is_missing_estimate;
            Some(uncertain)
        })
        .collect()
}

/// First day at or after `earliest` where a `len`-day span fits inside one sprint.
/// Spans that would cross a sprint boundary jump to the next sprint's first day.
pub fn find_linear_slot(map: &CapacityMap, earliest: usize, len: usize) -> Option<usize> {
    let mut day = earliest;
    while day < map.len() {
        if map.fits_in_sprint(day, len) {
            return Some(day);
        }
        day = map.sprint_end(day);
    }
    None
}

/// First day at or after `earliest` where a `len`-day span fits inside one sprint
/// and every day of it still has capacity.
pub fn find_fill_slot(map: &CapacityMap, earliest: usize, len: usize) -> Option<usize> {
    (earliest..map.len()).find(|&day| map.fits_in_sprint(day, len) && map.has_capacity(day, len))
}

/// Latest end day among the ticket's blockers placed so far in the same epic.
fn blockers_end(ticket: &Ticket, placed_end: &FxHashMap<&str, usize>) -> usize {
    ticket
        .blocked_by
        .iter()
        .filter_map(|key| placed_end.get(key.as_str()).copied())
        .max()
        .unwrap_or(0)
}

/// Places epics onto a capacity map it borrows mutably for the whole run.
pub struct Placer<'m> {
    map: &'m mut CapacityMap,
    /// Next free day for the commit tier, shared across its epics.
    cursor: usize,
    /// Commit tickets no remaining sprint could hold, in placement order.
    unplaced: Vec<String>,
    verbosity: u8,
}

impl<'m> Placer<'m> {
    pub fn new(map: &'m mut CapacityMap, verbosity: u8) -> Self {
        Self {
            map,
            cursor: 0,
            unplaced: Vec::new(),
            verbosity,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn unplaced(&self) -> &[String] {
        &self.unplaced
    }

    pub fn into_unplaced(self) -> Vec<String> {
        self.unplaced
    }

    /// Commit-tier placement.
    ///
    /// Tickets start no earlier than the shared cursor and their placed blockers.
    /// Capacity is deducted without checking it, so days may go negative. After the
    /// epic, the cursor moves to the furthest end day it reached.
    pub fn place_linear(&mut self, plan: &EpicPlan<'_>) -> Vec<ScheduledTicket> {
        let flags = uncertainty_flags(&plan.tickets);
        let mut placed_end: FxHashMap<&str, usize> = FxHashMap::default();
        let mut scheduled: Vec<ScheduledTicket> = Vec::with_capacity(plan.tickets.len());

        for (leveled, uncertain) in plan.tickets.iter().zip(flags) {
            let ticket = leveled.ticket;
            let len = ticket.dev_days as usize;
            let earliest = blockers_end(ticket, &placed_end).max(self.cursor);

            let Some(start) = find_linear_slot(self.map, earliest, len) else {
                tracing::warn!(
                    epic = %plan.epic.key,
                    ticket = %ticket.key,
                    dev_days = ticket.dev_days,
                    "No remaining sprint can hold commit ticket, leaving it unscheduled"
                );
                self.unplaced.push(ticket.key.clone());
                continue;
            };

            if start != earliest {
                log_checks!(
                    self.verbosity,
                    "    {} does not fit at day {}, moved to day {}",
                    ticket.key,
                    earliest,
                    start
                );
            }

            self.map.consume(start, len);
            placed_end.insert(ticket.key.as_str(), start + len);
            if let Some(placed) = self.build(leveled, start, uncertain) {
                scheduled.push(placed);
            }
        }

        let epic_end = scheduled.iter().map(|t| t.end_day).max().unwrap_or(0);
        self.cursor = self.cursor.max(epic_end);
        log_changes!(
            self.verbosity,
            "  Commit epic {} placed {} tickets, cursor now at day {}",
            plan.epic.key,
            scheduled.len(),
            self.cursor
        );

        scheduled
    }

    /// Stretch-tier placement.
    ///
    /// Each epic searches from day 0 for spans with capacity on every day. The first
    /// ticket that finds no slot ends the epic: it and every ticket after it in
    /// processing order are dropped, already-placed tickets are kept.
    pub fn place_fill(&mut self, plan: &EpicPlan<'_>) -> Vec<ScheduledTicket> {
        let flags = uncertainty_flags(&plan.tickets);
        let mut placed_end: FxHashMap<&str, usize> = FxHashMap::default();
        let mut scheduled: Vec<ScheduledTicket> = Vec::with_capacity(plan.tickets.len());

        for (idx, (leveled, uncertain)) in plan.tickets.iter().zip(flags).enumerate() {
            let ticket = leveled.ticket;
            let len = ticket.dev_days as usize;
            let earliest = blockers_end(ticket, &placed_end);

            let Some(start) = find_fill_slot(self.map, earliest, len) else {
                log_changes!(
                    self.verbosity,
                    "  No capacity for {} in epic {}, dropping it and {} later tickets",
                    ticket.key,
                    plan.epic.key,
                    plan.tickets.len() - idx - 1
                );
                break;
            };

            self.map.consume(start, len);
            placed_end.insert(ticket.key.as_str(), start + len);
            if let Some(placed) = self.build(leveled, start, uncertain) {
                log_checks!(
                    self.verbosity,
                    "    Placed {} at days {}..{}",
                    ticket.key,
                    start,
                    start + len
                );
                scheduled.push(placed);
            }
        }

        log_changes!(
            self.verbosity,
            "  Epic {} placed {}/{} tickets",
            plan.epic.key,
            scheduled.len(),
            plan.tickets.len()
        );

        scheduled
    }

    fn build(
        &self,
        leveled: &LeveledTicket<'_>,
        start: usize,
        uncertain: bool,
    ) -> Option<ScheduledTicket> {
        let end = start + leveled.ticket.dev_days as usize;
        let start_date = self.map.date(start)?;
        let end_date = if end > start {
            self.map.date(end - 1)?
        } else {
            start_date
        };

        Some(ScheduledTicket {
            ticket: leveled.ticket.clone(),
            start_day: start,
            end_day: end,
            sprint_id: self.map.sprint_id(start)?.to_string(),
            start_date,
            end_date,
            parallel_group: leveled.level,
            critical_path_weight: leveled.weight,
            is_on_critical_path: false,
            is_uncertain: uncertain,
        })
    }
}
