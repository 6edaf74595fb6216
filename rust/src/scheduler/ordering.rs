//! Epic ordering across priority tiers.
//!
//! Tiers are processed strictly commit -> stretch -> none. Within a tier an explicit
//! `priority_override` always wins (ascending); epics without one follow, largest
//! worst-case duration first. Remaining ties keep input order.

use std::cmp::Ordering;

use crate::leveling::LeveledTicket;
use crate::models::{CommitType, Epic};

/// How tickets of a tier are placed on the day sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Shared cursor, sprint-boundary aware, capacity deducted without checks.
    Linear,
    /// Independent search from day 0 for a span with capacity left on every day.
    Fill,
}

impl PlacementPolicy {
    pub fn for_tier(tier: CommitType) -> Self {
        match tier {
            CommitType::Commit => Self::Linear,
            CommitType::Stretch | CommitType::NoCommitment => Self::Fill,
        }
    }
}

/// An epic with its tickets already leveled into processing order.
#[derive(Clone, Debug)]
pub struct EpicPlan<'a> {
    pub epic: &'a Epic,
    pub tickets: Vec<LeveledTicket<'a>>,
}

impl<'a> EpicPlan<'a> {
    pub fn new(epic: &'a Epic, tickets: Vec<LeveledTicket<'a>>) -> Self {
        Self { epic, tickets }
    }

    /// Sum of every ticket's `dev_days`.
    pub fn worst_case_days(&self) -> u32 {
        self.tickets
            .iter()
            .fold(0u32, |acc, t| acc.saturating_add(t.ticket.dev_days))
    }

    fn sort_key(&self) -> EpicSortKey {
        EpicSortKey {
            tier: self.epic.commit_type,
            priority_override: self.epic.priority_override,
            worst_case_days: self.worst_case_days(),
        }
    }
}

/// Sort key for epic placement order (lower = placed earlier).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpicSortKey {
    pub tier: CommitType,
    pub priority_override: Option<i32>,
    pub worst_case_days: u32,
}

impl Ord for EpicSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier.cmp(&other.tier).then_with(|| {
            match (self.priority_override, other.priority_override) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => other.worst_case_days.cmp(&self.worst_case_days),
            }
        })
    }
}

impl PartialOrd for EpicSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split plans into tiers, each ordered for placement. Empty tiers are omitted.
pub fn order_epics(mut plans: Vec<EpicPlan<'_>>) -> Vec<(CommitType, Vec<EpicPlan<'_>>)> {
    plans.sort_by_cached_key(|plan| plan.sort_key());

    let mut tiers: Vec<(CommitType, Vec<EpicPlan>)> = Vec::new();
    for plan in plans {
        let tier = plan.epic.commit_type;
        match tiers.last_mut() {
            Some((last, group)) if *last == tier => group.push(plan),
            _ => tiers.push((tier, vec![plan])),
        }
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticket;

    fn make_epic(key: &str, commit_type: CommitType, priority_override: Option<i32>) -> Epic {
        Epic {
            key: key.to_string(),
            summary: String::new(),
            status: String::new(),
            commit_type,
            priority_override,
        }
    }

    fn make_ticket(key: &str, epic: &str, dev_days: u32) -> Ticket {
        Ticket {
            key: key.to_string(),
            summary: String::new(),
            status: String::new(),
            epic_key: epic.to_string(),
            dev_days,
            blocked_by: vec![],
            is_missing_estimate: false,
        }
    }

    fn plan<'a>(epic: &'a Epic, tickets: &'a [Ticket]) -> EpicPlan<'a> {
        EpicPlan::new(
            epic,
            tickets
                .iter()
                .map(|ticket| LeveledTicket {
                    ticket,
                    level: 0,
                    weight: ticket.dev_days,
                })
                .collect(),
        )
    }

    fn keys(tiers: &[(CommitType, Vec<EpicPlan>)]) -> Vec<Vec<String>> {
        tiers
            .iter()
            .map(|(_, plans)| plans.iter().map(|p| p.epic.key.clone()).collect())
            .collect()
    }

    #[test]
    fn test_policy_per_tier() {
        assert_eq!(
            PlacementPolicy::for_tier(CommitType::Commit),
            PlacementPolicy::Linear
        );
        assert_eq!(
            PlacementPolicy::for_tier(CommitType::Stretch),
            PlacementPolicy::Fill
        );
        assert_eq!(
            PlacementPolicy::for_tier(CommitType::NoCommitment),
            PlacementPolicy::Fill
        );
    }

    #[test]
    fn test_tiers_in_order() {
        let none = make_epic("N", CommitType::NoCommitment, None);
        let stretch = make_epic("S", CommitType::Stretch, None);
        let commit = make_epic("C", CommitType::Commit, None);
        let tiers = order_epics(vec![
            plan(&none, &[]),
            plan(&stretch, &[]),
            plan(&commit, &[]),
        ]);

        let order: Vec<CommitType> = tiers.iter().map(|(tier, _)| *tier).collect();
        assert_eq!(
            order,
            vec![
                CommitType::Commit,
                CommitType::Stretch,
                CommitType::NoCommitment
            ]
        );
    }

    #[test]
    fn test_larger_epics_first_without_override() {
        let small = make_epic("SMALL", CommitType::Commit, None);
        let large = make_epic("LARGE", CommitType::Commit, None);
        let small_tickets = [make_ticket("S-1", "SMALL", 2)];
        let large_tickets = [make_ticket("L-1", "LARGE", 3), make_ticket("L-2", "LARGE", 4)];

        let tiers = order_epics(vec![
            plan(&small, &small_tickets),
            plan(&large, &large_tickets),
        ]);
        assert_eq!(keys(&tiers), vec![vec!["LARGE", "SMALL"]]);
    }

    #[test]
    fn test_override_wins_over_size() {
        let big = make_epic("BIG", CommitType::Stretch, None);
        let second = make_epic("SECOND", CommitType::Stretch, Some(5));
        let first = make_epic("FIRST", CommitType::Stretch, Some(1));
        let big_tickets = [make_ticket("B-1", "BIG", 10), make_ticket("B-2", "BIG", 10)];
        let tiny = [make_ticket("T-1", "SECOND", 1)];

        let tiers = order_epics(vec![
            plan(&big, &big_tickets),
            plan(&second, &tiny),
            plan(&first, &[]),
        ]);
        assert_eq!(keys(&tiers), vec![vec!["FIRST", "SECOND", "BIG"]]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let a = make_epic("A", CommitType::Commit, None);
        let b = make_epic("B", CommitType::Commit, None);
        let tiers = order_epics(vec![plan(&b, &[]), plan(&a, &[])]);
        assert_eq!(keys(&tiers), vec![vec!["B", "A"]]);
    }

    #[test]
    fn test_worst_case_days() {
        let epic = make_epic("E", CommitType::Commit, None);
        let tickets = [make_ticket("1", "E", 3), make_ticket("2", "E", 5)];
        assert_eq!(plan(&epic, &tickets).worst_case_days(), 8);
    }
}
