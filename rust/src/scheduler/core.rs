//! Sprint scheduler: validation, tiered placement, and result assembly.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::calendar::WorkCalendar;
use crate::capacity::CapacityMap;
use crate::config::SchedulingConfig;
use crate::leveling::level_epic;
use crate::models::{ScheduleInput, ScheduleResult, ScheduledEpic, ScheduledTicket, Ticket};
use crate::{log_changes, log_debug};

use super::aggregate::{assemble_epic, assemble_result};
use super::ordering::{order_epics, EpicPlan, PlacementPolicy};
use super::placement::Placer;

/// Errors that abort a scheduling run. No partial result is produced.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Tickets exceed {max} dev days and cannot fit in one sprint: {keys:?}")]
    EstimateTooLarge { keys: Vec<String>, max: u32 },
    #[error("Tickets have a zero dev-day estimate: {keys:?}")]
    EmptyEstimate { keys: Vec<String> },
    #[error("No sprint has both a capacity configuration and valid start/end dates")]
    NoSchedulableSprints,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),
}

/// Schedules epics and tickets onto sprints.
///
/// Each call to [`SprintScheduler::schedule`] builds and discards its own capacity
/// map, so repeated runs over the same input give the same result.
pub struct SprintScheduler {
    input: ScheduleInput,
    config: SchedulingConfig,
    calendar: WorkCalendar,
}

impl SprintScheduler {
    pub fn new(input: ScheduleInput, config: SchedulingConfig) -> Result<Self, ScheduleError> {
        let calendar = WorkCalendar::new(config.utc_offset_minutes)?;
        Ok(Self {
            input,
            config,
            calendar,
        })
    }

    /// Run the scheduling algorithm.
    pub fn schedule(&self) -> Result<ScheduleResult, ScheduleError> {
        let verbosity = self.config.verbosity;

        // Phase 0: every estimate must be in 1..=max
        self.validate_estimates()?;

        // Phase 1: day sequence
        let mut map = CapacityMap::build(
            &self.input.sprints,
            &self.input.sprint_capacities,
            self.input.max_developers,
            &self.calendar,
            verbosity,
        )?;
        log_changes!(
            verbosity,
            "Capacity map: {} work days across {} sprints",
            map.len(),
            map.sprints().len()
        );

        // Phase 2: per-epic leveling and tier ordering
        let tiers = order_epics(self.build_plans());

        // Phase 3: placement, commit tier first
        let mut placed: FxHashMap<&str, Vec<ScheduledTicket>> = FxHashMap::default();
        let unplaced = {
            let mut placer = Placer::new(&mut map, verbosity);
            for (tier, plans) in &tiers {
                let policy = PlacementPolicy::for_tier(*tier);
                log_changes!(
                    verbosity,
                    "Placing {:?} tier ({} epics, {:?})",
                    tier,
                    plans.len(),
                    policy
                );
                for plan in plans {
                    let tickets = match policy {
                        PlacementPolicy::Linear => placer.place_linear(plan),
                        PlacementPolicy::Fill => placer.place_fill(plan),
                    };
                    placed.insert(plan.epic.key.as_str(), tickets);
                }
            }
            placer.into_unplaced()
        };

        // Phase 4: critical paths and roll-up, in input epic order before sorting
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let epics: Vec<ScheduledEpic> = self
            .input
            .epics
            .iter()
            .filter(|epic| seen.insert(epic.key.as_str()))
            .map(|epic| {
                let tickets = placed.remove(epic.key.as_str()).unwrap_or_default();
                assemble_epic(epic, tickets)
            })
            .collect();

        let result = assemble_result(epics, map, &self.calendar, unplaced);
        log_changes!(
            verbosity,
            "Scheduled {} tickets over {} days, ending {}",
            result.scheduled_tickets,
            result.total_days,
            result.project_end_date
        );
        Ok(result)
    }

    fn validate_estimates(&self) -> Result<(), ScheduleError> {
        let max = self.config.max_ticket_dev_days;
        let keys: Vec<String> = self
            .input
            .tickets
            .iter()
            .filter(|t| t.dev_days > max)
            .map(|t| t.key.clone())
            .collect();

        if !keys.is_empty() {
            return Err(ScheduleError::EstimateTooLarge { keys, max });
        }

        let keys: Vec<String> = self
            .input
            .tickets
            .iter()
            .filter(|t| t.dev_days == 0)
            .map(|t| t.key.clone())
            .collect();
        if !keys.is_empty() {
            return Err(ScheduleError::EmptyEstimate { keys });
        }
        Ok(())
    }

    /// Group tickets by epic (input order) and level each epic. Tickets naming an
    /// unknown epic are ignored; a repeated epic key keeps its first epic.
    fn build_plans(&self) -> Vec<EpicPlan<'_>> {
        let verbosity = self.config.verbosity;
        let mut by_epic: FxHashMap<&str, Vec<&Ticket>> = FxHashMap::default();
        for ticket in &self.input.tickets {
            by_epic
                .entry(ticket.epic_key.as_str())
                .or_default()
                .push(ticket);
        }

        let mut plans = Vec::with_capacity(self.input.epics.len());
        for epic in &self.input.epics {
            let Some(tickets) = by_epic.remove(epic.key.as_str()) else {
                if !plans.iter().any(|p: &EpicPlan| p.epic.key == epic.key) {
                    plans.push(EpicPlan::new(epic, Vec::new()));
                }
                continue;
            };
            let leveled = level_epic(&tickets, self.config.cyclic_level);
            log_debug!(
                verbosity,
                "Epic {} leveled: {:?}",
                epic.key,
                leveled
                    .iter()
                    .map(|l| (l.ticket.key.as_str(), l.level, l.weight))
                    .collect::<Vec<_>>()
            );
            plans.push(EpicPlan::new(epic, leveled));
        }

        for (epic_key, tickets) in &by_epic {
            log_debug!(
                verbosity,
                "Ignoring {} tickets of unknown epic {}",
                tickets.len(),
                epic_key
            );
        }

        plans
    }
}
