//! Roll placed tickets up into per-epic and whole-project results.

use crate::calendar::WorkCalendar;
use crate::capacity::CapacityMap;
use crate::critical_path::mark_critical_path;
use crate::models::{Epic, ScheduleResult, ScheduledEpic, ScheduledTicket};

/// Mark the epic's critical path and compute its totals and span.
pub fn assemble_epic(epic: &Epic, mut tickets: Vec<ScheduledTicket>) -> ScheduledEpic {
    mark_critical_path(&mut tickets);

    let total_dev_days = tickets
        .iter()
        .fold(0u32, |acc, t| acc.saturating_add(t.ticket.dev_days));
    let start_day = tickets.iter().map(|t| t.start_day).min();
    let end_day = tickets.iter().map(|t| t.end_day).max();

    ScheduledEpic {
        epic: epic.clone(),
        tickets,
        total_dev_days,
        start_day,
        end_day,
    }
}

/// Build the final result. Epics are ordered by `total_dev_days`, largest first;
/// equal totals keep their incoming order.
pub fn assemble_result(
    mut epics: Vec<ScheduledEpic>,
    map: CapacityMap,
    calendar: &WorkCalendar,
    unplaced_commit_tickets: Vec<String>,
) -> ScheduleResult {
    epics.sort_by(|a, b| b.total_dev_days.cmp(&a.total_dev_days));

    let project_start_date = map.start_date();
    let total_days = epics
        .iter()
        .flat_map(|e| e.tickets.iter())
        .map(|t| t.end_day)
        .max()
        .unwrap_or(0);
    let total_dev_days = epics
        .iter()
        .fold(0u32, |acc, e| acc.saturating_add(e.total_dev_days));
    let scheduled_tickets = epics.iter().map(|e| e.tickets.len()).sum();
    let project_end_date = calendar.add_work_days(project_start_date, total_days);

    let (day_capacities, sprints) = map.into_parts();

    ScheduleResult {
        epics,
        sprints,
        day_capacities,
        project_start_date,
        project_end_date,
        total_days,
        total_dev_days,
        scheduled_tickets,
        unplaced_commit_tickets,
    }
}
