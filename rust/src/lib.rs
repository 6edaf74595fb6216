//! Rust implementation of the sprint planner scheduling engine.
//!
//! Turns epics, tickets, sprints and per-sprint capacity into a day-by-day plan:
//! every ticket gets a start and end work day inside a single sprint, a parallel
//! group, a critical-path weight and an uncertainty flag.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

pub mod logging;
pub mod calendar;
pub mod capacity;
mod config;
pub mod critical_path;
mod interner;
pub mod leveling;
mod models;
pub mod scheduler;

pub use calendar::WorkCalendar;
pub use capacity::CapacityMap;
pub use config::SchedulingConfig;
pub use critical_path::{critical_path, mark_critical_path};
pub use leveling::{level_epic, LeveledTicket};
pub use models::{
    CapacityOverride, CommitType, DayCapacity, Epic, ScheduleInput, ScheduleResult,
    ScheduledEpic, ScheduledTicket, Sprint, SprintCapacity, SprintState, SprintSummary, Ticket,
};
pub use scheduler::{ScheduleError, SprintScheduler};

/// Schedule `input` with `config`.
pub fn schedule(
    input: ScheduleInput,
    config: &SchedulingConfig,
) -> Result<ScheduleResult, ScheduleError> {
    SprintScheduler::new(input, config.clone())?.schedule()
}

fn to_py_err(e: ScheduleError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Run the sprint scheduler.
///
/// # Arguments
/// * `epics` - Epics with their resolved commit tier and optional priority override
/// * `tickets` - Tickets with resolved `dev_days` and same-epic `blocked_by` keys
/// * `sprints` - Candidate sprint windows
/// * `sprint_capacities` - Capacity configuration; sprints without one are skipped
/// * `max_developers` - Default daily capacity for days without an override
/// * `config` - Scheduling configuration (defaults apply when omitted)
///
/// # Raises
/// * ValueError if a ticket is too large, no sprint is schedulable, or the config is invalid
#[pyfunction]
#[pyo3(signature = (epics, tickets, sprints, sprint_capacities, max_developers, config=None))]
fn schedule_sprints(
    epics: Vec<Epic>,
    tickets: Vec<Ticket>,
    sprints: Vec<Sprint>,
    sprint_capacities: Vec<SprintCapacity>,
    max_developers: i32,
    config: Option<SchedulingConfig>,
) -> PyResult<ScheduleResult> {
    let input = ScheduleInput {
        epics,
        tickets,
        sprints,
        sprint_capacities,
        max_developers,
    };
    schedule(input, &config.unwrap_or_default()).map_err(to_py_err)
}

/// Run the sprint scheduler over a camelCase JSON input document and return the
/// result as a camelCase JSON document.
#[pyfunction]
#[pyo3(signature = (input_json, config=None))]
fn schedule_sprints_json(input_json: &str, config: Option<SchedulingConfig>) -> PyResult<String> {
    let input = ScheduleInput::from_json(input_json).map_err(to_py_err)?;
    schedule(input, &config.unwrap_or_default())
        .and_then(|result| result.to_json())
        .map_err(to_py_err)
}

/// The sprint_planner.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input types
    m.add_class::<CommitType>()?;
    m.add_class::<SprintState>()?;
    m.add_class::<Epic>()?;
    m.add_class::<Ticket>()?;
    m.add_class::<Sprint>()?;
    m.add_class::<CapacityOverride>()?;
    m.add_class::<SprintCapacity>()?;

    // Result types
    m.add_class::<DayCapacity>()?;
    m.add_class::<ScheduledTicket>()?;
    m.add_class::<ScheduledEpic>()?;
    m.add_class::<SprintSummary>()?;
    m.add_class::<ScheduleResult>()?;

    // Config types
    m.add_class::<SchedulingConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(schedule_sprints, m)?)?;
    m.add_function(wrap_pyfunction!(schedule_sprints_json, m)?)?;

    Ok(())
}
