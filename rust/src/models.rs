//! Core data types for the sprint scheduling engine.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scheduler::ScheduleError;

/// Scheduling priority tier of an epic. Tiers are placed strictly in declaration order.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Commit,
    Stretch,
    #[serde(rename = "none")]
    NoCommitment,
}

/// Lifecycle state of a sprint as reported by the issue tracker.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Closed,
    Future,
}

/// An initiative grouping tickets under one priority tier.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    #[pyo3(get, set)]
    pub key: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub summary: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub status: String,
    #[pyo3(get, set)]
    pub commit_type: CommitType,
    /// Lower values are placed earlier; overrides the size-based ordering.
    #[pyo3(get, set)]
    #[serde(default)]
    pub priority_override: Option<i32>,
}

#[pymethods]
impl Epic {
    #[new]
    #[pyo3(signature = (key, commit_type, summary=String::new(), status=String::new(), priority_override=None))]
    fn new(
        key: String,
        commit_type: CommitType,
        summary: String,
        status: String,
        priority_override: Option<i32>,
    ) -> Self {
        Self {
            key,
            summary,
            status,
            commit_type,
            priority_override,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Epic(key={:?}, commit_type={:?}, priority_override={:?})",
            self.key, self.commit_type, self.priority_override
        )
    }
}

/// A unit of work with an effort estimate in work days.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[pyo3(get, set)]
    pub key: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub summary: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub status: String,
    #[pyo3(get, set)]
    pub epic_key: String,
    #[pyo3(get, set)]
    pub dev_days: u32,
    /// Keys of tickets blocking this one. Only same-epic entries affect ordering.
    #[pyo3(get, set)]
    #[serde(default)]
    pub blocked_by: Vec<String>,
    /// True when `dev_days` was defaulted rather than estimated.
    #[pyo3(get, set)]
    #[serde(default)]
    pub is_missing_estimate: bool,
}

#[pymethods]
impl Ticket {
    #[new]
    #[pyo3(signature = (
        key,
        epic_key,
        dev_days,
        blocked_by=Vec::new(),
        is_missing_estimate=false,
        summary=String::new(),
        status=String::new()
    ))]
    fn new(
        key: String,
        epic_key: String,
        dev_days: u32,
        blocked_by: Vec<String>,
        is_missing_estimate: bool,
        summary: String,
        status: String,
    ) -> Self {
        Self {
            key,
            summary,
            status,
            epic_key,
            dev_days,
            blocked_by,
            is_missing_estimate,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Ticket(key={:?}, epic_key={:?}, dev_days={}, blocked_by={})",
            self.key,
            self.epic_key,
            self.dev_days,
            self.blocked_by.len()
        )
    }
}

/// A fixed calendar time box. Dates are ISO strings as delivered by the tracker;
/// the end boundary is exclusive when enumerating work days.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub name: String,
    #[pyo3(get, set)]
    pub state: SprintState,
    #[pyo3(get, set)]
    #[serde(default)]
    pub start_date: Option<String>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub end_date: Option<String>,
}

#[pymethods]
impl Sprint {
    #[new]
    #[pyo3(signature = (id, state, start_date=None, end_date=None, name=String::new()))]
    fn new(
        id: String,
        state: SprintState,
        start_date: Option<String>,
        end_date: Option<String>,
        name: String,
    ) -> Self {
        Self {
            id,
            name,
            state,
            start_date,
            end_date,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Sprint(id={:?}, state={:?}, start={:?}, end={:?})",
            self.id, self.state, self.start_date, self.end_date
        )
    }
}

/// Capacity for a single day, replacing the global default (e.g. PTO).
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityOverride {
    #[pyo3(get, set)]
    pub date: NaiveDate,
    #[pyo3(get, set)]
    pub capacity: i32,
}

#[pymethods]
impl CapacityOverride {
    #[new]
    fn new(date: NaiveDate, capacity: i32) -> Self {
        Self { date, capacity }
    }

    fn __repr__(&self) -> String {
        format!(
            "CapacityOverride(date={}, capacity={})",
            self.date, self.capacity
        )
    }
}

/// Capacity configuration attached to a sprint.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintCapacity {
    #[pyo3(get, set)]
    pub sprint_id: String,
    #[pyo3(get, set)]
    pub dev_days_capacity: i32,
    #[pyo3(get, set)]
    #[serde(default)]
    pub overrides: Vec<CapacityOverride>,
}

#[pymethods]
impl SprintCapacity {
    #[new]
    #[pyo3(signature = (sprint_id, dev_days_capacity, overrides=Vec::new()))]
    fn new(sprint_id: String, dev_days_capacity: i32, overrides: Vec<CapacityOverride>) -> Self {
        Self {
            sprint_id,
            dev_days_capacity,
            overrides,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SprintCapacity(sprint_id={:?}, dev_days_capacity={}, overrides={})",
            self.sprint_id,
            self.dev_days_capacity,
            self.overrides.len()
        )
    }
}

/// One work day in the scheduling horizon. Its position in the day sequence is
/// the global day index used by every placed ticket.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCapacity {
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub sprint_id: String,
    #[pyo3(get)]
    pub original_capacity: i32,
    /// Decremented as tickets are placed; commit-tier placement may drive it negative.
    #[pyo3(get)]
    pub remaining_capacity: i32,
    #[pyo3(get)]
    pub sprint_day_index: usize,
}

#[pymethods]
impl DayCapacity {
    fn __repr__(&self) -> String {
        format!(
            "DayCapacity(date={}, sprint_id={:?}, remaining={}/{})",
            self.date, self.sprint_id, self.remaining_capacity, self.original_capacity
        )
    }
}

/// A ticket placed on the day sequence.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTicket {
    #[pyo3(get)]
    #[serde(flatten)]
    pub ticket: Ticket,
    /// First occupied global day index.
    #[pyo3(get)]
    pub start_day: usize,
    /// One past the last occupied global day index.
    #[pyo3(get)]
    pub end_day: usize,
    #[pyo3(get)]
    pub sprint_id: String,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    /// Date of the last occupied day.
    #[pyo3(get)]
    pub end_date: NaiveDate,
    #[pyo3(get)]
    pub parallel_group: u32,
    #[pyo3(get)]
    pub critical_path_weight: u32,
    #[pyo3(get)]
    pub is_on_critical_path: bool,
    #[pyo3(get)]
    pub is_uncertain: bool,
}

#[pymethods]
impl ScheduledTicket {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTicket(key={:?}, days={}..{}, sprint_id={:?})",
            self.ticket.key, self.start_day, self.end_day, self.sprint_id
        )
    }
}

/// An epic with its placed tickets and overall span.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEpic {
    #[pyo3(get)]
    #[serde(flatten)]
    pub epic: Epic,
    #[pyo3(get)]
    pub tickets: Vec<ScheduledTicket>,
    #[pyo3(get)]
    pub total_dev_days: u32,
    #[pyo3(get)]
    pub start_day: Option<usize>,
    #[pyo3(get)]
    pub end_day: Option<usize>,
}

#[pymethods]
impl ScheduledEpic {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledEpic(key={:?}, tickets={}, total_dev_days={})",
            self.epic.key,
            self.tickets.len(),
            self.total_dev_days
        )
    }
}

/// A sprint that took part in scheduling, with its parsed dates and capacity.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSummary {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub state: SprintState,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub end_date: NaiveDate,
    #[pyo3(get)]
    pub dev_days_capacity: i32,
    /// Work days in `[start_date, end_date)`.
    #[pyo3(get)]
    pub work_days: u32,
    /// Sum of the original capacity of the days this sprint owns.
    #[pyo3(get)]
    pub total_capacity: i32,
}

#[pymethods]
impl SprintSummary {
    fn __repr__(&self) -> String {
        format!(
            "SprintSummary(id={:?}, {}..{}, work_days={})",
            self.id, self.start_date, self.end_date, self.work_days
        )
    }
}

/// Output of a scheduling run.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    /// Sorted by `total_dev_days`, largest first.
    #[pyo3(get)]
    pub epics: Vec<ScheduledEpic>,
    #[pyo3(get)]
    pub sprints: Vec<SprintSummary>,
    #[pyo3(get)]
    pub day_capacities: Vec<DayCapacity>,
    #[pyo3(get)]
    pub project_start_date: NaiveDate,
    #[pyo3(get)]
    pub project_end_date: NaiveDate,
    /// Largest `end_day` over all placed tickets.
    #[pyo3(get)]
    pub total_days: usize,
    #[pyo3(get)]
    pub total_dev_days: u32,
    #[pyo3(get)]
    pub scheduled_tickets: usize,
    /// Commit-tier tickets left out because no remaining sprint could hold them.
    #[pyo3(get)]
    #[serde(default)]
    pub unplaced_commit_tickets: Vec<String>,
}

impl ScheduleResult {
    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, ScheduleError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Iterate over every placed ticket across all epics.
    pub fn tickets(&self) -> impl Iterator<Item = &ScheduledTicket> {
        self.epics.iter().flat_map(|e| e.tickets.iter())
    }

    /// Find a placed ticket by key.
    pub fn ticket(&self, key: &str) -> Option<&ScheduledTicket> {
        self.tickets().find(|t| t.ticket.key == key)
    }
}

#[pymethods]
impl ScheduleResult {
    /// Day indices whose remaining capacity went negative.
    ///
    /// Commit-tier placement does not check capacity, so these are the days
    /// where the plan overdraws its staffing.
    pub fn overallocated_days(&self) -> Vec<usize> {
        self.day_capacities
            .iter()
            .enumerate()
            .filter(|(_, day)| day.remaining_capacity < 0)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(epics={}, scheduled_tickets={}, total_days={}, end={})",
            self.epics.len(),
            self.scheduled_tickets,
            self.total_days,
            self.project_end_date
        )
    }
}

/// Everything the engine consumes. Field values must already be resolved by the
/// mapping layer (defaulted `dev_days`, parsed `blocked_by`, resolved `commit_type`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub sprint_capacities: Vec<SprintCapacity>,
    /// Global default daily capacity.
    pub max_developers: i32,
}

impl ScheduleInput {
    /// Parse the engine input contract from JSON.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        Ok(serde_json::from_str(json)?)
    }
}
