//! Configuration types for the scheduling engine.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// Tuning knobs for a scheduling run.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulingConfig {
    /// Largest effort a single ticket may carry; one sprint must be able to hold it.
    #[pyo3(get, set)]
    pub max_ticket_dev_days: u32,
    /// Level assigned to tickets caught in a same-epic dependency cycle.
    #[pyo3(get, set)]
    pub cyclic_level: u32,
    /// Fixed time zone, as minutes east of UTC, used to resolve sprint timestamps.
    #[pyo3(get, set)]
    pub utc_offset_minutes: i32,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_ticket_dev_days: 10,
            cyclic_level: 999,
            utc_offset_minutes: 0,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl SchedulingConfig {
    #[new]
    #[pyo3(signature = (
        max_ticket_dev_days=None,
        cyclic_level=None,
        utc_offset_minutes=None,
        verbosity=None
    ))]
    fn new(
        max_ticket_dev_days: Option<u32>,
        cyclic_level: Option<u32>,
        utc_offset_minutes: Option<i32>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            max_ticket_dev_days: max_ticket_dev_days.unwrap_or(defaults.max_ticket_dev_days),
            cyclic_level: cyclic_level.unwrap_or(defaults.cyclic_level),
            utc_offset_minutes: utc_offset_minutes.unwrap_or(defaults.utc_offset_minutes),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulingConfig(max_ticket_dev_days={}, utc_offset_minutes={}, verbosity={})",
            self.max_ticket_dev_days, self.utc_offset_minutes, self.verbosity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SchedulingConfig::default();
        assert_eq!(config.max_ticket_dev_days, 10);
        assert_eq!(config.cyclic_level, 999);
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SchedulingConfig =
            serde_json::from_str(r#"{"utcOffsetMinutes": -300}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.max_ticket_dev_days, 10);
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let json = serde_json::to_string(&SchedulingConfig::default()).unwrap();
        assert!(json.contains("\"maxTicketDevDays\":10"));
        assert!(json.contains("\"cyclicLevel\":999"));
        assert!(!json.contains("max_ticket_dev_days"));
    }
}
