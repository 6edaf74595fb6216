//! Day-level capacity map built from sprint date ranges.
//!
//! The map is a flat, ordered sequence of work days across all schedulable sprints.
//! A day's position in the sequence is its global day index. Each sprint owns a
//! contiguous run of days, which is what lets placement check "fits in one sprint"
//! with a single lookup.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::calendar::WorkCalendar;
use crate::log_debug;
use crate::models::{DayCapacity, Sprint, SprintCapacity, SprintSummary};
use crate::scheduler::ScheduleError;

/// A sprint that has both a capacity configuration and a valid date range.
struct SprintWindow<'a> {
    sprint: &'a Sprint,
    capacity: &'a SprintCapacity,
    start: NaiveDate,
    end: NaiveDate,
}

/// Mutable, single-owner capacity buffer for one scheduling run.
#[derive(Clone, Debug)]
pub struct CapacityMap {
    days: Vec<DayCapacity>,
    /// For each day, the exclusive end index of the sprint run containing it.
    sprint_end: Vec<usize>,
    sprints: Vec<SprintSummary>,
    /// Start date of the earliest schedulable sprint, even if it holds no work days.
    start_date: NaiveDate,
}

impl CapacityMap {
    /// Build the day sequence.
    ///
    /// Sprints are walked in start-date order and each emits its work days in
    /// `[start, end)`. A date already claimed by an earlier sprint is skipped, so
    /// touching sprints never double-count their boundary. Every day's capacity is
    /// the sprint's override for that date if any, else `default_capacity` (the
    /// global per-day setting, not the sprint's own default).
    pub fn build(
        sprints: &[Sprint],
        capacities: &[SprintCapacity],
        default_capacity: i32,
        calendar: &WorkCalendar,
        verbosity: u8,
    ) -> Result<Self, ScheduleError> {
        let windows = select_windows(sprints, capacities, calendar, verbosity);
        let Some(start_date) = windows.first().map(|w| w.start) else {
            return Err(ScheduleError::NoSchedulableSprints);
        };

        let mut days: Vec<DayCapacity> = Vec::new();
        let mut sprint_end: Vec<usize> = Vec::new();
        let mut summaries: Vec<SprintSummary> = Vec::with_capacity(windows.len());
        let mut claimed: FxHashSet<NaiveDate> = FxHashSet::default();

        for window in &windows {
            let overrides: FxHashMap<NaiveDate, i32> = window
                .capacity
                .overrides
                .iter()
                .map(|o| (o.date, o.capacity))
                .collect();

            let run_start = days.len();
            for date in calendar.work_days_in_range(window.start, window.end) {
                if !claimed.insert(date) {
                    continue;
                }
                let capacity = overrides.get(&date).copied().unwrap_or(default_capacity);
                days.push(DayCapacity {
                    date,
                    sprint_id: window.sprint.id.clone(),
                    original_capacity: capacity,
                    remaining_capacity: capacity,
                    sprint_day_index: days.len() - run_start,
                });
            }
            let run_end = days.len();
            if run_start == run_end {
                log_debug!(
                    verbosity,
                    "Sprint {} has no unclaimed work days, skipping",
                    window.sprint.id
                );
                continue;
            }
            sprint_end.resize(run_end, run_end);

            log_debug!(
                verbosity,
                "Sprint {} contributes days {}..{}",
                window.sprint.id,
                run_start,
                run_end
            );

            summaries.push(SprintSummary {
                id: window.sprint.id.clone(),
                name: window.sprint.name.clone(),
                state: window.sprint.state,
                start_date: window.start,
                end_date: window.end,
                dev_days_capacity: window.capacity.dev_days_capacity,
                work_days: calendar.work_days_between(window.start, window.end),
                total_capacity: days[run_start..run_end]
                    .iter()
                    .map(|day| day.original_capacity)
                    .sum(),
            });
        }

        Ok(Self {
            days,
            sprint_end,
            sprints: summaries,
            start_date,
        })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[DayCapacity] {
        &self.days
    }

    pub fn sprints(&self) -> &[SprintSummary] {
        &self.sprints
    }

    /// Start date of the earliest schedulable sprint.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[inline]
    pub fn date(&self, day: usize) -> Option<NaiveDate> {
        self.days.get(day).map(|d| d.date)
    }

    #[inline]
    pub fn sprint_id(&self, day: usize) -> Option<&str> {
        self.days.get(day).map(|d| d.sprint_id.as_str())
    }

    /// Exclusive end index of the sprint run containing `day`.
    #[inline]
    pub fn sprint_end(&self, day: usize) -> usize {
        self.sprint_end.get(day).copied().unwrap_or(self.days.len())
    }

    /// Whether `[start, start + len)` lies inside a single sprint.
    pub fn fits_in_sprint(&self, start: usize, len: usize) -> bool {
        start < self.days.len() && start + len <= self.sprint_end(start)
    }

    /// Whether every day of `[start, start + len)` still has capacity left.
    pub fn has_capacity(&self, start: usize, len: usize) -> bool {
        self.days
            .get(start..start + len)
            .is_some_and(|span| span.iter().all(|day| day.remaining_capacity > 0))
    }

    /// Take one unit of capacity from each day of `[start, start + len)`.
    /// No floor is applied; callers that must not overdraw check first.
    pub fn consume(&mut self, start: usize, len: usize) {
        let end = (start + len).min(self.days.len());
        for day in self.days.iter_mut().take(end).skip(start) {
            day.remaining_capacity -= 1;
        }
    }

    /// Hand the day sequence and sprint summaries over to the result.
    pub fn into_parts(self) -> (Vec<DayCapacity>, Vec<SprintSummary>) {
        (self.days, self.sprints)
    }
}

/// Pick sprints with a capacity configuration and a usable date range,
/// ordered by start date.
fn select_windows<'a>(
    sprints: &'a [Sprint],
    capacities: &'a [SprintCapacity],
    calendar: &WorkCalendar,
    verbosity: u8,
) -> Vec<SprintWindow<'a>> {
    let by_sprint: FxHashMap<&str, &SprintCapacity> = capacities
        .iter()
        .rev()
        .map(|c| (c.sprint_id.as_str(), c))
        .collect();

    let mut windows: Vec<SprintWindow> = sprints
        .iter()
        .filter_map(|sprint| {
            let Some(capacity) = by_sprint.get(sprint.id.as_str()).copied() else {
                log_debug!(verbosity, "Sprint {} has no capacity, skipping", sprint.id);
                return None;
            };
            let start = sprint
                .start_date
                .as_deref()
                .and_then(|s| calendar.parse_date(s));
            let end = sprint
                .end_date
                .as_deref()
                .and_then(|s| calendar.parse_date(s));
            match (start, end) {
                (Some(start), Some(end)) if start < end => Some(SprintWindow {
                    sprint,
                    capacity,
                    start,
                    end,
                }),
                _ => {
                    log_debug!(verbosity, "Sprint {} has no usable dates, skipping", sprint.id);
                    None
                }
            }
        })
        .collect();

    windows.sort_by_key(|w| w.start);
    windows
}
