//! Work-day calendar primitives in one fixed time zone.
//!
//! A work day is any calendar day that is not Saturday or Sunday.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc, Weekday,
};

use crate::scheduler::ScheduleError;

/// Timestamp layouts accepted besides RFC 3339. The first ones carry an offset
/// (`2025-01-06T09:00:00.000+0000` is what issue trackers usually send).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Calendar resolving dates in a configured, fixed UTC offset.
#[derive(Clone, Copy, Debug)]
pub struct WorkCalendar {
    offset: FixedOffset,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl WorkCalendar {
    /// Create a calendar for the given offset in minutes east of UTC.
    pub fn new(utc_offset_minutes: i32) -> Result<Self, ScheduleError> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ScheduleError::InvalidConfig(format!(
                    "UTC offset out of range: {} minutes",
                    utc_offset_minutes
                ))
            })?;
        Ok(Self { offset })
    }

    /// Resolve an ISO date or timestamp to a calendar date in this calendar's zone.
    ///
    /// Timestamps with an offset are converted first; dates and naive timestamps
    /// are taken as already local.
    pub fn parse_date(&self, iso: &str) -> Option<NaiveDate> {
        let iso = iso.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
            return Some(dt.with_timezone(&self.offset).date_naive());
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(iso, fmt) {
                return Some(dt.with_timezone(&self.offset).date_naive());
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(iso, fmt) {
                return Some(dt.date());
            }
        }
        NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
    }

    #[inline]
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Advance `n` work days from `date`. Weekends are stepped over.
    pub fn add_work_days(&self, date: NaiveDate, n: usize) -> NaiveDate {
        let mut current = date;
        let mut remaining = n;
        while remaining > 0 {
            current = match current.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => return current,
            };
            if !self.is_weekend(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Count work days in `[start, end)`.
    pub fn work_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|day| *day < end)
            .filter(|day| !self.is_weekend(*day))
            .count() as u32
    }

    /// Work days in `[start, end)`, in calendar order.
    pub fn work_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day < end)
            .filter(|day| !self.is_weekend(*day))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        let cal = WorkCalendar::default();
        assert_eq!(cal.parse_date("2025-01-06"), Some(d(2025, 1, 6)));
        assert_eq!(cal.parse_date(" 2025-01-06 "), Some(d(2025, 1, 6)));
        assert_eq!(cal.parse_date("not a date"), None);
        assert_eq!(cal.parse_date(""), None);
    }

    #[test]
    fn test_parse_timestamp_converts_to_configured_zone() {
        let utc = WorkCalendar::new(0).unwrap();
        let eastern = WorkCalendar::new(-5 * 60).unwrap();

        // 23:30 in UTC-5 is already the next day in UTC
        assert_eq!(
            utc.parse_date("2025-01-06T23:30:00.000-0500"),
            Some(d(2025, 1, 7))
        );
        assert_eq!(
            eastern.parse_date("2025-01-06T23:30:00.000-0500"),
            Some(d(2025, 1, 6))
        );
        assert_eq!(
            eastern.parse_date("2025-01-07T02:00:00Z"),
            Some(d(2025, 1, 6))
        );
        assert_eq!(utc.parse_date("2025-01-06T09:00:00"), Some(d(2025, 1, 6)));
    }

    #[test]
    fn test_invalid_offset_rejected() {
        assert!(WorkCalendar::new(24 * 60).is_err());
        assert!(WorkCalendar::new(14 * 60).is_ok());
    }

    #[test]
    fn test_is_weekend() {
        let cal = WorkCalendar::default();
        assert!(!cal.is_weekend(d(2025, 1, 10))); // Friday
        assert!(cal.is_weekend(d(2025, 1, 11))); // Saturday
        assert!(cal.is_weekend(d(2025, 1, 12))); // Sunday
        assert!(!cal.is_weekend(d(2025, 1, 13))); // Monday
    }

    #[test]
    fn test_add_work_days_skips_weekend() {
        let cal = WorkCalendar::default();
        assert_eq!(cal.add_work_days(d(2025, 1, 6), 0), d(2025, 1, 6));
        assert_eq!(cal.add_work_days(d(2025, 1, 6), 4), d(2025, 1, 10));
        assert_eq!(cal.add_work_days(d(2025, 1, 6), 5), d(2025, 1, 13));
        assert_eq!(cal.add_work_days(d(2025, 1, 10), 1), d(2025, 1, 13));
    }

    #[test]
    fn test_work_days_between_is_half_open() {
        let cal = WorkCalendar::default();
        assert_eq!(cal.work_days_between(d(2025, 1, 6), d(2025, 1, 20)), 10);
        assert_eq!(cal.work_days_between(d(2025, 1, 6), d(2025, 1, 6)), 0);
        assert_eq!(cal.work_days_between(d(2025, 1, 11), d(2025, 1, 13)), 0);
        assert_eq!(cal.work_days_in_range(d(2025, 1, 9), d(2025, 1, 14)).len(), 3);
    }
}
