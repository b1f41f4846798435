//! Calendar and timestamp helpers.
//!
//! # Design
//!
//! Trajectory instants are `chrono::NaiveDateTime` values: the generator
//! simulates a single, timezone-free local clock, and output is written in
//! the `YYYY-MM-DD HH:MM:SS.fff` form MobilityDB accepts.
//!
//! A run covers `days` consecutive calendar days starting at `start_day`.
//! Day `i` is `start_day + i`.  Every week has one non-working day
//! ([`NON_WORKING_DAY`]); no deliveries are planned on it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// A trajectory instant.
pub type Timestamp = NaiveDateTime;

/// The weekly day off.
pub const NON_WORKING_DAY: Weekday = Weekday::Sun;

/// Output format for timestamps (millisecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// `true` unless `date` falls on [`NON_WORKING_DAY`].
#[inline]
pub fn is_working_day(date: NaiveDate) -> bool {
    date.weekday() != NON_WORKING_DAY
}

/// Duration of `ms` milliseconds.
#[inline]
pub fn millis(ms: i64) -> Duration {
    Duration::milliseconds(ms)
}

/// Duration of a fractional number of minutes, rounded to the millisecond.
#[inline]
pub fn minutes_f64(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

/// Duration of a fractional number of seconds, rounded to the millisecond.
#[inline]
pub fn seconds_f64(secs: f64) -> Duration {
    Duration::milliseconds((secs * 1_000.0).round() as i64)
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS.fff`.
pub fn format_timestamp(t: Timestamp) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

// ── Calendar ──────────────────────────────────────────────────────────────────

/// The run's sequence of days.
///
/// `Calendar` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    pub start_day: NaiveDate,
    pub days: u32,
}

impl Calendar {
    pub fn new(start_day: NaiveDate, days: u32) -> Self {
        Self { start_day, days }
    }

    /// Date of day `index`, or `None` past the end of the run.
    pub fn date(&self, index: u32) -> Option<NaiveDate> {
        if index >= self.days {
            return None;
        }
        self.start_day.checked_add_signed(Duration::days(index as i64))
    }

    /// Iterator over `(day_index, date)` for the whole run.
    pub fn iter(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (0..self.days).filter_map(move |i| self.date(i).map(|d| (i, d)))
    }

    /// Number of working days in the run.
    pub fn working_days(&self) -> usize {
        self.iter().filter(|(_, d)| is_working_day(*d)).count()
    }

    /// Midnight of `date` plus `hour` hours.
    pub fn at_hour(date: NaiveDate, hour: u32) -> Option<Timestamp> {
        date.and_hms_opt(hour, 0, 0)
    }
}
