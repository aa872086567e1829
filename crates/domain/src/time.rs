//! Time and time-of-day helpers.

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta};

/// Local wall-clock timestamp used for profile resolution and daily schedules.
pub type Timestamp = DateTime<Local>;

/// Return the current local time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now()
}

/// Parse a time-of-day written as `HH:MM` or `HH:MM:SS`.
#[must_use]
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Whether `now` lies in the window that opens at `start` and closes at `end`.
///
/// The window is half-open (`start` included, `end` excluded). A window whose
/// end is before its start wraps over midnight; `start == end` covers the
/// whole day.
#[must_use]
pub fn is_time_between(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start < end {
        now >= start && now < end
    } else if start > end {
        now >= start || now < end
    } else {
        true
    }
}

/// The first occurrence of `at` strictly after `now`.
#[must_use]
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}
