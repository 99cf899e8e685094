//! UTC timestamp and duration arithmetic
//!
//! All instants crossing the engine boundary are UTC; durations are whole
//! seconds.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Whole seconds from `start` to `end`. Negative when `end` precedes `start`.
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds()
}

/// Inclusive start and exclusive end of the UTC calendar day containing `at`.
pub fn utc_day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = at.date_naive();
    let start = Utc
        .from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
    (start, start + Duration::days(1))
}
