// Utility functions
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Converts unix seconds into `DateTime<Utc>`, if in range.
pub fn from_unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// UTC calendar day of a timestamp.
pub fn utc_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Formats a timestamp as `YYYY-MM-DD` (UTC).
pub fn day_label(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}
