//! SQL queries and timestamp conversion for Messages.db.
//!
//! CHANGELOG:
//! - 10/18/2026 - Dropped upper bound on the window query
//! - 10/18/2026 - Latest-message-in-window query
//! - 10/18/2026 - Initial query constants

use chrono::{DateTime, Utc};

/// Most recent message newer than `cutoff` (Cocoa nanoseconds).
///
/// No upper bound: a row stamped slightly ahead of the local clock is still
/// the newest message.
pub const LATEST_MESSAGE_IN_WINDOW: &str = r#"
SELECT
    m.text,
    m.attributedBody,
    m.date
FROM message m
WHERE m.date > ?1
ORDER BY m.date DESC
LIMIT 1
"#;

/// Cocoa epoch offset (2001-01-01 in Unix time).
pub const COCOA_EPOCH_OFFSET: i64 = 978_307_200;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Convert a Cocoa nanosecond timestamp to UTC.
pub fn cocoa_to_datetime(cocoa_ns: i64) -> Option<DateTime<Utc>> {
    let secs = cocoa_ns.div_euclid(NANOS_PER_SEC) + COCOA_EPOCH_OFFSET;
    let nanos = cocoa_ns.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Convert UTC to a Cocoa nanosecond timestamp, saturating outside i64 range.
pub fn datetime_to_cocoa(dt: DateTime<Utc>) -> i64 {
    (dt.timestamp() - COCOA_EPOCH_OFFSET)
        .saturating_mul(NANOS_PER_SEC)
        .saturating_add(i64::from(dt.timestamp_subsec_nanos()))
}
