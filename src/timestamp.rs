use chrono::{DateTime, Utc};

/// Milliseconds elapsed since 1970-01-01T00:00:00Z with the fractional
/// millisecond truncated toward zero. Pre-epoch instants yield negative
/// values; no clamping.
pub fn to_log4j_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros() / 1000
}
