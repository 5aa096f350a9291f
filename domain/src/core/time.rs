//! Millisecond timestamps.
//!
//! Domain algorithms take `now` explicitly so they stay deterministic under
//! test; callers at the edge use [`now_millis`].

pub const SECOND_MS: u64 = 1_000;
pub const HOUR_MS: u64 = 60 * 60 * SECOND_MS;
pub const DAY_MS: u64 = 24 * HOUR_MS;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Elapsed days between two timestamps (never negative)
pub fn days_between(earlier: u64, later: u64) -> f64 {
    later.saturating_sub(earlier) as f64 / DAY_MS as f64
}
