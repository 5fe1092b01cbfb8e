//! Time utilities and constants for Ratekeeper.

use chrono::{DateTime, NaiveDate, Utc};

/// Service timing constants.
pub mod constants {
    use std::time::Duration;

    /// Cache time-to-live for every operation kind (10 minutes).
    pub fn cache_ttl() -> Duration {
        Duration::from_secs(10 * 60)
    }

    /// How long the breaker stays open before a trial call (30 seconds).
    pub fn breaker_open_duration() -> Duration {
        Duration::from_secs(30)
    }

    /// Consecutive failures that open the breaker.
    pub const BREAKER_FAILURE_THRESHOLD: u32 = 2;

    /// Retries after the first attempt.
    pub const MAX_RETRIES: u32 = 2;

    /// Backoff before retry `n` is `BACKOFF_BASE_SECS ^ n` seconds.
    pub const BACKOFF_BASE_SECS: u64 = 2;

    /// Upstream request timeout (10 seconds).
    pub fn upstream_request_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// `YYYY-MM-DD`, as the upstream expects in paths.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYYMMDD`, as used inside cache keys.
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
