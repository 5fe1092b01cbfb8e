//! Bounded retry with exponential backoff.

use std::time::Duration;

use crate::config::RetryConfig;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// First attempt plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_retries.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (counted from 1): `base ^ attempt` seconds, no jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let secs = self
            .config
            .backoff_base_secs
            .checked_pow(attempt)
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 100,
            backoff_base_secs: 2,
        });
        assert_eq!(policy.backoff(64), Duration::from_secs(u64::MAX));
    }
}
