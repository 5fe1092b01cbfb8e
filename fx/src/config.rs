//! Rate engine configuration.

use std::time::Duration;

use ratekeeper_common::constants;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to every cached result.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::cache_ttl(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff_base_secs ^ n` seconds.
    pub backoff_base_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: constants::MAX_RETRIES,
            backoff_base_secs: constants::BACKOFF_BASE_SECS,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker rejects calls once open.
    pub open_duration: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: constants::BREAKER_FAILURE_THRESHOLD,
            open_duration: constants::breaker_open_duration(),
        }
    }
}

/// Upstream HTTP configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base address every request path is appended to.
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.frankfurter.dev/v1/".to_string(),
            request_timeout: constants::upstream_request_timeout(),
        }
    }
}

/// Configuration for the rate engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub breaker: BreakerConfig,
    pub upstream: UpstreamConfig,
}

impl EngineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.upstream.base_url.trim().is_empty() {
            return Err("Upstream base URL cannot be empty".to_string());
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err("Upstream base URL must be http or https".to_string());
        }

        if self.cache.ttl.is_zero() {
            return Err("Cache TTL cannot be zero".to_string());
        }

        if self.breaker.failure_threshold == 0 {
            return Err("Breaker failure threshold must be at least 1".to_string());
        }

        if self.retry.backoff_base_secs == 0 {
            return Err("Backoff base cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.breaker.failure_threshold, 2);
        assert_eq!(config.breaker.open_duration, Duration::from_secs(30));
        assert_eq!(config.cache.ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = EngineConfig::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.breaker.failure_threshold = 0;
        assert!(config.validate().is_err());
    }
}
