//! Gateway configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use ratekeeper_fx::{EngineConfig, FRANKFURTER};

/// Codes rejected for conversion unless overridden.
pub const DEFAULT_EXCLUDED_CURRENCIES: [&str; 4] = ["TRY", "PLN", "THB", "MXN"];

/// Main gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Registry name of the provider to use.
    pub provider: String,
    /// Engine configuration (cache, retry, breaker, upstream).
    pub engine: EngineConfig,
    /// Per-request deadline handed to the engine.
    pub request_deadline: Option<Duration>,
    /// Currencies callers may not convert from or to.
    pub excluded_currencies: BTreeSet<String>,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: FRANKFURTER.to_string(),
            engine: EngineConfig::default(),
            request_deadline: Some(Duration::from_secs(30)),
            excluded_currencies: DEFAULT_EXCLUDED_CURRENCIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(provider) = lookup("RATEKEEPER_PROVIDER") {
            config.provider = provider;
        }

        if let Some(url) = lookup("RATEKEEPER_UPSTREAM_URL") {
            config.engine.upstream.base_url = url;
        }

        if let Some(ms) = lookup("RATEKEEPER_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.engine.upstream.request_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(ms) = lookup("RATEKEEPER_DEADLINE_MS") {
            match ms.parse::<u64>() {
                Ok(0) => config.request_deadline = None,
                Ok(ms) => config.request_deadline = Some(Duration::from_millis(ms)),
                Err(_) => {}
            }
        }

        if let Some(list) = lookup("RATEKEEPER_EXCLUDED_CURRENCIES") {
            config.excluded_currencies = list
                .split(',')
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect();
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.trim().is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }

        if self.request_deadline.is_some_and(|d| d.is_zero()) {
            return Err("Request deadline cannot be zero".to_string());
        }

        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider, "frankfurter");
        assert!(config.excluded_currencies.contains("MXN"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("RATEKEEPER_UPSTREAM_URL", "http://localhost:8080/"),
            ("RATEKEEPER_REQUEST_TIMEOUT_MS", "2500"),
            ("RATEKEEPER_DEADLINE_MS", "0"),
            ("RATEKEEPER_EXCLUDED_CURRENCIES", "rub, ,try"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.engine.upstream.base_url, "http://localhost:8080/");
        assert_eq!(config.engine.upstream.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.request_deadline, None);
        assert_eq!(
            config.excluded_currencies.into_iter().collect::<Vec<_>>(),
            vec!["RUB", "TRY"]
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("RATEKEEPER_REQUEST_TIMEOUT_MS", "soon"),
            ("RATEKEEPER_DEADLINE_MS", "-1"),
        ]));
        let defaults = GatewayConfig::default();

        assert_eq!(
            config.engine.upstream.request_timeout,
            defaults.engine.upstream.request_timeout
        );
        assert_eq!(config.request_deadline, defaults.request_deadline);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GatewayConfig::default();
        config.provider = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.engine.upstream.base_url = String::new();
        assert!(config.validate().is_err());
    }
}
