//! Provider capability trait and name-keyed registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use ratekeeper_common::{ConversionResult, ExchangeRateSnapshot, HistoricalRatesPage};

use crate::context::RequestContext;
use crate::error::{FxError, FxResult};

/// Registry name of the Frankfurter-backed engine.
pub const FRANKFURTER: &str = "frankfurter";

/// What every exchange-rate provider can do.
///
/// Arguments arrive raw; implementations validate them before any I/O and
/// report problems as [`FxError::InvalidArgument`].
#[async_trait]
pub trait CurrencyProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Latest rates for `base`.
    async fn get_latest(
        &self,
        ctx: &RequestContext,
        base: &str,
    ) -> FxResult<Arc<ExchangeRateSnapshot>>;

    /// Convert `amount` of `from` into `to`.
    async fn convert(
        &self,
        ctx: &RequestContext,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> FxResult<Arc<ConversionResult>>;

    /// One page of daily rates between `start` and `end` inclusive.
    async fn get_history(
        &self,
        ctx: &RequestContext,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> FxResult<Arc<HistoricalRatesPage>>;
}

/// Maps provider names to implementations, resolved once at startup.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn CurrencyProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn CurrencyProvider>) -> &mut Self {
        let name = provider.name().to_ascii_lowercase();
        debug!(provider = %name, "Registered rate provider");
        self.providers.insert(name, provider);
        self
    }

    /// Look up a provider by name (case-insensitive).
    pub fn resolve(&self, name: &str) -> FxResult<Arc<dyn CurrencyProvider>> {
        self.providers
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| FxError::UnknownProvider(name.to_string()))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::RateEngine;
    use crate::transport::MockTransport;

    fn engine() -> Arc<dyn CurrencyProvider> {
        Arc::new(RateEngine::new(
            EngineConfig::default(),
            Arc::new(MockTransport::new()),
        ))
    }

    #[test]
    fn test_resolve_registered_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(engine());

        let provider = registry.resolve("Frankfurter").unwrap();
        assert_eq!(provider.name(), FRANKFURTER);
        assert_eq!(registry.names(), vec![FRANKFURTER.to_string()]);
    }

    #[test]
    fn test_resolved_provider_validates_before_io() {
        let transport = Arc::new(MockTransport::new());
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(RateEngine::new(
            EngineConfig::default(),
            transport.clone(),
        )));

        let provider = registry.resolve(FRANKFURTER).unwrap();
        let result = tokio_test::block_on(provider.get_latest(&RequestContext::default(), " "));

        assert!(matches!(result, Err(FxError::InvalidArgument(_))));
        assert_eq!(transport.hits(), 0);
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.resolve("fixer"),
            Err(FxError::UnknownProvider(name)) if name == "fixer"
        ));
    }
}
