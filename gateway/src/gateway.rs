//! Caller-side service in front of the rate provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{info, warn};

use ratekeeper_common::{
    ConversionResult, CorrelationId, ExchangeRateSnapshot, HistoricalRatesPage, PageRequest,
};
use ratekeeper_fx::{CurrencyProvider, FxError, ProviderRegistry, RateEngine, RequestContext};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::guard::CurrencyGuard;
use crate::metrics::{Metrics, MetricsSnapshot};

/// Applies the denylist, correlation id and deadline before calling the
/// configured provider.
pub struct Gateway {
    provider: Arc<dyn CurrencyProvider>,
    guard: CurrencyGuard,
    request_deadline: Option<Duration>,
    metrics: Metrics,
}

impl Gateway {
    /// Create a gateway over an already-built provider.
    pub fn new(provider: Arc<dyn CurrencyProvider>, config: &GatewayConfig) -> Self {
        Self {
            provider,
            guard: CurrencyGuard::new(&config.excluded_currencies),
            request_deadline: config.request_deadline,
            metrics: Metrics::new(),
        }
    }

    /// Build every known provider and pick the configured one.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(RateEngine::with_http(config.engine.clone())?));

        let provider = registry.resolve(&config.provider)?;
        info!(provider = %provider.name(), "Rate provider selected");

        Ok(Self::new(provider, config))
    }

    /// Name of the provider behind this gateway.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Latest rates for `base`.
    pub async fn latest(
        &self,
        correlation_id: Option<&str>,
        base: &str,
    ) -> GatewayResult<Arc<ExchangeRateSnapshot>> {
        let ctx = self.context(correlation_id);
        self.observe("latest", &ctx, async {
            self.provider
                .get_latest(&ctx, base)
                .await
                .map_err(GatewayError::from)
        })
        .await
    }

    /// Convert `amount` of `from` into `to`, refusing excluded currencies.
    pub async fn convert(
        &self,
        correlation_id: Option<&str>,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> GatewayResult<Arc<ConversionResult>> {
        let ctx = self.context(correlation_id);
        self.observe("convert", &ctx, async {
            self.guard.check_pair(from, to)?;
            Ok::<_, GatewayError>(self.provider.convert(&ctx, from, to, amount).await?)
        })
        .await
    }

    /// One page of historical rates; paging defaults to page 1 of size 10.
    pub async fn history(
        &self,
        correlation_id: Option<&str>,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> GatewayResult<Arc<HistoricalRatesPage>> {
        let ctx = self.context(correlation_id);
        let page = page.unwrap_or(PageRequest::DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(PageRequest::DEFAULT_PAGE_SIZE);

        self.observe("history", &ctx, async {
            self.provider
                .get_history(&ctx, base, start, end, page, page_size)
                .await
                .map_err(GatewayError::from)
        })
        .await
    }

    /// Get current request counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn context(&self, correlation_id: Option<&str>) -> RequestContext {
        let ctx = RequestContext::new(CorrelationId::from_header(correlation_id));
        match self.request_deadline {
            Some(deadline) => ctx.with_timeout(deadline),
            None => ctx,
        }
    }

    /// Count and log one request from start to finish.
    async fn observe<T, F>(
        &self,
        operation: &'static str,
        ctx: &RequestContext,
        request: F,
    ) -> GatewayResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        self.metrics.request_received();
        let started = Instant::now();

        let result = request.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                self.metrics.request_success();
                info!(
                    correlation_id = %ctx.correlation_id(),
                    operation,
                    elapsed_ms,
                    "Request completed"
                );
            }
            Err(err) => {
                if err.is_rejection() {
                    self.metrics.request_rejected();
                } else if matches!(err, GatewayError::Provider(FxError::UpstreamUnavailable)) {
                    self.metrics.request_unavailable();
                } else {
                    self.metrics.request_failed();
                }
                warn!(
                    correlation_id = %ctx.correlation_id(),
                    operation,
                    elapsed_ms,
                    status = err.status_code(),
                    error_code = err.error_code(),
                    error = %err,
                    "Request failed"
                );
            }
        }

        result
    }
}
