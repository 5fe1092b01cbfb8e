//! Main rate engine implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use ratekeeper_common::{
    now, ConversionResult, CurrencyCode, DateRange, ExchangeRateSnapshot, HistoricalRatesPage,
    PageRequest, PositiveAmount,
};

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::cache::{keys, CacheStats, RateCache};
use crate::config::EngineConfig;
use crate::context::RequestContext;
use crate::error::FxResult;
use crate::paginator::paginate;
use crate::provider::{CurrencyProvider, FRANKFURTER};
use crate::resilience::ResiliencePolicy;
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::upstream::UpstreamClient;

/// Cache-first façade over the upstream client.
///
/// Owns the breaker and caches for one upstream target; clone the `Arc`
/// around it rather than building a second engine for the same upstream.
pub struct RateEngine {
    upstream: UpstreamClient,
    latest: RateCache<ExchangeRateSnapshot>,
    conversions: RateCache<ConversionResult>,
    history: RateCache<HistoricalRatesPage>,
}

impl RateEngine {
    /// Create an engine over the given transport.
    pub fn new(config: EngineConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
        let policy = ResiliencePolicy::new(RetryPolicy::new(config.retry.clone()), breaker);
        let upstream = UpstreamClient::new(transport, Arc::new(policy), config.upstream.base_url.clone());

        Self {
            upstream,
            latest: RateCache::with_config(config.cache.clone()),
            conversions: RateCache::with_config(config.cache.clone()),
            history: RateCache::with_config(config.cache),
        }
    }

    /// Create an engine talking HTTP through `reqwest`.
    pub fn with_http(config: EngineConfig) -> FxResult<Self> {
        let transport = ReqwestTransport::new(config.upstream.request_timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Latest rates for `base`.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id()))]
    pub async fn get_latest(
        &self,
        ctx: &RequestContext,
        base: &str,
    ) -> FxResult<Arc<ExchangeRateSnapshot>> {
        let base = CurrencyCode::parse(base, "base")?;
        let key = keys::latest(&base);

        if let Some(cached) = self.latest.get(&key) {
            debug!("Using cached latest rates");
            return Ok(cached);
        }

        let snapshot = self.upstream.fetch_latest(ctx, &base).await?;
        Ok(self.latest.put(key, snapshot))
    }

    /// Convert `amount` from one currency to another.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id()))]
    pub async fn convert(
        &self,
        ctx: &RequestContext,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> FxResult<Arc<ConversionResult>> {
        let from = CurrencyCode::parse(from, "from")?;
        let to = CurrencyCode::parse(to, "to")?;
        let amount = PositiveAmount::new(amount)?;
        let key = keys::convert(&from, &to, &amount);

        if let Some(cached) = self.conversions.get(&key) {
            debug!("Using cached conversion");
            return Ok(cached);
        }

        let rate = self.upstream.fetch_conversion_rate(ctx, &from, &to).await?;
        let result = ConversionResult::new(from, to, amount.value(), rate, now())?;

        debug!(
            converted_amount = %result.converted_amount,
            rate = %result.rate,
            "Conversion completed"
        );

        Ok(self.conversions.put(key, result))
    }

    /// One page of historical rates.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id()))]
    pub async fn get_history(
        &self,
        ctx: &RequestContext,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> FxResult<Arc<HistoricalRatesPage>> {
        let base = CurrencyCode::parse(base, "base")?;
        let range = DateRange::new(start, end)?;
        let page = PageRequest::new(page, page_size)?;
        let key = keys::history(&base, &range, &page);

        if let Some(cached) = self.history.get(&key) {
            debug!("Using cached history page");
            return Ok(cached);
        }

        let days = self.upstream.fetch_history(ctx, &base, &range).await?;
        let result = HistoricalRatesPage {
            base_currency: base,
            page: page.page(),
            page_size: page.page_size(),
            entries: paginate(days, &page),
        };

        Ok(self.history.put(key, result))
    }

    /// Get engine statistics.
    pub fn stats(&self) -> RateEngineStats {
        RateEngineStats {
            latest_cache: self.latest.stats(),
            conversion_cache: self.conversions.stats(),
            history_cache: self.history.stats(),
            breaker: self.upstream.policy().breaker_snapshot(),
        }
    }

    /// Drop expired cache entries.
    pub fn evict_expired(&self) {
        self.latest.evict_expired();
        self.conversions.evict_expired();
        self.history.evict_expired();
    }
}

#[async_trait]
impl CurrencyProvider for RateEngine {
    fn name(&self) -> &str {
        FRANKFURTER
    }

    async fn get_latest(
        &self,
        ctx: &RequestContext,
        base: &str,
    ) -> FxResult<Arc<ExchangeRateSnapshot>> {
        RateEngine::get_latest(self, ctx, base).await
    }

    async fn convert(
        &self,
        ctx: &RequestContext,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> FxResult<Arc<ConversionResult>> {
        RateEngine::convert(self, ctx, from, to, amount).await
    }

    async fn get_history(
        &self,
        ctx: &RequestContext,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> FxResult<Arc<HistoricalRatesPage>> {
        RateEngine::get_history(self, ctx, base, start, end, page, page_size).await
    }
}

/// Engine statistics.
#[derive(Debug, Clone)]
pub struct RateEngineStats {
    pub latest_cache: CacheStats,
    pub conversion_cache: CacheStats,
    pub history_cache: CacheStats,
    pub breaker: BreakerSnapshot,
}
