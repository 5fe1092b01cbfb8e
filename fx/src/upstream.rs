//! Client for the Frankfurter exchange-rate API.
//!
//! Request shapes:
//! - `GET {base}/latest?base=EUR` for all latest rates
//! - `GET {base}/latest?base=EUR&symbols=USD` for a single pair
//! - `GET {base}/2024-01-01..2024-01-10?symbols=EUR` for a date range

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use ratekeeper_common::{iso_date, now, CurrencyCode, DateRange, ExchangeRateSnapshot, RateTable};

use crate::context::RequestContext;
use crate::error::{excerpt, FxError, FxResult};
use crate::resilience::ResiliencePolicy;
use crate::transport::{HttpResponse, HttpTransport};

/// Date to rates, ascending by date.
pub type HistoricalRates = BTreeMap<NaiveDate, RateTable>;

#[derive(Deserialize)]
struct RatesEnvelope<T> {
    rates: T,
}

/// Issues requests through the resilience policy and decodes responses.
pub struct UpstreamClient {
    transport: Arc<dyn HttpTransport>,
    policy: Arc<ResiliencePolicy>,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        policy: Arc<ResiliencePolicy>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            policy,
            base_url,
        }
    }

    pub fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    /// All latest rates for `base`.
    pub async fn fetch_latest(
        &self,
        ctx: &RequestContext,
        base: &CurrencyCode,
    ) -> FxResult<ExchangeRateSnapshot> {
        info!(
            correlation_id = %ctx.correlation_id(),
            base = %base,
            "Calling upstream for latest rates"
        );
        let url = format!("{}/latest?base={}", self.base_url, base);
        let response = self.get(ctx, "fetch_latest", &url).await?;
        let rates: RateTable = decode_rates(&response)?;

        Ok(ExchangeRateSnapshot::new(base.clone(), rates, now()))
    }

    /// Single rate `from -> to`.
    pub async fn fetch_conversion_rate(
        &self,
        ctx: &RequestContext,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> FxResult<Decimal> {
        info!(
            correlation_id = %ctx.correlation_id(),
            from = %from,
            to = %to,
            "Calling upstream for conversion rate"
        );
        let url = format!("{}/latest?base={}&symbols={}", self.base_url, from, to);
        let response = self.get(ctx, "fetch_conversion_rate", &url).await?;
        let rates: RateTable = decode_rates(&response)?;

        rates
            .get(to.code())
            .copied()
            .ok_or_else(|| FxError::RateNotFound {
                base: from.clone(),
                target: to.clone(),
            })
    }

    /// Every day in `range`, keyed and ordered by date.
    pub async fn fetch_history(
        &self,
        ctx: &RequestContext,
        base: &CurrencyCode,
        range: &DateRange,
    ) -> FxResult<HistoricalRates> {
        info!(
            correlation_id = %ctx.correlation_id(),
            base = %base,
            start = %range.start(),
            end = %range.end(),
            "Calling upstream for historical rates"
        );
        let url = format!(
            "{}/{}..{}?symbols={}",
            self.base_url,
            iso_date(range.start()),
            iso_date(range.end()),
            base
        );
        let response = self.get(ctx, "fetch_history", &url).await?;
        let raw: BTreeMap<String, RateTable> = decode_rates(&response)?;

        raw.into_iter()
            .map(|(day, rates)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    FxError::Malformed {
                        reason: format!("bad date key {:?}: {}", day, e),
                        excerpt: excerpt(&response.body),
                    }
                })?;
                Ok((date, rates))
            })
            .collect()
    }

    async fn get(&self, ctx: &RequestContext, operation: &str, url: &str) -> FxResult<HttpResponse> {
        let transport = &self.transport;
        self.policy
            .execute(ctx, operation, || transport.get(url))
            .await
    }
}

/// Decode the `rates` member of a 2xx body.
fn decode_rates<T: DeserializeOwned>(response: &HttpResponse) -> FxResult<T> {
    serde_json::from_str::<RatesEnvelope<T>>(&response.body)
        .map(|envelope| envelope.rates)
        .map_err(|e| FxError::Malformed {
            reason: e.to_string(),
            excerpt: excerpt(&response.body),
        })
}
