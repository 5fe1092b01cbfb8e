//! Ratekeeper FX Engine
//!
//! Fetches, caches and serves exchange-rate data from a single upstream HTTP
//! provider without letting upstream slowness or failure cascade into callers.
//!
//! # Features
//!
//! - Cache-first lookups with a fixed TTL
//! - Bounded retry with exponential backoff
//! - Circuit breaker shared by every call to the upstream
//! - Paging over historical rates
//!
//! # Example
//!
//! ```rust,ignore
//! use ratekeeper_fx::{EngineConfig, RateEngine, RequestContext};
//! use rust_decimal_macros::dec;
//!
//! let engine = RateEngine::with_http(EngineConfig::default())?;
//! let ctx = RequestContext::default();
//!
//! let latest = engine.get_latest(&ctx, "EUR").await?;
//! let conversion = engine.convert(&ctx, "EUR", "USD", dec!(10)).await?;
//! ```

pub mod breaker;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod paginator;
pub mod provider;
pub mod resilience;
pub mod retry;
pub mod transport;
pub mod upstream;

pub use breaker::{BreakerSnapshot, BreakerStatus, CircuitBreaker};
pub use cache::{CacheStats, RateCache};
pub use config::EngineConfig;
pub use context::RequestContext;
pub use engine::{RateEngine, RateEngineStats};
pub use error::{FxError, FxResult};
pub use provider::{CurrencyProvider, ProviderRegistry, FRANKFURTER};
pub use resilience::{Outcome, ResiliencePolicy};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use upstream::UpstreamClient;

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;
