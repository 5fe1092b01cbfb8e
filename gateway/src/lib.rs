//! Ratekeeper Gateway
//!
//! Thin caller-side adapter over the rate engine: configuration from the
//! environment, a currency denylist, correlation ids, request deadlines and
//! request counters.

pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod metrics;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use guard::CurrencyGuard;
pub use metrics::{Metrics, MetricsSnapshot};
