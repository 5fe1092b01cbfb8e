//! Rate engine error types.

use ratekeeper_common::{CurrencyCode, ValidationError};
use thiserror::Error;

/// Errors that can occur in the rate engine.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// Argument rejected before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream responded with status {status}: {excerpt}")]
    UpstreamResponse { status: u16, excerpt: String },

    /// Upstream answered 2xx but the body could not be decoded.
    #[error("Malformed upstream body ({reason}): {excerpt}")]
    Malformed { reason: String, excerpt: String },

    /// Request never produced a response (connect, TLS, read failure).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Target currency missing from an otherwise valid response.
    #[error("Rate not found for {base} -> {target}")]
    RateNotFound {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    /// Breaker open or retries exhausted.
    #[error("The rate provider is unavailable or returning errors")]
    UpstreamUnavailable,

    /// Caller deadline passed before the operation finished.
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// No provider registered under this name.
    #[error("Unknown rate provider: {0}")]
    UnknownProvider(String),
}

impl FxError {
    /// Per-attempt failures the retry policy will try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::UpstreamResponse { .. } | FxError::Transport(_)
        )
    }

    /// Whether this is an `UpstreamResponseError` in the taxonomy sense.
    pub fn is_upstream_response_error(&self) -> bool {
        matches!(
            self,
            FxError::UpstreamResponse { .. } | FxError::Malformed { .. }
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FxError::UpstreamResponse { .. } => "UPSTREAM_RESPONSE_ERROR",
            FxError::Malformed { .. } => "UPSTREAM_RESPONSE_ERROR",
            FxError::Transport(_) => "UPSTREAM_TRANSPORT_ERROR",
            FxError::RateNotFound { .. } => "RATE_NOT_FOUND",
            FxError::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            FxError::Timeout { .. } => "TIMEOUT",
            FxError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
        }
    }
}

/// Result type for rate engine operations.
pub type FxResult<T> = Result<T, FxError>;

/// Longest body excerpt carried inside an error.
pub const EXCERPT_LIMIT: usize = 256;

/// Trim a response body to at most [`EXCERPT_LIMIT`] characters.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FxError::UpstreamResponse {
            status: 500,
            excerpt: String::new()
        }
        .is_retryable());
        assert!(FxError::Transport("reset".into()).is_retryable());
        assert!(!FxError::UpstreamUnavailable.is_retryable());
        assert!(!FxError::RateNotFound {
            base: CurrencyCode::eur(),
            target: CurrencyCode::usd()
        }
        .is_retryable());
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(EXCERPT_LIMIT + 10);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), EXCERPT_LIMIT + 3);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_validation_converts() {
        let err: FxError = ValidationError::MissingCurrency { field: "base" }.into();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }
}
