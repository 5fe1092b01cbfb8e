//! Gateway error types.

use ratekeeper_common::ValidationError;
use ratekeeper_fx::FxError;
use thiserror::Error;

/// Errors returned to gateway callers.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Request refused by caller-side rules.
    #[error("Request rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// Provider failed the request.
    #[error(transparent)]
    Provider(#[from] FxError),
}

impl GatewayError {
    /// HTTP-style status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Rejected(_) => 400,
            GatewayError::Provider(err) => match err {
                FxError::InvalidArgument(_) => 400,
                FxError::RateNotFound { .. } => 404,
                FxError::UpstreamResponse { .. }
                | FxError::Malformed { .. }
                | FxError::Transport(_) => 502,
                FxError::UpstreamUnavailable => 503,
                FxError::Timeout { .. } => 504,
                FxError::UnknownProvider(_) => 500,
            },
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Rejected(err) => err.error_code(),
            GatewayError::Provider(err) => err.error_code(),
        }
    }

    /// Whether the caller sent something unacceptable.
    pub fn is_rejection(&self) -> bool {
        self.status_code() == 400
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let rejected: GatewayError = ValidationError::ExcludedCurrency("TRY".into()).into();
        assert_eq!(rejected.status_code(), 400);
        assert!(rejected.is_rejection());

        let unavailable: GatewayError = FxError::UpstreamUnavailable.into();
        assert_eq!(unavailable.status_code(), 503);
        assert_eq!(unavailable.error_code(), "UPSTREAM_UNAVAILABLE");

        let timeout: GatewayError = FxError::Timeout {
            operation: "latest".into(),
        }
        .into();
        assert_eq!(timeout.status_code(), 504);

        let bad_gateway: GatewayError = FxError::Transport("reset".into()).into();
        assert_eq!(bad_gateway.status_code(), 502);
    }
}
