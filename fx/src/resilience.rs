//! Retry and circuit breaking composed around a single upstream call.
//!
//! Retry is the outer loop; every attempt must first pass the breaker. A
//! breaker rejection ends the loop at once with `UpstreamUnavailable` and
//! never touches the network.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, warn};

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::context::RequestContext;
use crate::error::{FxError, FxResult};
use crate::retry::RetryPolicy;

/// A call result that can tell success from failure on its own.
pub trait Outcome {
    /// Whether the call succeeded.
    fn is_success(&self) -> bool;

    /// The error describing an unsuccessful outcome.
    fn failure(&self) -> FxError;
}

/// Retry + breaker wrapper around one upstream target.
pub struct ResiliencePolicy {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl ResiliencePolicy {
    pub fn new(retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> Self {
        Self { retry, breaker }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Run `call` until it succeeds, the breaker rejects, retries run out or
    /// the caller's deadline passes.
    pub async fn execute<R, F, Fut>(
        &self,
        ctx: &RequestContext,
        operation: &str,
        mut call: F,
    ) -> FxResult<R>
    where
        R: Outcome,
        F: FnMut() -> Fut,
        Fut: Future<Output = FxResult<R>>,
    {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if ctx.is_expired() {
                return Err(timeout(operation));
            }

            let Ok(permit) = self.breaker.acquire() else {
                warn!(
                    correlation_id = %ctx.correlation_id(),
                    operation,
                    attempt,
                    "Circuit breaker open, rejecting call"
                );
                return Err(FxError::UpstreamUnavailable);
            };

            let result = match ctx.deadline() {
                Some(deadline) => match tokio::time::timeout_at(deadline, call()).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            correlation_id = %ctx.correlation_id(),
                            operation,
                            attempt,
                            "Deadline reached during upstream call"
                        );
                        return Err(timeout(operation));
                    }
                },
                None => call().await,
            };

            let failure = match result {
                Ok(outcome) if outcome.is_success() => {
                    permit.record_success();
                    return Ok(outcome);
                }
                Ok(outcome) => outcome.failure(),
                Err(err) if err.is_retryable() => err,
                Err(err) => return Err(err),
            };
            permit.record_failure();

            warn!(
                correlation_id = %ctx.correlation_id(),
                operation,
                attempt,
                error = %failure,
                "Upstream attempt failed"
            );

            if attempt >= max_attempts {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    operation,
                    attempts = attempt,
                    last_error = %failure,
                    "Retries exhausted"
                );
                return Err(FxError::UpstreamUnavailable);
            }

            let delay = self.retry.backoff(attempt);
            if ctx.would_expire_after(delay) {
                return Err(timeout(operation));
            }
            tokio::time::sleep(delay).await;
        }
    }
}

fn timeout(operation: &str) -> FxError {
    FxError::Timeout {
        operation: operation.to_string(),
    }
}
