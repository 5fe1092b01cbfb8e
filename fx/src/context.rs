//! Per-request context supplied by the caller.

use std::time::Duration;

use ratekeeper_common::CorrelationId;
use tokio::time::Instant;

/// Correlation id plus an optional deadline for one logical request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context without a deadline.
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            deadline: None,
        }
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now. A timeout past the clock's range
    /// leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Whether waiting `delay` from now would run past the deadline.
    pub fn would_expire_after(&self, delay: Duration) -> bool {
        self.deadline.is_some_and(|d| {
            Instant::now()
                .checked_add(delay)
                .map_or(true, |resume| resume >= d)
        })
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(CorrelationId::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_tracking() {
        let ctx = RequestContext::default().with_timeout(Duration::from_secs(5));
        assert!(!ctx.is_expired());
        assert!(!ctx.would_expire_after(Duration::from_secs(2)));
        assert!(ctx.would_expire_after(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(ctx.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_delay_runs_past_deadline() {
        let ctx = RequestContext::default().with_timeout(Duration::from_secs(30));
        assert!(ctx.would_expire_after(Duration::from_secs(u64::MAX)));
        assert!(ctx.would_expire_after(Duration::MAX));
    }

    #[test]
    fn test_no_deadline_never_expires() {
        let ctx = RequestContext::new(CorrelationId::from("abc"));
        assert!(!ctx.is_expired());
        assert!(!ctx.would_expire_after(Duration::from_secs(3600)));
        assert_eq!(ctx.correlation_id().as_str(), "abc");
    }
}
