//! Circuit breaker guarding the upstream provider.
//!
//! ```text
//! Closed   --(threshold consecutive failures)--> Open
//! Open     --(open_duration elapsed, next call)--> HalfOpen (one trial)
//! HalfOpen --(trial succeeds)--> Closed
//! HalfOpen --(trial fails)-----> Open (fresh opened_at)
//! ```
//!
//! Every check-then-transition runs under one mutex. Outcomes are tagged with
//! the generation they were admitted under, so a late result from before a
//! transition cannot cause a second transition.

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::BreakerConfig;

/// Breaker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub status: BreakerStatus,
    pub consecutive_failures: u32,
    pub opened_at: Option<Instant>,
}

/// Call rejected without reaching the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerOpen;

#[derive(Debug)]
struct BreakerState {
    status: BreakerStatus,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    generation: u64,
}

impl BreakerState {
    fn trip(&mut self, now: Instant) {
        self.status = BreakerStatus::Open;
        self.opened_at = Some(now);
        self.trial_in_flight = false;
        self.generation += 1;
    }
}

/// Process-wide breaker for one upstream target.
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: BreakerConfig,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState {
                status: BreakerStatus::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
                generation: 0,
            }),
            config,
        }
    }

    /// Ask to place one call.
    pub fn acquire(&self) -> Result<CallPermit<'_>, BreakerOpen> {
        let mut state = self.state.lock();
        let now = Instant::now();

        match state.status {
            BreakerStatus::Closed => Ok(CallPermit::new(self, state.generation, false)),
            BreakerStatus::Open => {
                let reopen_at = state
                    .opened_at
                    .map(|opened| opened + self.config.open_duration)
                    .unwrap_or(now);
                if now < reopen_at {
                    return Err(BreakerOpen);
                }
                state.status = BreakerStatus::HalfOpen;
                state.trial_in_flight = true;
                state.generation += 1;
                info!("Circuit breaker half-open, allowing trial call");
                Ok(CallPermit::new(self, state.generation, true))
            }
            BreakerStatus::HalfOpen => {
                if state.trial_in_flight {
                    return Err(BreakerOpen);
                }
                // Previous trial was abandoned; admit a new one.
                state.trial_in_flight = true;
                Ok(CallPermit::new(self, state.generation, true))
            }
        }
    }

    /// Get the current state.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state.lock();
        BreakerSnapshot {
            status: state.status,
            consecutive_failures: state.consecutive_failures,
            opened_at: state.opened_at,
        }
    }

    pub fn status(&self) -> BreakerStatus {
        self.state.lock().status
    }

    fn on_success(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        match state.status {
            BreakerStatus::Closed => state.consecutive_failures = 0,
            BreakerStatus::HalfOpen => {
                state.status = BreakerStatus::Closed;
                state.consecutive_failures = 0;
                state.opened_at = None;
                state.trial_in_flight = false;
                state.generation += 1;
                info!("Circuit breaker closed");
            }
            BreakerStatus::Open => {}
        }
    }

    fn on_failure(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        let now = Instant::now();
        match state.status {
            BreakerStatus::Closed => {
                state.consecutive_failures += 1;
                if state.consecutive_failures >= self.config.failure_threshold {
                    state.trip(now);
                    warn!(
                        consecutive_failures = state.consecutive_failures,
                        open_secs = self.config.open_duration.as_secs(),
                        "Circuit breaker opened"
                    );
                }
            }
            BreakerStatus::HalfOpen => {
                state.consecutive_failures += 1;
                state.trip(now);
                warn!(
                    open_secs = self.config.open_duration.as_secs(),
                    "Trial call failed, circuit breaker reopened"
                );
            }
            BreakerStatus::Open => {}
        }
    }

    fn on_abandon(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation == generation && state.status == BreakerStatus::HalfOpen {
            state.trial_in_flight = false;
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

/// Admission for a single upstream call.
///
/// Dropping a permit without recording an outcome (e.g. the caller's deadline
/// fired) counts as neither success nor failure.
#[must_use = "record the outcome of the call"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, generation: u64, trial: bool) -> Self {
        Self {
            breaker,
            generation,
            trial,
            settled: false,
        }
    }

    /// Whether this is the single half-open trial call.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.generation);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.generation);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.on_abandon(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_two_consecutive_failures() {
        let breaker = breaker();

        breaker.acquire().unwrap().record_failure();
        assert_eq!(breaker.status(), BreakerStatus::Closed);
        assert_eq!(breaker.snapshot().consecutive_failures, 1);

        breaker.acquire().unwrap().record_failure();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.status, BreakerStatus::Open);
        assert_eq!(snapshot.opened_at, Some(Instant::now()));

        assert_eq!(breaker.acquire().err(), Some(BreakerOpen));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_count() {
        let breaker = breaker();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_success();
        breaker.acquire().unwrap().record_failure();

        assert_eq!(breaker.status(), BreakerStatus::Closed);
        assert_eq!(breaker.snapshot().consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_until_window_elapses() {
        let breaker = breaker();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_failure();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(breaker.acquire().is_err());
        assert_eq!(breaker.status(), BreakerStatus::Open);

        tokio::time::advance(Duration::from_secs(1)).await;
        let permit = breaker.acquire().unwrap();
        assert!(permit.is_trial());
        assert_eq!(breaker.status(), BreakerStatus::HalfOpen);
        permit.record_success();
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_allows_exactly_one_trial() {
        let breaker = breaker();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_failure();
        tokio::time::advance(Duration::from_secs(30)).await;

        let trial = breaker.acquire().unwrap();
        assert!(breaker.acquire().is_err());
        assert!(breaker.acquire().is_err());

        trial.record_success();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.status, BreakerStatus::Closed);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.opened_at, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens_with_fresh_timestamp() {
        let breaker = breaker();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_failure();
        tokio::time::advance(Duration::from_secs(45)).await;

        breaker.acquire().unwrap().record_failure();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.status, BreakerStatus::Open);
        assert_eq!(snapshot.opened_at, Some(Instant::now()));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(breaker.acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_trial_frees_the_slot() {
        let breaker = breaker();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_failure();
        tokio::time::advance(Duration::from_secs(30)).await;

        drop(breaker.acquire().unwrap());
        assert_eq!(breaker.status(), BreakerStatus::HalfOpen);

        let trial = breaker.acquire().unwrap();
        assert!(trial.is_trial());
        trial.record_failure();
        assert_eq!(breaker.status(), BreakerStatus::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_outcome_does_not_transition_twice() {
        let breaker = breaker();
        let slow = breaker.acquire().unwrap();
        breaker.acquire().unwrap().record_failure();
        breaker.acquire().unwrap().record_failure();
        assert_eq!(breaker.status(), BreakerStatus::Open);
        let opened_at = breaker.snapshot().opened_at;

        tokio::time::advance(Duration::from_secs(5)).await;
        slow.record_failure();
        assert_eq!(breaker.snapshot().opened_at, opened_at);
        assert_eq!(breaker.snapshot().consecutive_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_failures_open_once() {
        let breaker = std::sync::Arc::new(breaker());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let breaker = breaker.clone();
            handles.push(tokio::spawn(async move {
                if let Ok(permit) = breaker.acquire() {
                    permit.record_failure();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.status, BreakerStatus::Open);
        assert_eq!(snapshot.consecutive_failures, 2);
    }
}
