//! Request counters for gateway monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total requests received.
    pub requests_total: AtomicU64,
    /// Requests answered with data.
    pub requests_success: AtomicU64,
    /// Requests rejected for bad arguments.
    pub requests_rejected: AtomicU64,
    /// Requests refused because the provider is unavailable.
    pub requests_unavailable: AtomicU64,
    /// Requests that failed any other way.
    pub requests_failed: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_unavailable(&self) {
        self.requests_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            requests_unavailable: self.requests_unavailable.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_rejected: u64,
    pub requests_unavailable: u64,
    pub requests_failed: u64,
}
