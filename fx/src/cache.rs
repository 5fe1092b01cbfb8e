//! Response caching with TTL support.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheConfig;

/// Cached value entry.
#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value: Arc::new(value),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe keyed cache with TTL.
///
/// Values are handed out as shared immutable handles; the entry itself never
/// leaves the map.
pub struct RateCache<V> {
    cache: DashMap<String, CacheEntry<V>>,
    config: CacheConfig,
}

impl<V> RateCache<V> {
    /// Create a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a new cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a value if present and not expired.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        if let Some(entry) = self.cache.get(key) {
            if entry.is_valid() {
                debug!(key, "Cache hit");
                return Some(Arc::clone(&entry.value));
            }
            debug!(key, "Cache entry expired");
            drop(entry);
            // Only drop it if no fresher value raced in meanwhile.
            self.cache.remove_if(key, |_, entry| !entry.is_valid());
        }

        debug!(key, "Cache miss");
        None
    }

    /// Insert with the configured TTL. The last writer wins.
    pub fn put(&self, key: impl Into<String>, value: V) -> Arc<V> {
        self.put_with_ttl(key, value, self.config.ttl)
    }

    /// Insert with a custom TTL.
    pub fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Arc<V> {
        let entry = CacheEntry::new(value, ttl);
        let handle = Arc::clone(&entry.value);
        self.cache.insert(key.into(), entry);
        handle
    }

    /// Remove a key.
    pub fn remove(&self, key: &str) {
        self.cache.remove(key);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total - valid,
        }
    }
}

impl<V> Default for RateCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

/// Cache keys. Identical logical requests always produce the same key.
pub mod keys {
    use ratekeeper_common::{compact_date, CurrencyCode, DateRange, PageRequest, PositiveAmount};

    pub fn latest(base: &CurrencyCode) -> String {
        format!("latest-{}", base)
    }

    pub fn convert(from: &CurrencyCode, to: &CurrencyCode, amount: &PositiveAmount) -> String {
        format!("convert-{}-{}-{}", from, to, amount.normalized())
    }

    pub fn history(base: &CurrencyCode, range: &DateRange, page: &PageRequest) -> String {
        format!(
            "history-{}-{}-{}-{}-{}",
            base,
            compact_date(range.start()),
            compact_date(range.end()),
            page.page(),
            page.page_size()
        )
    }
}
