//! In-memory TTL cache for normalized provider listings and tag statistics.
//!
//! [`FeedCache`] sits in the [`Aggregator`](crate::Aggregator) in front of
//! every provider call. Entries carry their own TTL so fast-changing
//! "online now" feeds can expire sooner than slower ones.
//!
//! # Expiry
//!
//! Expiry is lazy: an entry past its deadline is treated as absent by the
//! next read. moka evicts expired entries during its housekeeping, so there
//! is no background sweep owned by this crate.
//!
//! # Single-flight
//!
//! [`FeedCache::get_or_try_insert_with`] coalesces concurrent fills for the
//! same key: while one caller runs the upstream fetch, other callers for the
//! key wait for its result instead of issuing their own request.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use super::key::namespace_of;
use crate::telemetry;
use crate::types::{NormalizedModel, TagStat};
use crate::{FeedError, Result};

/// Configuration for the feed cache.
///
/// ```rust
/// # use camfeed::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(2_000)
///     .default_ttl(Duration::from_secs(60));
/// assert_eq!(config.max_entries, 2_000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// TTL for provider listings when the provider does not set its own.
    /// Default: 5 minutes.
    pub default_ttl: Duration,
    /// TTL for merged tag statistics. Default: 10 minutes.
    pub stats_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: Duration::from_secs(5 * 60),
            stats_ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the default listing TTL.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the tag statistics TTL.
    pub fn stats_ttl(mut self, ttl: Duration) -> Self {
        self.stats_ttl = ttl;
        self
    }
}

/// Cached value: a provider's normalized listing or merged tag stats.
#[derive(Clone, Debug, PartialEq)]
pub enum CachedValue {
    Models(Arc<Vec<NormalizedModel>>),
    TagStats(Arc<Vec<TagStat>>),
}

impl CachedValue {
    fn kind(&self) -> &'static str {
        match self {
            CachedValue::Models(_) => "models",
            CachedValue::TagStats(_) => "tag_stats",
        }
    }
}

/// A stored value with its expiry deadline.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub ttl: Duration,
    pub expires_at: Instant,
}

impl CacheEntry {
    fn new(value: CachedValue, ttl: Duration) -> Self {
        Self {
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }
}

/// Per-entry expiry policy: each entry lives for its own `ttl`, and an
/// overwrite restarts the clock with the new entry's `ttl`.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local feed cache.
///
/// Thread-safe; share it behind an `Arc`. Keys come from
/// [`cache_key`](super::cache_key).
pub struct FeedCache {
    cache: Cache<String, CacheEntry>,
    config: CacheConfig,
}

impl FeedCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryTtl)
            .build();
        Self {
            cache,
            config: config.clone(),
        }
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a live entry.
    ///
    /// Returns `None` on miss or when the entry has expired. Emits cache
    /// hit/miss metrics.
    pub async fn get(&self, key: &str) -> Option<CachedValue> {
        let namespace = namespace_of(key).to_owned();
        match self.cache.get(key).await {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "namespace" => namespace)
                    .increment(1);
                Some(entry.value)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "namespace" => namespace)
                    .increment(1);
                None
            }
        }
    }

    /// Insert or overwrite an entry with the given TTL.
    pub async fn set(&self, key: impl Into<String>, value: CachedValue, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, kind = value.kind(), ttl_ms = ttl.as_millis() as u64, "cache set");
        self.cache.insert(key, CacheEntry::new(value, ttl)).await;
    }

    /// Drop a single entry. Missing keys are ignored.
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn purge(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live entries.
    ///
    /// moka updates its counters lazily; call [`sync`](Self::sync) first
    /// when an exact figure matters (tests).
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush moka's pending housekeeping so counters are exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Read-through lookup with single-flight fill.
    ///
    /// On a hit the cached value is returned. On a miss `init` runs once per
    /// key, however many callers are waiting; its value is stored with `ttl`
    /// and handed to every waiter. An `init` error is returned to all waiters
    /// and nothing is stored.
    pub async fn get_or_try_insert_with<F>(
        &self,
        key: &str,
        ttl: Duration,
        init: F,
    ) -> Result<CachedValue>
    where
        F: Future<Output = Result<CachedValue>>,
    {
        let namespace = namespace_of(key).to_owned();
        let entry = self
            .cache
            .entry(key.to_owned())
            .or_try_insert_with(async move { init.await.map(|v| CacheEntry::new(v, ttl)) })
            .await
            .map_err(|e: Arc<FeedError>| (*e).clone())?;

        if entry.is_fresh() {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "namespace" => namespace)
                .increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "namespace" => namespace)
                .increment(1);
        }
        Ok(entry.into_value().value)
    }
}
