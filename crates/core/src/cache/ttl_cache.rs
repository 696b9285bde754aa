//! Generic time-to-live cache with an injected clock
//!
//! Entries are stored as immutable `Arc<CacheEntry<V>>` values inside a
//! sharded concurrent map, so a value and its timestamp are always read and
//! written together. Freshness is judged against the injected [`Clock`], not
//! the map's own timers; the map's eviction only bounds memory.

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

/// Validity window for every listing cache entry
pub const CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// A cached value together with the instant it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }

    /// Checks if the entry is still valid at `now`
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_core::cache::CacheEntry;
    /// use chrono::{Duration, Utc};
    ///
    /// let stored = Utc::now();
    /// let entry = CacheEntry::new(42u64, stored);
    /// assert!(entry.is_fresh(stored + Duration::seconds(299), Duration::seconds(300)));
    /// assert!(!entry.is_fresh(stored + Duration::seconds(300), Duration::seconds(300)));
    /// ```
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Concurrent cache whose entries expire a fixed time after insertion
pub struct TtlCache<K, V> {
    entries: Cache<K, Arc<CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `max_capacity` entries
    pub fn new(max_capacity: u64, ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            entries,
            ttl: Duration::seconds(ttl.as_secs() as i64),
            clock,
        }
    }

    /// Gets a value if present and fresh
    ///
    /// A stale entry is never returned; it stays in place until a fresh
    /// insert replaces it or the map evicts it.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key).await?;
        if entry.is_fresh(self.clock.now(), self.ttl) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Stores a value stamped with the current time, replacing any prior entry
    pub async fn insert(&self, key: K, value: V) {
        let entry = CacheEntry::new(value, self.clock.now());
        self.entries.insert(key, Arc::new(entry)).await;
    }

    /// Returns the fresh cached value, or runs `compute` and caches its result
    ///
    /// Errors from `compute` are returned as-is and leave the cache untouched.
    /// Concurrent misses on the same key each run `compute`.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drops every entry
    pub async fn invalidate_all(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }

    /// Approximate number of entries, fresh or stale
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
