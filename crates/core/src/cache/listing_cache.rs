//! Count and response caches for agency listings

use super::ttl_cache::{TtlCache, CACHE_TTL};
use crate::clock::Clock;
use crate::error::StoreError;
use crate::filter::FilterSet;
use crate::types::{PageNumber, PageResult};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Full request identity for the response cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    /// Canonical filter key
    pub filters: String,
    /// Requested page
    pub page: u32,
}

impl ListingKey {
    /// Creates a key from compiled filters and a validated page
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_core::cache::ListingKey;
    /// use agency_core::filter::FilterSet;
    /// use agency_core::types::PageNumber;
    ///
    /// let a = ListingKey::new(&FilterSet::compile(Some("seo ppc"), None), PageNumber::FIRST);
    /// let b = ListingKey::new(&FilterSet::compile(Some("ppc"), Some("seo")), PageNumber::FIRST);
    /// assert_eq!(a, b);
    /// ```
    pub fn new(filters: &FilterSet, page: PageNumber) -> Self {
        Self {
            filters: filters.canonical_key(),
            page: page.get(),
        }
    }
}

/// Memoized total record count per filter set
///
/// A fresh entry is authoritative for every page of that filter set.
pub struct CountCache {
    inner: TtlCache<String, u64>,
}

impl CountCache {
    pub fn new(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: TtlCache::new(max_capacity, CACHE_TTL, clock),
        }
    }

    /// Returns the cached count for `filters`, or runs `compute` and caches it
    ///
    /// A failing `compute` caches nothing.
    pub async fn get_or_compute<F, Fut>(&self, filters: &FilterSet, compute: F) -> Result<u64, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, StoreError>>,
    {
        let key = filters.canonical_key();
        self.inner
            .get_or_try_insert_with(key.clone(), || {
                debug!(filters = %key, "count cache miss");
                compute()
            })
            .await
    }

    /// Cached count, if fresh
    pub async fn get(&self, filters: &FilterSet) -> Option<u64> {
        self.inner.get(&filters.canonical_key()).await
    }

    pub async fn invalidate_all(&self) {
        self.inner.invalidate_all().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// Memoized assembled pages per full request
pub struct ResponseCache {
    inner: TtlCache<ListingKey, Arc<PageResult>>,
}

impl ResponseCache {
    pub fn new(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: TtlCache::new(max_capacity, CACHE_TTL, clock),
        }
    }

    /// Gets a fresh page for `key`
    pub async fn get(&self, key: &ListingKey) -> Option<Arc<PageResult>> {
        self.inner.get(key).await
    }

    /// Stores a fully resolved page
    pub async fn insert(&self, key: ListingKey, page: Arc<PageResult>) {
        self.inner.insert(key, page).await;
    }

    pub async fn invalidate_all(&self) {
        self.inner.invalidate_all().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
