//! Listing service
//!
//! Answers "page N of agencies matching filters F" by combining the filter
//! compiler, the two caches and the cursor pager. Caches are written only
//! once every store call for the request has succeeded, so a failed or
//! cancelled request leaves both caches exactly as it found them.

use crate::cache::{CountCache, ListingKey, ResponseCache};
use crate::clock::Clock;
use crate::error::{ListingError, LookupError};
use crate::filter::FilterSet;
use crate::pager::CursorPager;
use crate::store::AgencyStore;
use crate::types::{AgencyRecord, PageNumber, PageResult};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A validated listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub filters: FilterSet,
    pub page: PageNumber,
}

impl ListingRequest {
    /// Validates the page and compiles the filters from raw query values
    pub fn parse(
        services: Option<&str>,
        location: Option<&str>,
        page: Option<&str>,
    ) -> Result<Self, ListingError> {
        let page = PageNumber::parse(page)?;
        Ok(Self {
            filters: FilterSet::compile(services, location),
            page,
        })
    }

    /// Response cache key for this request
    pub fn key(&self) -> ListingKey {
        ListingKey::new(&self.filters, self.page)
    }
}

/// Paginated, filtered agency listing over an [`AgencyStore`]
pub struct ListingService {
    store: Arc<dyn AgencyStore>,
    counts: CountCache,
    responses: ResponseCache,
    pager: CursorPager,
}

impl ListingService {
    /// Creates a service with fresh caches bounded to `max_capacity` entries each
    pub fn new(store: Arc<dyn AgencyStore>, clock: Arc<dyn Clock>, max_capacity: u64) -> Self {
        Self {
            store,
            counts: CountCache::new(max_capacity, clock.clone()),
            responses: ResponseCache::new(max_capacity, clock),
            pager: CursorPager::default(),
        }
    }

    /// Lists agencies from raw query parameters
    ///
    /// Page validation happens before any cache or store access.
    pub async fn list(
        &self,
        services: Option<&str>,
        location: Option<&str>,
        page: Option<&str>,
    ) -> Result<Arc<PageResult>, ListingError> {
        let request = ListingRequest::parse(services, location, page).map_err(|e| {
            warn!("Rejected listing request: page={:?}: {}", page, e);
            e
        })?;
        self.list_request(&request).await
    }

    /// Lists agencies for an already validated request
    pub async fn list_request(
        &self,
        request: &ListingRequest,
    ) -> Result<Arc<PageResult>, ListingError> {
        let key = request.key();
        info!(
            "Listing request: filters='{}', page={}",
            key.filters, request.page
        );

        if let Some(cached) = self.responses.get(&key).await {
            debug!(filters = %key.filters, page = key.page, "response cache hit");
            return Ok(cached);
        }

        let result = self.resolve(request).await.map_err(|e| {
            error!(
                "Listing failed on {} store: filters='{}', page={}: {}",
                self.store.backend(),
                key.filters,
                request.page,
                e
            );
            e
        })?;

        self.responses.insert(key, result.clone()).await;
        info!(
            "Listing resolved: page {}/{}, {} of {} agencies",
            result.current_page,
            result.total_pages,
            result.records.len(),
            result.total_records
        );
        Ok(result)
    }

    async fn resolve(&self, request: &ListingRequest) -> Result<Arc<PageResult>, ListingError> {
        let store = self.store.as_ref();
        let filters = &request.filters;

        // Page first: a failed page read must leave the count uncached.
        let records = self.pager.resolve(store, filters, request.page).await?;
        let total = self
            .counts
            .get_or_compute(filters, || store.count(filters))
            .await?;

        Ok(Arc::new(PageResult::assemble(records, request.page, total)))
    }

    /// Fetches one agency for the detail view
    ///
    /// Not cached. A blank id is not found without touching the store.
    pub async fn get_by_id(&self, id: &str) -> Result<AgencyRecord, LookupError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(LookupError::not_found(id));
        }

        match self.store.get_by_id(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                debug!("Agency not found: {}", id);
                Err(LookupError::not_found(id))
            }
            Err(e) => {
                error!("Agency lookup failed for {}: {}", id, e);
                Err(e.into())
            }
        }
    }

    /// Count cache, for diagnostics
    pub fn counts(&self) -> &CountCache {
        &self.counts
    }

    /// Response cache, for diagnostics
    pub fn responses(&self) -> &ResponseCache {
        &self.responses
    }

    /// Drops every cached count and page
    pub async fn clear_caches(&self) {
        self.counts.invalidate_all().await;
        self.responses.invalidate_all().await;
    }
}
