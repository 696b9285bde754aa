//! Cursor-walk pagination
//!
//! The store only resumes forward from a cursor; it cannot skip to an offset.
//! Page `P` is reached by priming: read the `(P - 1) * PAGE_SIZE` records that
//! precede it, take a cursor after the last one, then read `PAGE_SIZE`
//! records after that cursor. Reaching page `P` therefore reads
//! `O(P * PAGE_SIZE)` documents. [`CursorPager::prime`] is exposed separately
//! so a cursor cache can sit in front of it.

use crate::error::StoreError;
use crate::filter::FilterSet;
use crate::store::{AgencyStore, Cursor, PageQuery};
use crate::types::{AgencyRecord, PageNumber, PAGE_SIZE};
use tracing::debug;

/// Where a page starts in the ordered scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStart {
    /// First page; no cursor needed
    Beginning,
    /// Resume after this cursor
    After(Cursor),
    /// The collection ends before this page
    PastEnd,
}

/// Resolves page numbers into cursor-based store reads
#[derive(Debug, Clone, Copy)]
pub struct CursorPager {
    page_size: usize,
}

impl Default for CursorPager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl CursorPager {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Finds where `page` starts by reading every record before it
    pub async fn prime(
        &self,
        store: &dyn AgencyStore,
        filters: &FilterSet,
        page: PageNumber,
    ) -> Result<PageStart, StoreError> {
        if page == PageNumber::FIRST {
            return Ok(PageStart::Beginning);
        }

        let wanted = page.records_before(self.page_size);
        let preceding = store
            .fetch(&PageQuery::from_start(filters.clone(), wanted))
            .await?;

        if preceding.len() < wanted {
            debug!(
                page = page.get(),
                available = preceding.len(),
                "page starts past the end of the collection"
            );
            return Ok(PageStart::PastEnd);
        }

        Ok(preceding
            .last()
            .map(|record| PageStart::After(Cursor::after(record)))
            .unwrap_or(PageStart::PastEnd))
    }

    /// Reads one page of records starting at `start`
    pub async fn fetch_from(
        &self,
        store: &dyn AgencyStore,
        filters: &FilterSet,
        start: PageStart,
    ) -> Result<Vec<AgencyRecord>, StoreError> {
        let query = match start {
            PageStart::Beginning => PageQuery::from_start(filters.clone(), self.page_size),
            PageStart::After(cursor) => PageQuery::after(filters.clone(), cursor, self.page_size),
            PageStart::PastEnd => return Ok(Vec::new()),
        };
        store.fetch(&query).await
    }

    /// Primes and fetches `page`
    ///
    /// A page beyond the available data is an empty vector, not an error.
    pub async fn resolve(
        &self,
        store: &dyn AgencyStore,
        filters: &FilterSet,
        page: PageNumber,
    ) -> Result<Vec<AgencyRecord>, StoreError> {
        let start = self.prime(store, filters, page).await?;
        self.fetch_from(store, filters, start).await
    }
}
