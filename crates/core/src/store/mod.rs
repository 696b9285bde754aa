//! Document store access
//!
//! The listing core only ever talks to the store through [`AgencyStore`]:
//! an aggregate count, an ordered forward fetch, and a keyed lookup. Records
//! are validated into [`AgencyRecord`] by the implementation before they
//! cross this boundary.

pub mod cursor;
pub mod memory;

pub use cursor::Cursor;
pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::filter::FilterSet;
use crate::types::AgencyRecord;
use async_trait::async_trait;

/// Ordered forward fetch: up to `limit` records matching `filters`, in
/// ascending `(name, id)` order, strictly after `after` when set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub filters: FilterSet,
    pub after: Option<Cursor>,
    pub limit: usize,
}

impl PageQuery {
    /// Query starting at the beginning of the ordered collection
    pub fn from_start(filters: FilterSet, limit: usize) -> Self {
        Self {
            filters,
            after: None,
            limit,
        }
    }

    /// Query resuming after `cursor`
    pub fn after(filters: FilterSet, cursor: Cursor, limit: usize) -> Self {
        Self {
            filters,
            after: Some(cursor),
            limit,
        }
    }
}

/// Remote document store holding agency records
#[async_trait]
pub trait AgencyStore: Send + Sync {
    /// Number of records matching `filters` (OR semantics, see [`FilterSet`])
    async fn count(&self, filters: &FilterSet) -> Result<u64, StoreError>;

    /// Ordered forward fetch
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<AgencyRecord>, StoreError>;

    /// Keyed lookup; `Ok(None)` when no record has `id`
    async fn get_by_id(&self, id: &str) -> Result<Option<AgencyRecord>, StoreError>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
