//! In-process document store
//!
//! Holds records sorted by `(name, id)` and answers the same queries as the
//! remote store with the same OR filtering and cursor semantics. Used for
//! local runs from a JSON seed file and as the test double for the listing
//! service.

use super::{AgencyStore, PageQuery};
use crate::error::{Result, StoreError};
use crate::filter::FilterSet;
use crate::types::AgencyRecord;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Sorted in-memory agency collection with read counters
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<AgencyRecord>>,
    calls: AtomicU64,
    documents_read: AtomicU64,
}

impl InMemoryStore {
    /// Creates a store from records in any order
    pub fn new(mut records: Vec<AgencyRecord>) -> Self {
        records.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        Self {
            records: RwLock::new(records),
            calls: AtomicU64::new(0),
            documents_read: AtomicU64::new(0),
        }
    }

    /// Loads records from a JSON file holding an array of agencies
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<AgencyRecord> = serde_json::from_str(&content)?;
        info!(
            "Loaded {} agencies from {}",
            records.len(),
            path.as_ref().display()
        );
        Ok(Self::new(records))
    }

    /// Inserts a record, replacing any record with the same id
    pub fn upsert(&self, record: AgencyRecord) {
        let mut records = self.records.write();
        records.retain(|r| r.id != record.id);
        let at = records.partition_point(|r| (&r.name, &r.id) < (&record.name, &record.id));
        records.insert(at, record);
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Store calls served so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Documents returned to callers so far
    pub fn documents_read(&self) -> u64 {
        self.documents_read.load(Ordering::Relaxed)
    }

    fn record_call(&self, documents: usize) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.documents_read
            .fetch_add(documents as u64, Ordering::Relaxed);
    }
}

#[async_trait]
impl AgencyStore for InMemoryStore {
    async fn count(&self, filters: &FilterSet) -> std::result::Result<u64, StoreError> {
        let count = self
            .records
            .read()
            .iter()
            .filter(|r| filters.matches(&r.combined_slug))
            .count() as u64;
        self.record_call(0);
        Ok(count)
    }

    async fn fetch(&self, query: &PageQuery) -> std::result::Result<Vec<AgencyRecord>, StoreError> {
        let page: Vec<AgencyRecord> = {
            let records = self.records.read();
            let start = match &query.after {
                Some(cursor) => records
                    .partition_point(|r| (r.name.as_str(), r.id.as_str()) <= (cursor.name(), cursor.id())),
                None => 0,
            };
            records[start..]
                .iter()
                .filter(|r| query.filters.matches(&r.combined_slug))
                .take(query.limit)
                .cloned()
                .collect()
        };
        self.record_call(page.len());
        Ok(page)
    }

    async fn get_by_id(&self, id: &str) -> std::result::Result<Option<AgencyRecord>, StoreError> {
        let record = self.records.read().iter().find(|r| r.id == id).cloned();
        self.record_call(usize::from(record.is_some()));
        Ok(record)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
