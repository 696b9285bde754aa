//! Agency Directory Core Library
//!
//! Paginated, filterable agency listings over a remote document store, with
//! time-bounded caching of assembled pages and of aggregate counts.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod listing;
pub mod pager;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use cache::{CountCache, ListingKey, ResponseCache, CACHE_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DirectoryConfig, LogFormat, StoreBackend};
pub use error::{DirectoryError, ListingError, LookupError, Result, StoreError};
pub use filter::FilterSet;
pub use listing::{ListingRequest, ListingService};
pub use pager::{CursorPager, PageStart};
pub use store::{AgencyStore, Cursor, InMemoryStore, PageQuery};
pub use types::{AgencyRecord, PageNumber, PageResult, MAX_PAGE, PAGE_SIZE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
