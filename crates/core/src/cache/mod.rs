//! Caching module for the listing service
//!
//! Provides time-bounded caches for assembled listing pages and for
//! aggregate record counts, to avoid repeated document store round-trips.

pub mod listing_cache;
pub mod ttl_cache;

pub use listing_cache::{CountCache, ListingKey, ResponseCache};
pub use ttl_cache::{CacheEntry, TtlCache, CACHE_TTL};
