//! Agency Directory Infrastructure Library
//!
//! Infrastructure components for the agency directory: the Firestore
//! document store, store construction from configuration, and logging.

use agency_core::config::{StoreBackend, StoreSettings};
use agency_core::{AgencyStore, InMemoryStore, Result};
use std::sync::Arc;

pub mod firestore;
pub mod logger;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use logger::*;

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the configured document store
///
/// The memory backend starts empty unless a seed file is configured.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn AgencyStore>> {
    tracing::info!("Opening {} store (infra v{})", settings.backend, VERSION);

    let store: Arc<dyn AgencyStore> = match settings.backend {
        StoreBackend::Memory => match &settings.seed_path {
            Some(path) => Arc::new(InMemoryStore::from_json_file(path)?),
            None => {
                tracing::warn!("Memory store has no seed file; listings will be empty");
                Arc::new(InMemoryStore::default())
            }
        },
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(FirestoreConfig::from(
            &settings.firestore,
        ))?),
    };

    Ok(store)
}
