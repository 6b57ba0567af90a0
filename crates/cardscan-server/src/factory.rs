//! Factory for creating card stores from configuration.

use std::sync::Arc;

use cardscan_core::config::StorageConfig;
use cardscan_core::error::CardScanResult;
use cardscan_core::{CardStore, InMemoryCardStore, SqliteCardStore, StorageProvider};
use tracing::{info, warn};

/// Create a card store from configuration.
pub fn create_store(config: &StorageConfig) -> CardScanResult<Arc<dyn CardStore>> {
    match config.provider {
        StorageProvider::Memory => {
            warn!("Using in-memory card store, records are lost on restart");
            Ok(Arc::new(InMemoryCardStore::new()))
        }
        StorageProvider::Sqlite => {
            let store = SqliteCardStore::new(&config.db_path)?;
            info!(path = %config.db_path.display(), "Using SQLite card store");
            Ok(Arc::new(store))
        }
    }
}
