//! Server state management.

use std::sync::Arc;

use cardscan_core::config::StorageConfig;
use cardscan_core::error::CardScanResult;
use cardscan_core::{CardStore, StorageProvider};

use crate::factory::create_store;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CardStore>,
    pub storage: StorageProvider,
}

impl AppState {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn CardStore>, storage: StorageProvider) -> Self {
        Self { store, storage }
    }

    /// Build the store described by `config`.
    pub fn from_config(config: &StorageConfig) -> CardScanResult<Self> {
        Ok(Self::new(create_store(config)?, config.provider))
    }

    /// Close the store. Called once on shutdown.
    pub async fn shutdown(&self) -> CardScanResult<()> {
        self.store.close().await
    }
}
