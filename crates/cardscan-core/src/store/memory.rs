//! In-process card store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CardScanResult;
use crate::traits::CardStore;
use crate::types::{CardRecord, NewCard};

/// Keeps records in memory, newest first. Lost on drop.
#[derive(Default)]
pub struct InMemoryCardStore {
    records: RwLock<Vec<CardRecord>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn create(&self, card: NewCard) -> CardScanResult<CardRecord> {
        let record = CardRecord::issue(card)?;
        self.records.write().await.insert(0, record.clone());
        Ok(record)
    }

    async fn list(&self) -> CardScanResult<Vec<CardRecord>> {
        Ok(self.records.read().await.clone())
    }
}
