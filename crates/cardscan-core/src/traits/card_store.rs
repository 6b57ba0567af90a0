//! Persistence client trait.

use async_trait::async_trait;

use crate::error::CardScanResult;
use crate::types::{CardRecord, NewCard};

/// Create/list access to stored cards.
///
/// Implementations are constructed once, shared behind an `Arc`, and closed on
/// shutdown. They must reject incomplete payloads with a validation error even
/// though the workflow already checks them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Persist a card, returning the record with its id and timestamp.
    async fn create(&self, card: NewCard) -> CardScanResult<CardRecord>;

    /// All records, newest registration first.
    async fn list(&self) -> CardScanResult<Vec<CardRecord>>;

    /// Release connections. Further calls may fail.
    async fn close(&self) -> CardScanResult<()> {
        Ok(())
    }
}
