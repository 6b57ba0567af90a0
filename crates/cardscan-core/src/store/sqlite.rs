//! SQLite-backed card store.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{CardScanError, CardScanResult};
use crate::traits::CardStore;
use crate::types::{CardRecord, NewCard};

/// Card store persisting to a single SQLite table.
///
/// Timestamps are stored as fixed-width RFC 3339 strings (UTC, microseconds)
/// so text ordering matches chronological ordering.
pub struct SqliteCardStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteCardStore {
    /// Open (or create) the database at `db_path`. `:memory:` opens a private
    /// in-memory database.
    pub fn new(db_path: impl AsRef<Path>) -> CardScanResult<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            // Ensure parent directory exists
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(db_path)
        }
        .map_err(|e| CardScanError::storage_connection(e.to_string()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        };
        store.create_table()?;

        info!(path = %db_path.display(), "Card store opened");
        Ok(store)
    }

    pub fn in_memory() -> CardScanResult<Self> {
        Self::new(":memory:")
    }

    fn lock(&self) -> CardScanResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| CardScanError::storage("Card store lock poisoned"))
    }

    fn create_table(&self) -> CardScanResult<()> {
        let guard = self.lock()?;
        let conn = open(&guard)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS cards (
                id             TEXT PRIMARY KEY,
                surname        TEXT NOT NULL,
                given_name     TEXT NOT NULL,
                policy_number  TEXT NOT NULL,
                insurer        TEXT NOT NULL,
                registered_at  TEXT NOT NULL,
                image_data     TEXT
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cards_registered_at ON cards(registered_at)",
            [],
        )?;

        Ok(())
    }
}

fn open<'a>(guard: &'a MutexGuard<'_, Option<Connection>>) -> CardScanResult<&'a Connection> {
    guard
        .as_ref()
        .ok_or_else(|| CardScanError::storage_connection("Card store is closed"))
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn create(&self, card: NewCard) -> CardScanResult<CardRecord> {
        let record = CardRecord::issue(card)?;

        let guard = self.lock()?;
        let conn = open(&guard)?;
        conn.execute(
            r#"
            INSERT INTO cards (
                id, surname, given_name, policy_number, insurer,
                registered_at, image_data
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.surname,
                record.given_name,
                record.policy_number,
                record.insurer,
                format_timestamp(&record.registered_at),
                record.image_data,
            ],
        )?;

        debug!(id = %record.id, "Card inserted");
        Ok(record)
    }

    async fn list(&self) -> CardScanResult<Vec<CardRecord>> {
        let guard = self.lock()?;
        let conn = open(&guard)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, surname, given_name, policy_number, insurer,
                   registered_at, image_data
            FROM cards
            ORDER BY registered_at DESC, rowid DESC
            "#,
        )?;

        let records = stmt.query_map([], |row| {
            Ok(CardRecord {
                id: row.get(0)?,
                surname: row.get(1)?,
                given_name: row.get(2)?,
                policy_number: row.get(3)?,
                insurer: row.get(4)?,
                registered_at: parse_timestamp(5, row.get(5)?)?,
                image_data: row.get(6)?,
            })
        })?;

        Ok(records.collect::<Result<Vec<_>, _>>()?)
    }

    async fn close(&self) -> CardScanResult<()> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| CardScanError::from(e))?;
            info!("Card store closed");
        }
        Ok(())
    }
}
