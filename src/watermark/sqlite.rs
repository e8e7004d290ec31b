//! SQLite-backed watermark store.
//!
//! A single local state file with one key/value table. Operations are
//! microsecond-scale single-row statements against a local file, so they run
//! directly on the calling task rather than through a blocking pool.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::Connection;

use super::WatermarkStore;
use crate::error::{OpsError, Result};

/// Watermark store persisted to a local SQLite file.
pub struct SqliteWatermarkStore {
    conn: Mutex<Connection>,
}

impl SqliteWatermarkStore {
    /// Open (or create) the state file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store backed by a private SQLite database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             CREATE TABLE IF NOT EXISTS watermarks (
                 key   TEXT PRIMARY KEY,
                 value INTEGER NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl WatermarkStore for SqliteWatermarkStore {
    async fn get(&self, key: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT value FROM watermarks WHERE key = ?1")?;
        let value = stmt
            .query_row([key], |row| row.get::<_, i64>(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(OpsError::from(other)),
            })?;
        Ok(value.unwrap_or(0))
    }

    async fn set(&self, key: &str, value: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO watermarks (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}
