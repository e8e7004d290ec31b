//! # Watermark Store
//!
//! Persists the last-processed error-log id so no record is processed twice
//! and none is missed across restarts. The store is a plain key/value
//! collaborator: `get` defaults to 0 for an absent key ("no history"), `set`
//! is a durable upsert that completes before returning.
//!
//! Single-writer assumption: one poller instance per watermark key. Running
//! several pollers against the same key is a misconfiguration, not a handled
//! race.

mod memory;
mod sqlite;

pub use memory::InMemoryWatermarkStore;
pub use sqlite::SqliteWatermarkStore;

use async_trait::async_trait;

use crate::error::Result;

/// Key/value persistence for watermarks.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Current value for `key`, or 0 when the key has never been written.
    async fn get(&self, key: &str) -> Result<i64>;

    /// Upsert `value` under `key`, durable before returning.
    async fn set(&self, key: &str, value: i64) -> Result<()>;
}
