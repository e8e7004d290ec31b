//! Error-log source.
//!
//! Fetches error-log rows strictly after a given id, ascending — the
//! contract the incremental poller's watermark is built on.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{OpsError, Result};
use crate::models::ErrorRecord;

/// External error-log data source.
#[async_trait]
pub trait ErrorLogSource: Send + Sync {
    /// All records with `error_id > since_id`, ordered ascending by id.
    async fn fetch_since(&self, since_id: i64) -> Result<Vec<ErrorRecord>>;
}

/// sqlx-backed error-log source reading the `error_log` table.
pub struct SqlErrorLogSource {
    pool: PgPool,
}

impl SqlErrorLogSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent rows, newest first. Used by the CLI `show-errors` command,
    /// not by the poller.
    pub async fn fetch_recent(&self, limit: i64) -> Result<Vec<ErrorRecord>> {
        sqlx::query_as::<_, ErrorRecord>(
            "SELECT error_id, proc_name, error_number, error_message, occurred_at
             FROM error_log
             ORDER BY error_id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OpsError::database("fetch_recent", &e))
    }
}

#[async_trait]
impl ErrorLogSource for SqlErrorLogSource {
    async fn fetch_since(&self, since_id: i64) -> Result<Vec<ErrorRecord>> {
        sqlx::query_as::<_, ErrorRecord>(
            "SELECT error_id, proc_name, error_number, error_message, occurred_at
             FROM error_log
             WHERE error_id > $1
             ORDER BY error_id ASC",
        )
        .bind(since_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OpsError::database("fetch_since", &e))
    }
}
