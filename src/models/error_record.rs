//! # Error Record Model
//!
//! One row of the transactional database's error log.
//!
//! Records are immutable once created and `error_id` values are strictly
//! increasing in fetch order for a given source — the id is the ordering key
//! the watermark is built on.
//!
//! ## Database Schema
//!
//! Maps to the `error_log` table:
//! - `error_id`: primary key (BIGINT), monotonically increasing
//! - `proc_name`: originating routine; may be empty when unknown
//! - `error_number`: engine error code, resolved by the classifier
//! - `error_message`: free text
//! - `occurred_at`: source-assigned timestamp

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One error-log row as fetched from the external data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ErrorRecord {
    pub error_id: i64,
    pub proc_name: String,
    pub error_number: i32,
    pub error_message: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorRecord {
    /// One-line rendering used by the plain report and the audit trail.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: [{}] #{} @ {} -> {}",
            self.error_id,
            self.proc_name,
            self.error_number,
            self.occurred_at.format("%Y-%m-%d %H:%M:%SZ"),
            self.error_message
        )
    }
}
