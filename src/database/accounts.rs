//! Account listing source.
//!
//! Read-only view over the `accounts` table for the CLI inspection
//! commands; the poller never touches it.

use sqlx::PgPool;

use crate::error::{OpsError, Result};
use crate::models::Account;

/// sqlx-backed account listing.
pub struct SqlAccountSource {
    pool: PgPool,
}

impl SqlAccountSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All accounts ordered by id. Used by the CLI `show-accounts` command.
    pub async fn fetch_accounts(&self) -> Result<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT account_id, customer_name, balance::float8 AS balance
             FROM accounts
             ORDER BY account_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OpsError::database("fetch_accounts", &e))
    }
}
