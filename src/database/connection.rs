//! Connection pool management for the transactional database.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::error::{OpsError, Result};

/// Owned connection pool built from explicit configuration.
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Connect using the configured URL, pool size and acquire timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool)
            .acquire_timeout(Duration::from_secs(config.checkout_timeout))
            .connect(&config.database_url())
            .await
            .map_err(|e| OpsError::database("connect", &e))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> Result<bool> {
        let row: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OpsError::database("health_check", &e))?;
        Ok(row.0 == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
