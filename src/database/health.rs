//! Health-check probe registry.
//!
//! Each probe is a named query whose columns are cast to text in SQL; every
//! row a probe returns is one finding. All probe result sets are flattened
//! into a single ordered list per invocation. Zero findings means healthy —
//! the report renders an explicit OK state, never an absent section.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::error::{OpsError, Result};
use crate::models::HealthFinding;

/// External health-check source.
#[async_trait]
pub trait HealthCheckSource: Send + Sync {
    /// Run every probe and flatten the findings, probe order preserved.
    async fn run_health_check(&self) -> Result<Vec<HealthFinding>>;
}

/// One named integrity probe.
pub struct Probe {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Built-in integrity probes over the ledger schema. Every selected column is
/// cast to text so rows stay opaque to the core.
const DEFAULT_PROBES: &[Probe] = &[
    Probe {
        name: "duplicate_refs",
        sql: "SELECT ref::text, COUNT(*)::text AS copies
              FROM transactions
              WHERE ref IS NOT NULL
              GROUP BY ref
              HAVING COUNT(*) > 1
              ORDER BY COUNT(*) DESC
              LIMIT 50",
    },
    Probe {
        name: "negative_balances",
        sql: "SELECT account_id::text, customer_name::text, balance::text
              FROM accounts
              WHERE balance < 0
              ORDER BY balance ASC
              LIMIT 50",
    },
    Probe {
        name: "orphaned_transactions",
        sql: "SELECT t.transaction_id::text, t.account_id::text
              FROM transactions t
              LEFT JOIN accounts a ON a.account_id = t.account_id
              WHERE a.account_id IS NULL
              ORDER BY t.transaction_id
              LIMIT 50",
    },
];

/// sqlx-backed health-check source running the probe registry.
pub struct SqlHealthCheckSource {
    pool: PgPool,
    probes: &'static [Probe],
}

impl SqlHealthCheckSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            probes: DEFAULT_PROBES,
        }
    }

    pub fn with_probes(pool: PgPool, probes: &'static [Probe]) -> Self {
        Self { pool, probes }
    }
}

#[async_trait]
impl HealthCheckSource for SqlHealthCheckSource {
    async fn run_health_check(&self) -> Result<Vec<HealthFinding>> {
        let mut findings = Vec::new();
        for probe in self.probes {
            let rows = sqlx::query(probe.sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| OpsError::database(probe.name, &e))?;

            debug!(probe = probe.name, rows = rows.len(), "health probe ran");

            for row in rows {
                let cells = (0..row.columns().len())
                    .map(|i| {
                        row.try_get::<Option<String>, _>(i)
                            .map(|v| v.unwrap_or_default())
                            .map_err(|e| OpsError::Database {
                                operation: probe.name.to_string(),
                                code: None,
                                message: e.to_string(),
                            })
                    })
                    .collect::<Result<Vec<String>>>()?;
                findings.push(HealthFinding::new(probe.name, cells));
            }
        }
        Ok(findings)
    }
}
