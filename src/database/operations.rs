//! Ledger operation routines.
//!
//! The business rules for deposit/withdraw/transfer live in database
//! routines, opaque to this crate. Each invocation runs in its own
//! transaction: commit on success, explicit rollback on any failure, so a
//! rejected operation "did not happen" before the outcome is returned.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{OpsError, Result};

/// A single business operation with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    Deposit {
        account_id: i64,
        amount: f64,
    },
    Withdraw {
        account_id: i64,
        amount: f64,
    },
    Transfer {
        from_account: i64,
        to_account: i64,
        amount: f64,
    },
}

impl OperationKind {
    /// Prefix used when generating a reference token for this kind.
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            OperationKind::Deposit { .. } => "dep",
            OperationKind::Withdraw { .. } => "wd",
            OperationKind::Transfer { .. } => "tx",
        }
    }

    /// Routine name, for logging.
    pub fn routine(&self) -> &'static str {
        match self {
            OperationKind::Deposit { .. } => "fintx_deposit",
            OperationKind::Withdraw { .. } => "fintx_withdraw",
            OperationKind::Transfer { .. } => "fintx_transfer_funds",
        }
    }
}

/// One fully-specified operation invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    /// Idempotency reference recorded with the transaction.
    pub reference: String,
}

/// External business-operation collaborator.
#[async_trait]
pub trait LedgerOperations: Send + Sync {
    /// Invoke the routine for `request`, committing on success and rolling
    /// back before returning any failure.
    async fn invoke(&self, request: &OperationRequest) -> Result<()>;
}

/// sqlx-backed ledger calling the `fintx_*` SQL routines.
pub struct SqlLedgerOperations {
    pool: PgPool,
}

impl SqlLedgerOperations {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerOperations for SqlLedgerOperations {
    async fn invoke(&self, request: &OperationRequest) -> Result<()> {
        let routine = request.kind.routine();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| OpsError::database(routine, &e))?;

        let query = match &request.kind {
            OperationKind::Deposit { account_id, amount } => {
                sqlx::query("SELECT fintx_deposit($1, $2, $3)")
                    .bind(account_id)
                    .bind(amount)
                    .bind(&request.reference)
            }
            OperationKind::Withdraw { account_id, amount } => {
                sqlx::query("SELECT fintx_withdraw($1, $2, $3)")
                    .bind(account_id)
                    .bind(amount)
                    .bind(&request.reference)
            }
            OperationKind::Transfer {
                from_account,
                to_account,
                amount,
            } => sqlx::query("SELECT fintx_transfer_funds($1, $2, $3, $4)")
                .bind(from_account)
                .bind(to_account)
                .bind(amount)
                .bind(&request.reference),
        };

        match query.execute(&mut *tx).await {
            Ok(_) => {
                tx.commit()
                    .await
                    .map_err(|e| OpsError::database(routine, &e))?;
                debug!(routine, reference = %request.reference, "operation committed");
                Ok(())
            }
            Err(e) => {
                // Roll back before surfacing the failure so a rejected
                // operation leaves no partial state behind.
                let failure = OpsError::database(routine, &e);
                if let Err(rollback_err) = tx.rollback().await {
                    debug!(routine, error = %rollback_err, "rollback after failure also failed");
                }
                Err(failure)
            }
        }
    }
}
