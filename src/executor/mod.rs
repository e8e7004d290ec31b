//! # Operation Executor
//!
//! Runs a business operation against the ledger under the retry policy and
//! maps the result to a typed outcome. The executor owns reference
//! generation: a request without an idempotency reference gets a fresh
//! `<prefix>-<uuid12>` token, and the same reference is reused across retry
//! attempts so a retried operation cannot double-apply.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::database::{LedgerOperations, OperationKind, OperationRequest};
use crate::resilience::{RetryOutcome, RetryPolicy};

/// Terminal outcome of an executed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// Committed, with the idempotency reference it was recorded under.
    Committed { reference: String },
    /// Rejected by a business rule; nothing was applied.
    Rejected {
        code: i32,
        message: String,
        reference: String,
    },
    /// Unknown failure or exhausted retries; the last attempt was rolled back.
    Failed {
        code: Option<i32>,
        attempts: u32,
        message: String,
        reference: String,
    },
}

/// Executes ledger operations under the retry policy.
pub struct OperationExecutor {
    ledger: Arc<dyn LedgerOperations>,
    retry: Arc<RetryPolicy>,
}

impl OperationExecutor {
    pub fn new(ledger: Arc<dyn LedgerOperations>, retry: Arc<RetryPolicy>) -> Self {
        Self { ledger, retry }
    }

    /// Execute `kind`, generating a reference when the caller supplied none.
    pub async fn execute(
        &self,
        kind: OperationKind,
        reference: Option<String>,
    ) -> OperationOutcome {
        let reference =
            reference.unwrap_or_else(|| generate_reference(kind.reference_prefix()));
        let request = OperationRequest {
            kind,
            reference: reference.clone(),
        };
        let routine = request.kind.routine();

        let outcome = self
            .retry
            .execute(routine, || self.ledger.invoke(&request))
            .await;

        match outcome {
            RetryOutcome::Success(()) => {
                info!(routine, reference = %reference, "operation committed");
                OperationOutcome::Committed { reference }
            }
            RetryOutcome::BusinessRejection { code, message } => OperationOutcome::Rejected {
                code,
                message,
                reference,
            },
            RetryOutcome::FatalError {
                code,
                attempts,
                message,
            } => OperationOutcome::Failed {
                code,
                attempts,
                message,
                reference,
            },
        }
    }
}

/// `<prefix>-<12 hex chars>` idempotency token.
fn generate_reference(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &uuid[..12])
}
