//! # Database Collaborators
//!
//! Concrete sqlx/Postgres implementations of the external interfaces the
//! core consumes: the error-log source, the health-check probe registry, the
//! account listing and the ledger operation routines. Business logic lives in
//! the database; these types are transport glue behind narrow async traits.

pub mod accounts;
pub mod connection;
pub mod error_log;
pub mod health;
pub mod operations;

pub use accounts::SqlAccountSource;
pub use connection::DatabaseConnection;
pub use error_log::{ErrorLogSource, SqlErrorLogSource};
pub use health::{HealthCheckSource, Probe, SqlHealthCheckSource};
pub use operations::{
    LedgerOperations, OperationKind, OperationRequest, SqlLedgerOperations,
};
