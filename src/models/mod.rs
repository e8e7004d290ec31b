//! # Data Models
//!
//! Row types shared between the database collaborators and the monitor:
//! immutable error-log records and opaque health-check findings.

pub mod account;
pub mod error_record;
pub mod health_finding;

pub use account::Account;
pub use error_record::ErrorRecord;
pub use health_finding::HealthFinding;
