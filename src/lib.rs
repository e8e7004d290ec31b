#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # FinTx Ops
//!
//! Operational resilience toolkit for a transactional ledger database:
//! an incremental error-log monitor with at-least-once report delivery, a
//! failure classifier with a bounded linear-backoff retry policy, and an
//! operation executor for the ledger's deposit/withdraw/transfer routines.
//!
//! ## Overview
//!
//! The monitor polls the database's `error_log` table from a persisted
//! watermark, runs a set of integrity health probes, renders a report
//! (plain text or HTML) and delivers it; the watermark advances only after
//! delivery succeeds, so a failed send is re-reported by the next cycle.
//! The classifier maps canonical failure codes to a category, severity and
//! remediation plan; the retry policy re-attempts transient failures with
//! linear backoff and surfaces business rejections as typed outcomes.
//!
//! ## Module Organization
//!
//! - [`classification`] - Failure taxonomy: category, severity, remediation
//! - [`resilience`] - Retry policy and failure-code extraction
//! - [`watermark`] - Persistent watermark store (SQLite and in-memory)
//! - [`monitor`] - Poll cycle, report builders, delivery, audit trail
//! - [`executor`] - Ledger operations under the retry policy
//! - [`database`] - sqlx-backed sources and ledger routines
//! - [`models`] - Error-log records and health findings
//! - [`config`] - YAML configuration with environment overlays
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fintx_ops::classification::Classifier;
//! use fintx_ops::config::FinTxConfig;
//! use fintx_ops::resilience::RetryPolicy;
//!
//! let config = FinTxConfig::default();
//! let classifier = Arc::new(Classifier::new(&config.classification));
//! let retry = RetryPolicy::new(classifier.clone(), &config.retry);
//!
//! let plan = classifier.classify(Some(1205), "usp_TransferFunds", "deadlock victim");
//! println!("{}: {}", plan.severity, plan.remediation);
//! ```

pub mod classification;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod resilience;
pub mod watermark;

pub use classification::{Classification, Classifier, FailureCategory, Severity};
pub use error::{OpsError, Result};
pub use executor::{OperationExecutor, OperationOutcome};
pub use monitor::{CycleReport, Monitor};
pub use resilience::{RetryOutcome, RetryPolicy};
