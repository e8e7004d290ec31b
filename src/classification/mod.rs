//! # Failure Classification
//!
//! Classifies raw database failure codes into handling categories and
//! human-facing severity/remediation for reporting.
//!
//! A single canonical table drives both concerns: the retry policy derives
//! retry eligibility from `category == Transient`, and the report builders
//! attach the severity and remediation text. The table is total — every code,
//! including unrecognized ones, maps to a defined outcome.

mod classifier;

pub use classifier::{Classification, Classifier, FailureCategory, Severity};
