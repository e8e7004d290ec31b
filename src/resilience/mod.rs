//! # Resilience Patterns
//!
//! Bounded retry with linear backoff for operations subject to transient
//! database contention, plus the [`FailureCode`] capability that lets the
//! retry policy recover a numeric engine code from any failure value.

mod retry;

pub use retry::{scan_failure_code, FailureCode, RetryOutcome, RetryPolicy};
