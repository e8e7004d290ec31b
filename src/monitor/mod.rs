//! # Incremental Monitor
//!
//! The poll → classify → report → deliver → advance-watermark cycle.
//!
//! One [`Monitor`] owns the cycle logic; which report builder and delivery
//! collaborator are wired in is the caller's choice, so the plain-text and
//! HTML variants share a single implementation of the cycle instead of two
//! copies. The watermark only advances after the delivery step succeeds (or
//! is legitimately skipped), giving at-least-once reporting: a failed cycle
//! re-fetches and re-reports the same records next time.

pub mod audit;
pub mod delivery;
pub mod poller;
pub mod report;
pub mod summarizer;

pub use audit::AuditLog;
pub use delivery::{ReportDelivery, WebhookDelivery};
pub use poller::{CycleReport, Monitor};
pub use report::{HtmlReportBuilder, PlainReportBuilder, Report, ReportBuilder};
pub use summarizer::{RuleBasedSummarizer, Summarizer};
