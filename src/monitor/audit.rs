//! Best-effort CSV audit trail.
//!
//! Appends every processed error record to a local CSV file so an operator
//! can grep history without touching the database. The sink is strictly
//! best-effort: an append failure is logged and the cycle carries on — audit
//! must never gate delivery or the watermark.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use crate::models::ErrorRecord;

const CSV_HEADER: &str = "error_id,occurred_at,proc_name,error_number,error_message";

/// Append-only CSV sink for processed error records.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append `records`, writing the header first on a fresh file. Failures
    /// are logged and swallowed.
    pub fn append(&self, records: &[ErrorRecord]) {
        if records.is_empty() {
            return;
        }
        if let Err(e) = self.try_append(records) {
            warn!(path = %self.path.display(), error = %e, "audit append failed");
        }
    }

    fn try_append(&self, records: &[ErrorRecord]) -> std::io::Result<()> {
        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            writeln!(file, "{CSV_HEADER}")?;
        }
        for record in records {
            writeln!(
                file,
                "{},{},{},{},{}",
                record.error_id,
                record.occurred_at.format("%Y-%m-%dT%H:%M:%SZ"),
                csv_field(&record.proc_name),
                record.error_number,
                csv_field(&record.error_message),
            )?;
        }
        Ok(())
    }
}

/// Quote a field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, message: &str) -> ErrorRecord {
        ErrorRecord {
            error_id: id,
            proc_name: "usp_Withdraw".to_string(),
            error_number: 50003,
            error_message: message.to_string(),
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AuditLog::new(dir.path().join("audit.csv"));

        log.append(&[record(1, "boom")]);
        log.append(&[record(2, "boom again")]);

        let content = std::fs::read_to_string(dir.path().join("audit.csv")).expect("read");
        assert_eq!(content.matches(CSV_HEADER).count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AuditLog::new(dir.path().join("audit.csv"));
        log.append(&[record(9, "Insufficient funds, account 42")]);

        let content = std::fs::read_to_string(dir.path().join("audit.csv")).expect("read");
        assert!(content.contains("\"Insufficient funds, account 42\""));
    }

    #[test]
    fn append_failure_is_swallowed() {
        // A directory path cannot be opened for append.
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AuditLog::new(dir.path().to_path_buf());
        log.append(&[record(1, "boom")]);
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.csv");
        AuditLog::new(path.clone()).append(&[]);
        assert!(!path.exists());
    }
}
