//! End-to-end monitor cycles with in-memory collaborators.
//!
//! Exercises the full poll → classify → report → deliver → advance-watermark
//! path without a database or network: fixed error-log and health sources,
//! a recording delivery sink, and the real classifier and report builders.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use fintx_ops::classification::Classifier;
use fintx_ops::database::{ErrorLogSource, HealthCheckSource};
use fintx_ops::error::{OpsError, Result};
use fintx_ops::models::{ErrorRecord, HealthFinding};
use fintx_ops::monitor::{Monitor, PlainReportBuilder, ReportDelivery};
use fintx_ops::watermark::{InMemoryWatermarkStore, WatermarkStore};

fn record(id: i64, proc_name: &str, code: i32, message: &str) -> ErrorRecord {
    ErrorRecord {
        error_id: id,
        proc_name: proc_name.to_string(),
        error_number: code,
        error_message: message.to_string(),
        occurred_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}

struct FixedErrorLog {
    records: Vec<ErrorRecord>,
}

#[async_trait]
impl ErrorLogSource for FixedErrorLog {
    async fn fetch_since(&self, since_id: i64) -> Result<Vec<ErrorRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.error_id > since_id)
            .cloned()
            .collect())
    }
}

struct FixedHealth {
    findings: Vec<HealthFinding>,
}

#[async_trait]
impl HealthCheckSource for FixedHealth {
    async fn run_health_check(&self) -> Result<Vec<HealthFinding>> {
        Ok(self.findings.clone())
    }
}

#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<Vec<(String, String)>>,
    fail: Mutex<bool>,
}

impl RecordingDelivery {
    fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl ReportDelivery for RecordingDelivery {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        if *self.fail.lock() {
            return Err(OpsError::Delivery {
                message: "relay unavailable".to_string(),
            });
        }
        self.sent.lock().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn build_monitor(
    records: Vec<ErrorRecord>,
    findings: Vec<HealthFinding>,
    delivery: Arc<RecordingDelivery>,
    store: Arc<InMemoryWatermarkStore>,
    send_on_idle: bool,
) -> Monitor {
    let classifier = Arc::new(Classifier::default());
    Monitor::new(
        Arc::new(FixedErrorLog { records }),
        Arc::new(FixedHealth { findings }),
        store,
        Arc::new(PlainReportBuilder::new(classifier, "[FinTx]".to_string())),
        delivery,
        "last_error_id",
        send_on_idle,
    )
}

#[tokio::test]
async fn three_new_errors_are_reported_and_watermark_advances() {
    let records = vec![
        record(12, "usp_Withdraw", 50003, "Insufficient funds"),
        record(13, "usp_TransferFunds", 1205, "deadlock victim"),
        record(14, "usp_Deposit", 9999, "unexpected"),
    ];
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());
    store.set("last_error_id", 11).await.unwrap();

    let monitor = build_monitor(records, vec![], delivery.clone(), store.clone(), false);
    let cycle = monitor.run_cycle().await.expect("cycle");

    assert_eq!(cycle.new_errors, 3);
    assert!(cycle.delivered);
    assert_eq!(cycle.watermark, 14);
    assert_eq!(store.get("last_error_id").await.unwrap(), 14);

    let sent = delivery.sent.lock();
    assert_eq!(sent.len(), 1);
    let (subject, body) = &sent[0];
    assert!(subject.contains("3 new errors"));
    // Each record appears once, with the severity the classifier assigns.
    assert!(body.contains("12:") && body.contains("[P3]"));
    assert!(body.contains("13:") && body.contains("[P2]"));
    assert!(body.contains("14:"));
    assert_eq!(body.matches("Insufficient funds").count(), 2); // line + plan echo
}

#[tokio::test]
async fn failed_delivery_reports_same_records_next_cycle() {
    let records = vec![record(21, "usp_Withdraw", 1222, "lock request timeout")];
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());
    store.set("last_error_id", 20).await.unwrap();

    let monitor = build_monitor(records, vec![], delivery.clone(), store.clone(), false);

    delivery.set_failing(true);
    let err = monitor.run_cycle().await.expect_err("delivery down");
    assert!(matches!(err, OpsError::Delivery { .. }));
    assert_eq!(store.get("last_error_id").await.unwrap(), 20);

    // Next cycle re-fetches and re-reports the same row.
    delivery.set_failing(false);
    let cycle = monitor.run_cycle().await.expect("cycle");
    assert_eq!(cycle.new_errors, 1);
    assert_eq!(cycle.watermark, 21);
    let sent = delivery.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("21:"));
}

#[tokio::test]
async fn idle_cycle_with_flag_off_sends_nothing_and_keeps_watermark() {
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());
    store.set("last_error_id", 30).await.unwrap();

    let monitor = build_monitor(vec![], vec![], delivery.clone(), store.clone(), false);
    let cycle = monitor.run_cycle().await.expect("cycle");

    assert!(!cycle.delivered);
    assert_eq!(cycle.watermark, 30);
    assert!(delivery.sent.lock().is_empty());
}

#[tokio::test]
async fn idle_cycle_with_flag_on_sends_explicit_ok_report() {
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());

    let monitor = build_monitor(vec![], vec![], delivery.clone(), store, true);
    let cycle = monitor.run_cycle().await.expect("cycle");

    assert!(cycle.delivered);
    let sent = delivery.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.contains("0 new errors"));
    assert!(sent[0].1.contains("HealthCheck: OK"));
}

#[tokio::test]
async fn health_findings_alone_produce_a_report() {
    let findings = vec![
        HealthFinding::new("duplicate_refs", vec!["wd-abc".into(), "2".into()]),
        HealthFinding::new("negative_balances", vec!["7".into(), "Dana".into(), "-12.50".into()]),
    ];
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());

    let monitor = build_monitor(vec![], findings, delivery.clone(), store.clone(), false);
    let cycle = monitor.run_cycle().await.expect("cycle");

    assert!(cycle.delivered);
    assert_eq!(cycle.findings, 2);
    assert_eq!(store.get("last_error_id").await.unwrap(), 0);

    let sent = delivery.sent.lock();
    assert!(sent[0].0.contains("issues found"));
    assert!(sent[0].1.contains("[duplicate_refs]"));
    assert!(sent[0].1.contains("[negative_balances]"));
}

#[tokio::test]
async fn watermark_never_moves_backwards_across_cycles() {
    let records = vec![
        record(5, "usp_Deposit", 1205, "deadlock victim"),
        record(9, "usp_Deposit", 1205, "deadlock victim"),
    ];
    let delivery = Arc::new(RecordingDelivery::default());
    let store = Arc::new(InMemoryWatermarkStore::new());

    let monitor = build_monitor(records, vec![], delivery, store.clone(), false);

    let mut last = 0;
    for _ in 0..3 {
        let cycle = monitor.run_cycle().await.expect("cycle");
        assert!(cycle.watermark >= last);
        last = cycle.watermark;
    }
    assert_eq!(last, 9);
}
