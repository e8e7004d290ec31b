//! The incremental poll cycle.
//!
//! `run_cycle` is the heart of the monitor: read the watermark, fetch what is
//! new, run the health probes, render, deliver, and only then advance the
//! watermark. Every collaborator sits behind a trait, so the cycle logic is
//! testable without a database or a network.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::database::{ErrorLogSource, HealthCheckSource};
use crate::error::Result;
use crate::monitor::audit::AuditLog;
use crate::monitor::delivery::ReportDelivery;
use crate::monitor::report::ReportBuilder;
use crate::watermark::WatermarkStore;

/// Outcome of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// New error-log rows seen this cycle.
    pub new_errors: usize,
    /// Health findings seen this cycle.
    pub findings: usize,
    /// Whether a report was sent. False means the cycle was idle and
    /// send-on-idle is off; a failed send is an error, not `false`.
    pub delivered: bool,
    /// Watermark value after the cycle.
    pub watermark: i64,
}

/// Incremental watermark poller over the error log and health probes.
pub struct Monitor {
    error_log: Arc<dyn ErrorLogSource>,
    health: Arc<dyn HealthCheckSource>,
    watermark: Arc<dyn WatermarkStore>,
    builder: Arc<dyn ReportBuilder>,
    delivery: Arc<dyn ReportDelivery>,
    audit: Option<AuditLog>,
    watermark_key: String,
    send_on_idle: bool,
}

impl Monitor {
    pub fn new(
        error_log: Arc<dyn ErrorLogSource>,
        health: Arc<dyn HealthCheckSource>,
        watermark: Arc<dyn WatermarkStore>,
        builder: Arc<dyn ReportBuilder>,
        delivery: Arc<dyn ReportDelivery>,
        watermark_key: impl Into<String>,
        send_on_idle: bool,
    ) -> Self {
        Self {
            error_log,
            health,
            watermark,
            builder,
            delivery,
            audit: None,
            watermark_key: watermark_key.into(),
            send_on_idle,
        }
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run one full cycle. The watermark advances only after delivery has
    /// succeeded or was legitimately skipped; any earlier failure leaves it
    /// untouched so the next cycle re-fetches the same records.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let since = self.watermark.get(&self.watermark_key).await?;
        let errors = self.error_log.fetch_since(since).await?;
        let findings = self.health.run_health_check().await?;

        info!(
            since,
            new_errors = errors.len(),
            findings = findings.len(),
            "cycle data collected"
        );

        let now = Utc::now();
        let delivered = match self.builder.build(&errors, &findings, now) {
            Some(report) => {
                self.delivery.send(&report.subject, &report.body).await?;
                true
            }
            None if self.send_on_idle => {
                let report = self.builder.idle_report(now);
                self.delivery.send(&report.subject, &report.body).await?;
                true
            }
            None => {
                info!("idle cycle, delivery skipped");
                false
            }
        };

        if let Some(audit) = &self.audit {
            audit.append(&errors);
        }

        // fetch_since returns ascending ids, so the last row carries the max.
        let watermark = match errors.last() {
            Some(last) => {
                self.watermark.set(&self.watermark_key, last.error_id).await?;
                last.error_id
            }
            None => since,
        };

        Ok(CycleReport {
            new_errors: errors.len(),
            findings: findings.len(),
            delivered,
            watermark,
        })
    }

    /// Cycle forever with `interval` between cycles. A failed cycle is
    /// logged and the loop continues; the `shutdown` signal stops the loop
    /// between cycles, never mid-write.
    pub async fn run_loop(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            match self.run_cycle().await {
                Ok(cycle) => info!(
                    new_errors = cycle.new_errors,
                    findings = cycle.findings,
                    delivered = cycle.delivered,
                    watermark = cycle.watermark,
                    "cycle complete"
                ),
                Err(e) => error!(error = %e, "cycle failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("monitor loop stopping");
                        return;
                    }
                }
            }
        }
    }
}
