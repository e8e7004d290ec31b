//! Report builders.
//!
//! Turn (new errors, health findings) into a deliverable artifact. `build`
//! returns `None` when both inputs are empty — "nothing to deliver" — and the
//! poller renders the explicit idle/OK report instead when configured to send
//! on idle. Every record and finding appears exactly once; severity and
//! remediation come from the classifier. The concrete format is a transport
//! concern: the plain and HTML builders are two strategies behind one trait.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::classification::Classifier;
use crate::models::{ErrorRecord, HealthFinding};
use crate::monitor::summarizer::Summarizer;

/// A rendered report ready for the delivery collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

/// Strategy turning a cycle's data into a report.
pub trait ReportBuilder: Send + Sync {
    /// `None` iff both inputs are empty.
    fn build(
        &self,
        errors: &[ErrorRecord],
        findings: &[HealthFinding],
        now: DateTime<Utc>,
    ) -> Option<Report>;

    /// Explicit "all clear" report for send-on-idle cycles.
    fn idle_report(&self, now: DateTime<Utc>) -> Report;
}

fn subject_line(prefix: &str, error_count: usize, findings_empty: bool) -> String {
    let health = if findings_empty {
        "health OK"
    } else {
        "issues found"
    };
    format!("{prefix} {error_count} new errors, {health}")
}

/// Plain-text report.
pub struct PlainReportBuilder {
    classifier: Arc<Classifier>,
    subject_prefix: String,
}

impl PlainReportBuilder {
    pub fn new(classifier: Arc<Classifier>, subject_prefix: String) -> Self {
        Self {
            classifier,
            subject_prefix,
        }
    }

    fn render_errors(&self, errors: &[ErrorRecord]) -> String {
        if errors.is_empty() {
            return "No new ErrorLog rows.".to_string();
        }
        errors
            .iter()
            .map(|record| {
                let classification = self.classifier.classify(
                    Some(record.error_number),
                    &record.proc_name,
                    &record.error_message,
                );
                format!(
                    "{} [{}] {}",
                    record.summary_line(),
                    classification.severity,
                    classification.remediation
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_health(findings: &[HealthFinding]) -> String {
        if findings.is_empty() {
            return "HealthCheck: OK".to_string();
        }
        findings
            .iter()
            .map(HealthFinding::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ReportBuilder for PlainReportBuilder {
    fn build(
        &self,
        errors: &[ErrorRecord],
        findings: &[HealthFinding],
        now: DateTime<Utc>,
    ) -> Option<Report> {
        if errors.is_empty() && findings.is_empty() {
            return None;
        }
        let body = format!(
            "Time: {}Z\n\n{}\n\n{}",
            now.format("%Y-%m-%d %H:%M:%S"),
            self.render_errors(errors),
            Self::render_health(findings)
        );
        Some(Report {
            subject: subject_line(&self.subject_prefix, errors.len(), findings.is_empty()),
            body,
        })
    }

    fn idle_report(&self, now: DateTime<Utc>) -> Report {
        Report {
            subject: subject_line(&self.subject_prefix, 0, true),
            body: format!(
                "Time: {}Z\n\nNo new ErrorLog rows.\n\nHealthCheck: OK",
                now.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const HTML_STYLE: &str = "
<style>
  body { font-family: Segoe UI, Arial, sans-serif; color:#0f172a; }
  .card { border:1px solid #e2e8f0; border-radius:10px; padding:16px; margin-bottom:16px; }
  .h { font-size:16px; font-weight:600; margin:0 0 10px 0; }
  table { border-collapse: collapse; width:100%; }
  th, td { border-bottom:1px solid #e2e8f0; padding:8px; text-align:left; font-size:13px; }
  th { background:#f8fafc; }
  .pill { padding:2px 8px; border-radius:999px; color:white; font-size:11px; }
  .P1 { background:#dc2626; } .P2 { background:#d97706; } .P3 { background:#059669; } .INFO { background:#64748b; }
  .mono { font-family: Consolas, monospace; }
  .footer { color:#64748b; font-size:12px; margin-top:8px; }
</style>
";

/// HTML report with severity pills and an optional executive summary.
pub struct HtmlReportBuilder {
    classifier: Arc<Classifier>,
    subject_prefix: String,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl HtmlReportBuilder {
    pub fn new(classifier: Arc<Classifier>, subject_prefix: String) -> Self {
        Self {
            classifier,
            subject_prefix,
            summarizer: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    fn render(
        &self,
        errors: &[ErrorRecord],
        findings: &[HealthFinding],
        now: DateTime<Utc>,
    ) -> String {
        let mut out = vec![format!(
            "<!doctype html><html><head>{HTML_STYLE}</head><body>"
        )];
        out.push(format!(
            "<div class='card'><div class='h'>FinTx Monitor Report <span class='mono'>{}Z</span></div>",
            now.format("%Y-%m-%d %H:%M:%S")
        ));

        if let Some(summarizer) = &self.summarizer {
            if let Some(summary) = summarizer.summarize(errors, findings) {
                out.push(format!(
                    "<pre class='mono' style='white-space:pre-wrap'>{}</pre>",
                    html_escape(&summary)
                ));
            }
        }

        if errors.is_empty() {
            out.push("<p>No new ErrorLog rows.</p>".to_string());
        } else {
            out.push("<div class='h'>New errors</div>".to_string());
            out.push(
                "<table><tr><th>ID</th><th>When (UTC)</th><th>Proc</th><th>Err#</th>\
                 <th>Message</th><th>Plan</th></tr>"
                    .to_string(),
            );
            for record in errors {
                let classification = self.classifier.classify(
                    Some(record.error_number),
                    &record.proc_name,
                    &record.error_message,
                );
                out.push(format!(
                    "<tr><td>{}</td><td class='mono'>{}</td><td>{}</td>\
                     <td><span class='pill {sev}'>{sev}</span> <span class='mono'>{}</span></td>\
                     <td>{}</td>\
                     <td><pre class='mono' style='white-space:pre-wrap'>{}</pre></td></tr>",
                    record.error_id,
                    record.occurred_at.format("%Y-%m-%d %H:%M:%SZ"),
                    html_escape(&record.proc_name),
                    record.error_number,
                    html_escape(&record.error_message),
                    html_escape(&classification.remediation),
                    sev = classification.severity,
                ));
            }
            out.push("</table>".to_string());
        }

        if findings.is_empty() {
            out.push("<p>HealthCheck: OK</p>".to_string());
        } else {
            out.push("<div class='h' style='margin-top:14px'>Health findings</div>".to_string());
            out.push("<table>".to_string());
            for finding in findings {
                let cells = std::iter::once(finding.probe.as_str())
                    .chain(finding.cells.iter().map(String::as_str))
                    .map(|cell| format!("<td class='mono'>{}</td>", html_escape(cell)))
                    .collect::<String>();
                out.push(format!("<tr>{cells}</tr>"));
            }
            out.push("</table>".to_string());
        }

        out.push(
            "<div class='footer'>This message was generated by the FinTx monitor.</div></div></body></html>"
                .to_string(),
        );
        out.join("")
    }
}

impl ReportBuilder for HtmlReportBuilder {
    fn build(
        &self,
        errors: &[ErrorRecord],
        findings: &[HealthFinding],
        now: DateTime<Utc>,
    ) -> Option<Report> {
        if errors.is_empty() && findings.is_empty() {
            return None;
        }
        Some(Report {
            subject: subject_line(&self.subject_prefix, errors.len(), findings.is_empty()),
            body: self.render(errors, findings, now),
        })
    }

    fn idle_report(&self, now: DateTime<Utc>) -> Report {
        Report {
            subject: subject_line(&self.subject_prefix, 0, true),
            body: self.render(&[], &[], now),
        }
    }
}
