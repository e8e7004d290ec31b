//! Report summarization strategies.
//!
//! The HTML report can carry a short executive summary above the tables. The
//! natural-language summarization service is an external collaborator; the
//! built-in strategy is the deterministic rule-based rollup that also serves
//! as its fallback.

use std::collections::BTreeMap;

use crate::models::{ErrorRecord, HealthFinding};

/// Summary strategy for a cycle's findings.
pub trait Summarizer: Send + Sync {
    /// A short human summary, or `None` when the strategy has nothing to say.
    fn summarize(&self, errors: &[ErrorRecord], findings: &[HealthFinding]) -> Option<String>;
}

/// Deterministic rollup: totals, time span, by-procedure and by-code counts,
/// plus fixed guidance for well-known codes.
pub struct RuleBasedSummarizer;

impl Summarizer for RuleBasedSummarizer {
    fn summarize(&self, errors: &[ErrorRecord], findings: &[HealthFinding]) -> Option<String> {
        if errors.is_empty() && findings.is_empty() {
            return Some("No new errors; health OK.".to_string());
        }

        let mut lines = Vec::new();

        if !errors.is_empty() {
            let first = &errors[0];
            let last = &errors[errors.len() - 1];
            let span = format!(
                "{} -> {}",
                first.occurred_at.format("%Y-%m-%d %H:%M:%SZ"),
                last.occurred_at.format("%Y-%m-%d %H:%M:%SZ")
            );

            // BTreeMap for stable ordering in the rendered rollup.
            let mut by_proc: BTreeMap<&str, usize> = BTreeMap::new();
            let mut by_code: BTreeMap<i32, usize> = BTreeMap::new();
            for record in errors {
                *by_proc.entry(record.proc_name.as_str()).or_default() += 1;
                *by_code.entry(record.error_number).or_default() += 1;
            }
            let proc_part = by_proc
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect::<Vec<_>>()
                .join(", ");
            let code_part = by_code
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect::<Vec<_>>()
                .join(", ");

            lines.push(format!(
                "{} new error(s) during {span}. By proc [{proc_part}]. By code [{code_part}].",
                errors.len()
            ));

            if by_code.contains_key(&50003) {
                lines.push(
                    "Err 50003 (Insufficient funds): treat as business rejection; ensure the \
                     caller validates balance and avoids retry loops."
                        .to_string(),
                );
            }
        }

        if findings.is_empty() {
            lines.push("HealthCheck: OK.".to_string());
        } else {
            lines.push(format!(
                "HealthCheck reported {} issue(s) - see details below.",
                findings.len()
            ));
        }

        Some(lines.join(" "))
    }
}
