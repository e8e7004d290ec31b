//! Health-check findings.
//!
//! A finding is one row from an on-demand health probe. The column shape is
//! not fixed here — cells are passed through opaquely to the report builders.
//! Findings have no identity across invocations: they are never deduplicated,
//! only counted and reported fresh each cycle.

use serde::{Deserialize, Serialize};

/// One opaque row returned by a health probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFinding {
    /// Name of the probe that produced this row.
    pub probe: String,
    /// Column values rendered as text, in probe column order.
    pub cells: Vec<String>,
}

impl HealthFinding {
    pub fn new(probe: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            probe: probe.into(),
            cells,
        }
    }

    /// One-line rendering used by the plain report and the audit trail.
    pub fn summary_line(&self) -> String {
        format!("[{}] {}", self.probe, self.cells.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_joins_cells() {
        let finding = HealthFinding::new(
            "negative_balances",
            vec!["account=7".to_string(), "balance=-120.50".to_string()],
        );
        assert_eq!(
            finding.summary_line(),
            "[negative_balances] account=7 | balance=-120.50"
        );
    }
}
