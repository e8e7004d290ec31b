//! Canonical failure-code classification.
//!
//! Pure and deterministic: no I/O, no clock, no ambient state. The code
//! tables are built once from [`ClassificationConfig`] at construction so no
//! component reads process environment directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ClassificationConfig;

/// Handling category for a failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Infrastructure-level contention or timeout — safe to retry.
    Transient,
    /// Expected domain rejection — never retried, returned as a typed outcome.
    Business,
    /// Unclassified — surfaced for investigation, never silently swallowed.
    Unknown,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCategory::Transient => write!(f, "Transient"),
            FailureCategory::Business => write!(f, "Business"),
            FailureCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Report severity attached to a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    P1,
    P2,
    P3,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::P1 => write!(f, "P1"),
            Severity::P2 => write!(f, "P2"),
            Severity::P3 => write!(f, "P3"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Result of classifying one failure code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: FailureCategory,
    pub severity: Severity,
    pub remediation: String,
}

/// One canonical table entry. A `None` remediation falls back to the default
/// investigate text, which echoes the originating procedure and message.
struct CodeEntry {
    category: FailureCategory,
    severity: Severity,
    remediation: Option<&'static str>,
}

const TRANSIENT_CONCURRENCY_PLAN: &str =
    "Transient concurrency issue (deadlock or lock timeout). Action: retry with backoff; \
     the operation executor already retries automatically.";

const TRANSIENT_INFRA_PLAN: &str =
    "Transient infrastructure issue (database unavailable or throttled). Action: retry with \
     backoff; escalate if the code keeps recurring across cycles.";

const DUPLICATE_REF_PLAN: &str =
    "Duplicate reference detected. Action: verify the ref, keep the earliest transaction, \
     void or cancel the duplicates before re-submitting.";

const INSUFFICIENT_FUNDS_PLAN: &str =
    "Insufficient funds. Action: deposit to the source account, reduce the transfer amount, \
     or retry later.";

/// Failure-code classifier backed by the canonical code table.
pub struct Classifier {
    table: HashMap<i32, CodeEntry>,
}

impl Classifier {
    /// Build a classifier with the built-in table plus configured extensions.
    pub fn new(config: &ClassificationConfig) -> Self {
        let mut table = Self::builtin_table();
        for &code in &config.extra_transient_codes {
            table.entry(code).or_insert(CodeEntry {
                category: FailureCategory::Transient,
                severity: Severity::P2,
                remediation: Some(TRANSIENT_INFRA_PLAN),
            });
        }
        for &code in &config.extra_business_codes {
            table.entry(code).or_insert(CodeEntry {
                category: FailureCategory::Business,
                severity: Severity::P3,
                remediation: None,
            });
        }
        Self { table }
    }

    fn builtin_table() -> HashMap<i32, CodeEntry> {
        let mut table = HashMap::new();

        // Deadlock victim / lock-request timeout.
        for code in [1205, 1222] {
            table.insert(
                code,
                CodeEntry {
                    category: FailureCategory::Transient,
                    severity: Severity::P2,
                    remediation: Some(TRANSIENT_CONCURRENCY_PLAN),
                },
            );
        }

        // Database unavailable / throttling family.
        for code in [4060, 40197, 40501, 49918, 49919, 49920] {
            table.insert(
                code,
                CodeEntry {
                    category: FailureCategory::Transient,
                    severity: Severity::P2,
                    remediation: Some(TRANSIENT_INFRA_PLAN),
                },
            );
        }

        // Unique-constraint violation on a transaction reference. 2601 is an
        // expected rejection once the constraint fires; 2627 carries the same
        // remediation but propagates as a fatal error rather than a business
        // rejection, so it is never retried and never swallowed.
        table.insert(
            2601,
            CodeEntry {
                category: FailureCategory::Business,
                severity: Severity::P2,
                remediation: Some(DUPLICATE_REF_PLAN),
            },
        );
        table.insert(
            2627,
            CodeEntry {
                category: FailureCategory::Unknown,
                severity: Severity::P2,
                remediation: Some(DUPLICATE_REF_PLAN),
            },
        );

        // Expected business rejections raised by the ledger routines.
        table.insert(
            50003,
            CodeEntry {
                category: FailureCategory::Business,
                severity: Severity::P3,
                remediation: Some(INSUFFICIENT_FUNDS_PLAN),
            },
        );
        for code in [50001, 50002] {
            table.insert(
                code,
                CodeEntry {
                    category: FailureCategory::Business,
                    severity: Severity::P2,
                    remediation: None,
                },
            );
        }

        table
    }

    /// Classify a failure code. Total: unrecognized codes (and failures with
    /// no code at all) map to `Unknown`/`P2` with the investigate plan.
    pub fn classify(&self, code: Option<i32>, proc_name: &str, message: &str) -> Classification {
        let proc_name = if proc_name.is_empty() {
            "unknown"
        } else {
            proc_name
        };

        match code.and_then(|c| self.table.get(&c)) {
            Some(entry) => Classification {
                category: entry.category,
                severity: entry.severity,
                remediation: entry
                    .remediation
                    .map(str::to_string)
                    .unwrap_or_else(|| Self::investigate_plan(proc_name, message)),
            },
            None => Classification {
                category: FailureCategory::Unknown,
                severity: Severity::P2,
                remediation: Self::investigate_plan(proc_name, message),
            },
        }
    }

    fn investigate_plan(proc_name: &str, message: &str) -> String {
        format!("Investigate in database tooling. Procedure={proc_name}, Message={message}")
    }

    /// Whether the retry policy may re-attempt an operation failing with this code.
    pub fn is_retry_eligible(&self, code: i32) -> bool {
        self.category_of(code) == FailureCategory::Transient
    }

    /// Whether this code signals an expected business rejection.
    pub fn is_business(&self, code: i32) -> bool {
        self.category_of(code) == FailureCategory::Business
    }

    fn category_of(&self, code: i32) -> FailureCategory {
        self.table
            .get(&code)
            .map(|e| e.category)
            .unwrap_or(FailureCategory::Unknown)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes_are_retry_eligible() {
        let classifier = Classifier::default();
        for code in [1205, 1222, 4060, 40197, 40501, 49918, 49919, 49920] {
            assert!(classifier.is_retry_eligible(code), "code {code}");
            let c = classifier.classify(Some(code), "usp_TransferFunds", "boom");
            assert_eq!(c.category, FailureCategory::Transient);
            assert_eq!(c.severity, Severity::P2);
        }
    }

    #[test]
    fn business_codes_are_never_retried() {
        let classifier = Classifier::default();
        for code in [50001, 50002, 50003, 2601] {
            assert!(classifier.is_business(code), "code {code}");
            assert!(!classifier.is_retry_eligible(code), "code {code}");
        }
    }

    #[test]
    fn insufficient_funds_is_p3() {
        let classifier = Classifier::default();
        let c = classifier.classify(Some(50003), "usp_Withdraw", "insufficient funds");
        assert_eq!(c.category, FailureCategory::Business);
        assert_eq!(c.severity, Severity::P3);
        assert!(c.remediation.contains("Insufficient funds"));
    }

    #[test]
    fn duplicate_key_codes_share_remediation_but_not_category() {
        let classifier = Classifier::default();
        let dup_2601 = classifier.classify(Some(2601), "usp_Deposit", "dup");
        let dup_2627 = classifier.classify(Some(2627), "usp_Deposit", "dup");
        assert_eq!(dup_2601.category, FailureCategory::Business);
        assert_eq!(dup_2627.category, FailureCategory::Unknown);
        assert_eq!(dup_2601.remediation, dup_2627.remediation);
        assert_eq!(dup_2601.severity, Severity::P2);
        assert!(!classifier.is_retry_eligible(2601));
        assert!(!classifier.is_retry_eligible(2627));
    }

    #[test]
    fn unrecognized_codes_default_to_unknown_p2() {
        let classifier = Classifier::default();
        for code in [0, -1, 1, 999, 8134, 547, i32::MAX, i32::MIN] {
            let c = classifier.classify(Some(code), "usp_Deposit", "mystery");
            assert_eq!(c.category, FailureCategory::Unknown, "code {code}");
            assert_eq!(c.severity, Severity::P2, "code {code}");
            assert!(c.remediation.contains("usp_Deposit"));
            assert!(c.remediation.contains("mystery"));
        }
    }

    #[test]
    fn missing_code_classifies_with_unknown_procedure_fallback() {
        let classifier = Classifier::default();
        let c = classifier.classify(None, "", "no code in here");
        assert_eq!(c.category, FailureCategory::Unknown);
        assert!(c.remediation.contains("Procedure=unknown"));
    }

    #[test]
    fn configured_extra_codes_extend_the_table() {
        let config = ClassificationConfig {
            extra_transient_codes: vec![64],
            extra_business_codes: vec![50010],
        };
        let classifier = Classifier::new(&config);
        assert!(classifier.is_retry_eligible(64));
        assert!(classifier.is_business(50010));
        // Built-in entries win over configured duplicates.
        let config = ClassificationConfig {
            extra_transient_codes: vec![2601],
            extra_business_codes: vec![],
        };
        let classifier = Classifier::new(&config);
        assert!(!classifier.is_retry_eligible(2601));
    }
}
