//! Retry policy with linear backoff.
//!
//! Wraps an async operation and consults the [`Classifier`] on each failure:
//! transient codes are re-attempted up to the configured limit with a delay of
//! `base_delay * attempt` before each retry, business codes return immediately
//! as a typed rejection, and everything else (including exhausted retries)
//! propagates as a fatal outcome. The backoff sleep blocks only the calling
//! task; operations are invoked from infrequent, short-lived call contexts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::classification::Classifier;
use crate::config::RetrySettings;

/// Capability to expose an optional structured failure code.
///
/// Failure sources that carry no structured code fall back to
/// [`scan_failure_code`] over their display text.
pub trait FailureCode {
    fn failure_code(&self) -> Option<i32>;
}

/// Best-effort numeric-token scan of a failure's textual representation.
///
/// Brackets, parentheses and `#` are treated as separators; the first token
/// consisting solely of ASCII digits wins. Text containing no number yields
/// `None` rather than an error.
pub fn scan_failure_code(text: &str) -> Option<i32> {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '(' | ')' | '#' | '[' | ']' => ' ',
            other => other,
        })
        .collect();

    for token in cleaned.split_whitespace() {
        if token.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(code) = token.parse::<i32>() {
                return Some(code);
            }
        }
    }
    None
}

/// Terminal outcome of a retried operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    /// The operation completed; the value is the operation's result.
    Success(T),
    /// An expected business rejection — the operation "did not happen" and
    /// must already have been rolled back by the collaborator.
    BusinessRejection { code: i32, message: String },
    /// Unknown failure or exhausted retries.
    FatalError {
        code: Option<i32>,
        attempts: u32,
        message: String,
    },
}

impl<T> RetryOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Success(_))
    }
}

/// Retry policy driving bounded re-attempts of a fallible async operation.
pub struct RetryPolicy {
    classifier: Arc<Classifier>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(classifier: Arc<Classifier>, settings: &RetrySettings) -> Self {
        Self {
            classifier,
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute `op`, retrying transient failures with linear backoff.
    ///
    /// The delay before re-attempting after failed attempt `k` (1-based) is
    /// `base_delay * k` — linear, not exponential.
    pub async fn execute<T, E, F, Fut>(&self, operation: &str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: FailureCode + std::fmt::Display,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "operation succeeded after retry");
                    }
                    return RetryOutcome::Success(value);
                }
                Err(err) => {
                    let code = err.failure_code();

                    if let Some(code) = code {
                        if self.classifier.is_business(code) {
                            debug!(operation, code, "business rejection, not retrying");
                            return RetryOutcome::BusinessRejection {
                                code,
                                message: err.to_string(),
                            };
                        }

                        if self.classifier.is_retry_eligible(code) && attempt < self.max_attempts {
                            let delay = self.base_delay * attempt;
                            warn!(
                                operation,
                                code,
                                attempt = attempt + 1,
                                max_attempts = self.max_attempts,
                                delay_ms = delay.as_millis() as u64,
                                "transient failure, retrying after backoff"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                    }

                    return RetryOutcome::FatalError {
                        code,
                        attempts: attempt,
                        message: err.to_string(),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    #[derive(Debug)]
    struct FakeFailure(Option<i32>, &'static str);

    impl FailureCode for FakeFailure {
        fn failure_code(&self) -> Option<i32> {
            self.0
        }
    }

    impl std::fmt::Display for FakeFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.1)
        }
    }

    fn policy(max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            Arc::new(Classifier::default()),
            &RetrySettings {
                max_attempts,
                base_delay_ms,
            },
        )
    }

    #[test]
    fn scan_finds_first_numeric_token() {
        assert_eq!(
            scan_failure_code("('42000', '[42000] [FreeTDS][SQL Server]Error 50003 ...')"),
            Some(42000)
        );
        assert_eq!(scan_failure_code("deadlock victim #1205 retry"), Some(1205));
        assert_eq!(scan_failure_code("no digits at all"), None);
        assert_eq!(scan_failure_code(""), None);
        // Mixed alphanumeric tokens are not codes.
        assert_eq!(scan_failure_code("sqlstate 40P01 aborted"), None);
        // Oversized digit runs are skipped, not fatal.
        assert_eq!(scan_failure_code("id 99999999999999999999 then 1222"), Some(1222));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_retries_with_linear_delays() {
        let policy = policy(3, 800);
        let calls = Mutex::new(0u32);
        let started = Instant::now();
        let mut attempt_offsets = Vec::new();

        let outcome = policy
            .execute("transfer", || {
                let mut calls = calls.lock();
                *calls += 1;
                attempt_offsets.push(started.elapsed());
                let n = *calls;
                async move {
                    if n < 3 {
                        Err(FakeFailure(Some(1205), "deadlock victim"))
                    } else {
                        Ok::<_, FakeFailure>(n)
                    }
                }
            })
            .await;

        assert_eq!(outcome, RetryOutcome::Success(3));
        assert_eq!(*calls.lock(), 3);
        // Delay before attempt k is base * (k - 1): 0, 800ms, 800+1600ms.
        assert_eq!(attempt_offsets[0], Duration::from_millis(0));
        assert_eq!(attempt_offsets[1], Duration::from_millis(800));
        assert_eq!(attempt_offsets[2], Duration::from_millis(2400));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_exhaust_into_fatal() {
        let policy = policy(3, 800);
        let calls = Mutex::new(0u32);

        let outcome: RetryOutcome<()> = policy
            .execute("withdraw", || {
                *calls.lock() += 1;
                async { Err(FakeFailure(Some(1222), "lock request timeout 1222")) }
            })
            .await;

        assert_eq!(*calls.lock(), 3);
        match outcome {
            RetryOutcome::FatalError { code, attempts, .. } => {
                assert_eq!(code, Some(1222));
                assert_eq!(attempts, 3);
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn business_code_rejects_immediately_with_zero_delay() {
        let policy = policy(3, 800);
        let calls = Mutex::new(0u32);
        let started = Instant::now();

        let outcome: RetryOutcome<()> = policy
            .execute("withdraw", || {
                *calls.lock() += 1;
                async { Err(FakeFailure(Some(50003), "insufficient funds")) }
            })
            .await;

        assert_eq!(*calls.lock(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        match outcome {
            RetryOutcome::BusinessRejection { code, message } => {
                assert_eq!(code, 50003);
                assert_eq!(message, "insufficient funds");
            }
            other => panic!("expected business rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn codeless_failure_is_fatal_on_first_attempt() {
        let policy = policy(3, 1);
        let outcome: RetryOutcome<()> = policy
            .execute("deposit", || async {
                Err(FakeFailure(None, "connection reset"))
            })
            .await;

        match outcome {
            RetryOutcome::FatalError { code, attempts, .. } => {
                assert_eq!(code, None);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn max_attempts_is_clamped_to_at_least_one() {
        let policy = policy(0, 1);
        assert_eq!(policy.max_attempts(), 1);
        let outcome = policy
            .execute("deposit", || async { Ok::<_, FakeFailure>(7) })
            .await;
        assert_eq!(outcome, RetryOutcome::Success(7));
    }
}
