//! Bounded retry with a constant delay and a per-attempt time budget.

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, ConstantBuilder};

use storesync_core::cancel::CancelToken;
use storesync_core::config::SchedulerConfig;
use storesync_core::errors::{StoreSyncError, StoreSyncResult, TaskError};
use storesync_observability::tracing_setup::events;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first.
    pub max_retries: u32,
    pub delay: Duration,
    /// Budget for a single attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_secs(config.retry_delay_secs),
            timeout: Duration::from_secs(config.task_timeout_secs),
        }
    }

    /// Same budget, single attempt.
    pub fn without_retries(self) -> Self {
        Self {
            max_retries: 0,
            ..self
        }
    }

    fn delays(&self) -> impl Iterator<Item = Duration> {
        let backoff = ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries as usize)
            .build();
        std::iter::once(Duration::ZERO).chain(backoff)
    }
}

/// Errors that retrying cannot fix.
pub fn is_retryable(err: &StoreSyncError) -> bool {
    !matches!(
        err,
        StoreSyncError::NotFound { .. }
            | StoreSyncError::PermissionDenied { .. }
            | StoreSyncError::ValidationFailed { .. }
            | StoreSyncError::NotConfigured { .. }
            | StoreSyncError::PreconditionFailed { .. }
            | StoreSyncError::TransitionError(_)
            | StoreSyncError::TemplateError(_)
    )
}

/// Result of a retried operation and how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: StoreSyncResult<T>,
    pub attempts: u32,
    pub timeouts: u32,
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy is exhausted. `on_attempt` sees each 1-based attempt number before
/// it starts.
///
/// Each attempt gets a fresh [`CancelToken`]. When an attempt overruns its
/// budget the token is cancelled, and if a retry follows, the overrunning
/// attempt is awaited first so two attempts never run side by side.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    task_id: &str,
    kind: &str,
    mut attempt: F,
    on_attempt: impl Fn(u32),
) -> RetryOutcome<T>
where
    F: FnMut(CancelToken) -> Fut,
    Fut: Future<Output = StoreSyncResult<T>>,
{
    let mut attempts = 0;
    let mut timeouts = 0;
    let mut last_error = None;

    for (i, delay) in policy.delays().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        attempts += 1;
        on_attempt(attempts);

        let cancel = CancelToken::new();
        let mut running = std::pin::pin!(attempt(cancel.clone()));
        let err = match tokio::time::timeout(policy.timeout, running.as_mut()).await {
            Ok(Ok(value)) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts,
                    timeouts,
                }
            }
            Ok(Err(e)) => e,
            Err(_) => {
                timeouts += 1;
                cancel.cancel();
                if attempts <= policy.max_retries {
                    let _ = running.await;
                }
                TaskError::TimedOut {
                    task_id: task_id.to_string(),
                    budget_secs: policy.timeout.as_secs(),
                }
                .into()
            }
        };

        if !is_retryable(&err) {
            return RetryOutcome {
                result: Err(err),
                attempts,
                timeouts,
            };
        }
        if attempts <= policy.max_retries {
            events::task_retry(task_id, kind, attempts, &err.to_string());
        }
        last_error = Some(err);
    }

    let result = match last_error {
        Some(err) if attempts > 1 => Err(TaskError::RetriesExhausted {
            task_id: task_id.to_string(),
            attempts,
            last_error: err.to_string(),
        }
        .into()),
        Some(err) => Err(err),
        None => Err(TaskError::QueueClosed.into()),
    };
    RetryOutcome {
        result,
        attempts,
        timeouts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let outcome = run_with_retry(
            &fast(3),
            "t1",
            "generate_content",
            |_| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(storesync_core::errors::GenerationError::CompletionFailed {
                        provider: "test".into(),
                        reason: "flaky".into(),
                    }
                    .into())
                } else {
                    Ok(7)
                }
            },
            |_| {},
        )
        .await;
        assert_eq!(outcome.result.unwrap(), 7);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_attempt() {
        let outcome: RetryOutcome<()> = run_with_retry(
            &fast(3),
            "t1",
            "generate_content",
            |_| async { Err(TaskError::QueueClosed.into()) },
            |_| {},
        )
        .await;
        assert_eq!(outcome.attempts, 4);
        assert!(matches!(
            outcome.result,
            Err(StoreSyncError::TaskError(TaskError::RetriesExhausted { attempts: 4, .. }))
        ));
    }

    #[tokio::test]
    async fn non_retryable_errors_stop_immediately() {
        let seen = AtomicU32::new(0);
        let outcome: RetryOutcome<()> = run_with_retry(
            &fast(3),
            "t1",
            "generate_content",
            |_| async { Err(StoreSyncError::not_found("campaign", "c1")) },
            |attempt| seen.store(attempt, Ordering::SeqCst),
        )
        .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome.result, Err(StoreSyncError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempts_time_out() {
        let policy = RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(1),
            timeout: Duration::from_millis(50),
        };
        let outcome: RetryOutcome<()> = run_with_retry(
            &policy,
            "t1",
            "generate_email",
            |_| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            },
            |_| {},
        )
        .await;
        assert_eq!(outcome.timeouts, 2);
        assert!(outcome.result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_attempt_is_cancelled_and_drained_before_retry() {
        let policy = RetryPolicy {
            max_retries: 2,
            delay: Duration::from_millis(1),
            timeout: Duration::from_millis(100),
        };
        let log = std::sync::Mutex::new(Vec::new());
        let calls = AtomicU32::new(0);
        let outcome = run_with_retry(
            &policy,
            "t1",
            "generate_content",
            |cancel| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let log = &log;
                async move {
                    log.lock().unwrap().push(format!("start {n}"));
                    if n == 1 {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                    let saved = cancel.check("content").is_ok();
                    log.lock().unwrap().push(format!("end {n} saved={saved}"));
                    Ok(n)
                }
            },
            |_| {},
        )
        .await;

        assert_eq!(outcome.result.unwrap(), 2);
        assert_eq!(outcome.timeouts, 1);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start 1", "end 1 saved=false", "start 2", "end 2 saved=true"]
        );
    }
}
