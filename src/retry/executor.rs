//! Retry + throttle executor
//!
//! Wraps one logical adapter call: every attempt waits for throttle
//! admission, failures are classified by the retry policy, and the run's
//! abort signal is observed while waiting for admission, while an attempt is
//! running and while sleeping between attempts.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::policy::{RetryDecision, RetryPolicy};
use crate::error::ModelError;
use crate::throttle::{ThrottleOff, ThrottlePolicy};
use crate::utils::cancel::{AbortSignal, abortable};

/// Retry and throttle configuration for one adapter.
#[derive(Debug, Clone)]
pub struct RetryThrottleExecutor {
    retry: RetryPolicy,
    throttle: Arc<dyn ThrottlePolicy>,
}

impl Default for RetryThrottleExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), Arc::new(ThrottleOff))
    }
}

impl RetryThrottleExecutor {
    pub fn new(retry: RetryPolicy, throttle: Arc<dyn ThrottlePolicy>) -> Self {
        Self { retry, throttle }
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn throttle(&self) -> &Arc<dyn ThrottlePolicy> {
        &self.throttle
    }

    /// Run `attempt` until it succeeds, the policy gives up, or `abort` fires.
    ///
    /// Returns the first success, the last error once retries are exhausted
    /// (or the first fatal error), or `ModelError::Aborted`. The throttle
    /// permit is held only while an attempt runs, never during backoff.
    pub async fn execute<F, Fut, T>(&self, abort: Option<&AbortSignal>, mut attempt: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let mut schedule = self.retry.schedule();
        let mut try_number: u32 = 1;

        loop {
            let outcome = abortable(abort, async {
                let _permit = self.throttle.acquire().await?;
                attempt().await
            })
            .await;

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if error.is_abort() || abort.is_some_and(AbortSignal::is_aborted) {
                return Err(ModelError::Aborted);
            }

            match schedule.next(&error, try_number) {
                RetryDecision::Stop => {
                    debug!(try_number, error = %error, "giving up on model call");
                    return Err(error);
                }
                RetryDecision::Retry(delay) => {
                    warn!(
                        try_number,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "model call failed, retrying"
                    );
                    abortable(abort, async {
                        tokio::time::sleep(delay).await;
                        Ok(())
                    })
                    .await?;
                    try_number += 1;
                }
            }
        }
    }
}
