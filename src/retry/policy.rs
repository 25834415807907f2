//! Retry policies
//!
//! A [`RetryPolicy`] decides, after each failed attempt, whether the call is
//! tried again and how long to wait first.

use backoff::backoff::Backoff;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;

/// Outcome of classifying one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given delay, then try again.
    Retry(Duration),
    /// Give up and surface the error.
    Stop,
}

/// Custom retry rule: receives the failure and the 1-based number of the
/// attempt that produced it.
pub type RetryFunction = Arc<dyn Fn(&ModelError, u32) -> RetryDecision + Send + Sync>;

/// Exponential backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    /// Total number of attempts, including the first one.
    pub max_tries: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every retry.
    pub backoff_factor: f64,
    /// Upper bound for a single delay, unbounded when `None`.
    pub max_delay: Option<Duration>,
    /// Randomization factor in `0.0..=1.0`; `0.0` gives exact delays.
    pub jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_tries: 3,
            initial_delay: Duration::from_millis(2000),
            backoff_factor: 2.0,
            max_delay: None,
            jitter: 0.0,
        }
    }
}

impl ExponentialBackoff {
    /// Delay schedule backed by the `backoff` crate.
    fn delays(&self) -> backoff::ExponentialBackoff {
        // a year is effectively unbounded for request retries
        let unbounded = Duration::from_secs(365 * 24 * 60 * 60);
        backoff::ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: self.jitter.clamp(0.0, 1.0),
            multiplier: self.backoff_factor.max(1.0),
            max_interval: self.max_delay.unwrap_or(unbounded),
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// How failed attempts are retried.
#[derive(Clone)]
pub enum RetryPolicy {
    /// Exactly one attempt.
    Never,
    /// Retry retryable errors with exponentially growing delays.
    ExponentialBackoff(ExponentialBackoff),
    /// Caller-defined rule.
    Custom(RetryFunction),
}

/// Exponential backoff with 3 tries, 2s initial delay and factor 2.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self::ExponentialBackoff(ExponentialBackoff::default())
    }
}

impl RetryPolicy {
    /// Retry with exponential backoff.
    pub fn exponential_backoff(max_tries: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self::ExponentialBackoff(ExponentialBackoff {
            max_tries,
            initial_delay,
            backoff_factor,
            ..Default::default()
        })
    }

    /// Retry with a custom rule.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ModelError, u32) -> RetryDecision + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Fresh per-call state for this policy.
    pub fn schedule(&self) -> RetrySchedule {
        let state = match self {
            Self::Never => ScheduleState::Never,
            Self::ExponentialBackoff(config) => ScheduleState::Exponential {
                max_tries: config.max_tries,
                delays: Box::new(config.delays()),
            },
            Self::Custom(f) => ScheduleState::Custom(f.clone()),
        };
        RetrySchedule { state }
    }

    /// Maximum number of attempts, `None` when the policy decides at runtime.
    pub fn max_tries(&self) -> Option<u32> {
        match self {
            Self::Never => Some(1),
            Self::ExponentialBackoff(config) => Some(config.max_tries.max(1)),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::ExponentialBackoff(config) => f.debug_tuple("ExponentialBackoff").field(config).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

enum ScheduleState {
    Never,
    Exponential {
        max_tries: u32,
        delays: Box<backoff::ExponentialBackoff>,
    },
    Custom(RetryFunction),
}

/// Retry state of one call: tracks how far the backoff has progressed.
pub struct RetrySchedule {
    state: ScheduleState,
}

impl RetrySchedule {
    /// Classify the failure of attempt `try_number` (1-based).
    pub fn next(&mut self, error: &ModelError, try_number: u32) -> RetryDecision {
        if error.is_abort() {
            return RetryDecision::Stop;
        }
        match &mut self.state {
            ScheduleState::Never => RetryDecision::Stop,
            ScheduleState::Exponential { max_tries, delays } => {
                if try_number >= *max_tries || !error.is_retryable() {
                    return RetryDecision::Stop;
                }
                delays
                    .next_backoff()
                    .map_or(RetryDecision::Stop, RetryDecision::Retry)
            }
            ScheduleState::Custom(f) => f(error, try_number),
        }
    }
}

impl fmt::Debug for RetrySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.state {
            ScheduleState::Never => "Never",
            ScheduleState::Exponential { .. } => "Exponential",
            ScheduleState::Custom(_) => "Custom",
        };
        f.debug_struct("RetrySchedule").field("state", &kind).finish()
    }
}
