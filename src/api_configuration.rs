//! Adapter API configuration
//!
//! Serializable retry and throttle settings. Adapters hold an
//! [`ApiConfiguration`] and run each provider request through
//! [`ApiConfiguration::execute`].

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;
use crate::retry::{ExponentialBackoff, RetryPolicy, RetryThrottleExecutor};
use crate::throttle::{MaxConcurrency, RateLimit, ThrottleOff, ThrottlePolicy};
use crate::utils::cancel::AbortSignal;

/// Serializable form of a [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RetryConfig {
    Never,
    #[serde(rename_all = "camelCase")]
    ExponentialBackoff {
        #[serde(default = "default_max_tries")]
        max_tries: u32,
        #[serde(default = "default_initial_delay_in_ms")]
        initial_delay_in_ms: u64,
        #[serde(default = "default_backoff_factor")]
        backoff_factor: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_delay_in_ms: Option<u64>,
    },
}

const fn default_max_tries() -> u32 {
    3
}

const fn default_initial_delay_in_ms() -> u64 {
    2000
}

const fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::ExponentialBackoff {
            max_tries: default_max_tries(),
            initial_delay_in_ms: default_initial_delay_in_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_in_ms: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        match *config {
            RetryConfig::Never => Self::Never,
            RetryConfig::ExponentialBackoff {
                max_tries,
                initial_delay_in_ms,
                backoff_factor,
                max_delay_in_ms,
            } => Self::ExponentialBackoff(ExponentialBackoff {
                max_tries,
                initial_delay: Duration::from_millis(initial_delay_in_ms),
                backoff_factor,
                max_delay: max_delay_in_ms.map(Duration::from_millis),
                jitter: 0.0,
            }),
        }
    }
}

/// Serializable form of a throttle policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ThrottleConfig {
    #[default]
    Off,
    MaxConcurrency { max: usize },
    #[serde(rename_all = "camelCase")]
    RateLimit { requests_per_second: u32 },
}

impl ThrottleConfig {
    /// Instantiate the policy. Each call creates fresh shared state.
    pub fn build(&self) -> Arc<dyn ThrottlePolicy> {
        match *self {
            Self::Off => Arc::new(ThrottleOff),
            Self::MaxConcurrency { max } => Arc::new(MaxConcurrency::new(max)),
            Self::RateLimit {
                requests_per_second,
            } => Arc::new(RateLimit::per_second(requests_per_second)),
        }
    }
}

/// Serializable bundle of retry + throttle settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigurationConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

/// Retry and throttle behavior used by an adapter for its provider requests.
#[derive(Debug, Clone, Default)]
pub struct ApiConfiguration {
    executor: RetryThrottleExecutor,
}

impl ApiConfiguration {
    pub fn new(retry: RetryPolicy, throttle: Arc<dyn ThrottlePolicy>) -> Self {
        Self {
            executor: RetryThrottleExecutor::new(retry, throttle),
        }
    }

    pub fn from_config(config: &ApiConfigurationConfig) -> Self {
        Self::new(RetryPolicy::from(&config.retry), config.throttle.build())
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let config: ApiConfigurationConfig = serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidConfiguration(format!("invalid api configuration: {e}")))?;
        Ok(Self::from_config(&config))
    }

    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self::new(retry, self.executor.throttle().clone())
    }

    pub fn with_throttle(self, throttle: Arc<dyn ThrottlePolicy>) -> Self {
        Self::new(self.executor.retry_policy().clone(), throttle)
    }

    pub const fn executor(&self) -> &RetryThrottleExecutor {
        &self.executor
    }

    /// Run one provider request with retries and throttling.
    pub async fn execute<F, Fut, T>(&self, abort: Option<&AbortSignal>, attempt: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        self.executor.execute(abort, attempt).await
    }
}
