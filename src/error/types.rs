//! Core error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = ModelError> = std::result::Result<T, E>;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Structured output failed schema validation.
    Validation,
    /// Malformed JSON or tool-call arguments.
    Parse,
    /// The call was cancelled through its abort signal.
    Abort,
    /// Network failure or non-success provider response.
    ProviderCall,
    /// An observer failed while handling an event.
    Observer,
    /// Invalid policy or environment configuration.
    Configuration,
    /// Anything else.
    Internal,
}

/// Errors produced by the call pipeline and by model adapters.
///
/// Errors are `Clone` so that the same failure can be carried inside a
/// `finished` event and re-raised to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Structured output did not satisfy its schema.
    #[error("Structure validation failed: {message}")]
    Validation {
        message: String,
        /// The raw text the value was parsed from, when known.
        value_text: Option<String>,
        value: Option<serde_json::Value>,
    },

    /// The model output was not valid JSON.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        value_text: Option<String>,
    },

    /// Tool call arguments could not be parsed or validated.
    #[error("Tool call arguments for '{tool_name}' are invalid: {message}")]
    ToolCallParse {
        tool_name: String,
        message: String,
        value_text: Option<String>,
    },

    /// The model did not produce a tool call at all.
    #[error("Model did not generate a call to tool '{tool_name}'")]
    ToolCallGeneration { tool_name: String },

    /// The call was aborted. Takes precedence over any concurrently
    /// resolving success or error.
    #[error("Call aborted")]
    Aborted,

    /// The provider call failed (transport error or non-success response).
    #[error("API call failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    ApiCall {
        message: String,
        status: Option<u16>,
        retryable: bool,
        details: Option<serde_json::Value>,
    },

    /// An observer failed. Only ever delivered to error handlers.
    #[error("Observer failed: {0}")]
    Observer(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModelError {
    /// Create a provider call error.
    pub fn api_call(message: impl Into<String>, status: Option<u16>, retryable: bool) -> Self {
        Self::ApiCall {
            message: message.into(),
            status,
            retryable,
            details: None,
        }
    }

    /// Create a provider call error whose retryability is derived from the
    /// HTTP status (429, 408 and 5xx are retryable).
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let retryable = status == 429 || status == 408 || (500..600).contains(&status);
        Self::api_call(message, Some(status), retryable)
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>, value_text: Option<String>) -> Self {
        Self::Parse {
            message: message.into(),
            value_text,
        }
    }

    /// Create a validation error.
    pub fn validation(
        message: impl Into<String>,
        value_text: Option<String>,
        value: Option<serde_json::Value>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            value_text,
            value,
        }
    }

    /// Coarse category of this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Parse { .. } | Self::ToolCallParse { .. } | Self::ToolCallGeneration { .. } => {
                ErrorCategory::Parse
            }
            Self::Aborted => ErrorCategory::Abort,
            Self::ApiCall { .. } => ErrorCategory::ProviderCall,
            Self::Observer(_) => ErrorCategory::Observer,
            Self::InvalidConfiguration(_) => ErrorCategory::Configuration,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the default retry classification considers this error transient.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiCall {
                retryable: true,
                ..
            }
        )
    }

    /// Whether this error represents a cancellation.
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// HTTP status code, if the error carries one.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiCall { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ModelError::from_status(429, "slow down").is_retryable());
        assert!(ModelError::from_status(503, "unavailable").is_retryable());
        assert!(!ModelError::from_status(400, "bad request").is_retryable());
        assert_eq!(
            ModelError::from_status(401, "no key").status_code(),
            Some(401)
        );
    }

    #[test]
    fn abort_is_distinguishable() {
        let abort = ModelError::Aborted;
        assert!(abort.is_abort());
        assert!(!abort.is_retryable());
        assert_eq!(abort.category(), ErrorCategory::Abort);

        let api = ModelError::api_call("boom", None, true);
        assert!(!api.is_abort());
        assert_eq!(api.to_string(), "API call failed: boom");
        assert_eq!(
            ModelError::api_call("boom", Some(500), true).to_string(),
            "API call failed with status 500: boom"
        );
    }

    #[test]
    fn validation_and_parse_are_fatal() {
        assert!(!ModelError::validation("missing field", None, None).is_retryable());
        assert!(!ModelError::parse("eof", Some("{".into())).is_retryable());
    }
}
