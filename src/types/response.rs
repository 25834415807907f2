//! Call results.

use super::metadata::{CallMetadata, Usage};

/// What an adapter returns from a single (non-streaming) call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse<T> {
    /// Raw provider response.
    pub response: serde_json::Value,
    /// Value extracted from the response.
    pub extracted_value: T,
    pub usage: Option<Usage>,
}

impl<T> GenerateResponse<T> {
    pub const fn new(response: serde_json::Value, extracted_value: T) -> Self {
        Self {
            response,
            extracted_value,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Transform the extracted value, keeping response and usage.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerateResponse<U> {
        GenerateResponse {
            response: self.response,
            extracted_value: f(self.extracted_value),
            usage: self.usage,
        }
    }
}

/// Settled result of a finished call, handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse<T> {
    pub value: T,
    pub response: serde_json::Value,
    pub metadata: CallMetadata,
}
