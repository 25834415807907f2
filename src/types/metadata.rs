//! Call metadata and the values it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of model operation being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionType {
    GenerateText,
    StreamText,
    GenerateStructure,
    StreamStructure,
    GenerateToolCall,
    Embed,
    GenerateImage,
    GenerateSpeech,
    GenerateTranscription,
}

impl FunctionType {
    /// The wire name used in event payloads (`generate-text`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateText => "generate-text",
            Self::StreamText => "stream-text",
            Self::GenerateStructure => "generate-structure",
            Self::StreamStructure => "stream-structure",
            Self::GenerateToolCall => "generate-tool-call",
            Self::Embed => "embed",
            Self::GenerateImage => "generate-image",
            Self::GenerateSpeech => "generate-speech",
            Self::GenerateTranscription => "generate-transcription",
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the model that served a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInformation {
    pub provider: String,
    pub model_name: String,
}

impl ModelInformation {
    pub fn new(provider: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
        }
    }
}

/// Token usage counters reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Usage with prompt/completion counts; the total is derived.
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(prompt_tokens + completion_tokens),
        }
    }

    /// Sum two usage records field by field. Missing counters stay missing
    /// unless the other side has them.
    pub fn merge(self, other: Self) -> Self {
        fn add(a: Option<u32>, b: Option<u32>) -> Option<u32> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            }
        }
        Self {
            prompt_tokens: add(self.prompt_tokens, other.prompt_tokens),
            completion_tokens: add(self.completion_tokens, other.completion_tokens),
            total_tokens: add(self.total_tokens, other.total_tokens),
        }
    }
}

/// Generate a collision-resistant call id.
pub fn new_call_id() -> String {
    format!("call-{}", uuid::Uuid::new_v4())
}

/// Metadata of one model call.
///
/// Built when the call starts; `finish_timestamp`, `duration_in_ms` and
/// `usage` are filled by the owning executor when it finishes. Callers only
/// ever receive finished copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetadata {
    pub call_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    pub function_type: FunctionType,
    pub model: ModelInformation,
    pub settings: serde_json::Value,
    pub input: serde_json::Value,
    pub start_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CallMetadata {
    /// Whether the call has been finalized.
    pub const fn is_finished(&self) -> bool {
        self.finish_timestamp.is_some()
    }
}
