//! Lifecycle Events
//!
//! Structured `started` / `finished` events emitted once per model call.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::ModelError;
use crate::types::{CallMetadata, Usage};

/// Outcome carried by a `finished` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ModelCallResult {
    Success {
        value: serde_json::Value,
        response: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    Error {
        #[serde(serialize_with = "serialize_error")]
        error: ModelError,
    },
    Abort,
}

impl ModelCallResult {
    /// Status discriminant as it appears on the wire.
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
            Self::Abort => "abort",
        }
    }
}

fn serialize_error<S: Serializer>(error: &ModelError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Event emitted by the call executors.
///
/// Serializes to the flat payload consumed by loggers and external sinks:
/// `{"eventType": "started" | "finished", "callId": ..., "result": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub enum FunctionEvent {
    Started {
        #[serde(flatten)]
        metadata: CallMetadata,
        timestamp: DateTime<Utc>,
    },
    Finished {
        #[serde(flatten)]
        metadata: CallMetadata,
        timestamp: DateTime<Utc>,
        result: ModelCallResult,
    },
}

impl FunctionEvent {
    pub const fn metadata(&self) -> &CallMetadata {
        match self {
            Self::Started { metadata, .. } | Self::Finished { metadata, .. } => metadata,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.metadata().call_id
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Started { timestamp, .. } | Self::Finished { timestamp, .. } => *timestamp,
        }
    }

    /// `"started"` or `"finished"`.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Finished { .. } => "finished",
        }
    }

    /// The result of a finished event.
    pub const fn result(&self) -> Option<&ModelCallResult> {
        match self {
            Self::Started { .. } => None,
            Self::Finished { result, .. } => Some(result),
        }
    }
}
