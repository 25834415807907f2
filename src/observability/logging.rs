//! Function call logging
//!
//! Logging is just another observer, derived from a [`FunctionLogging`]
//! level and always notified last. Output goes through `tracing`, so the
//! subscriber installed by the application decides where it ends up.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::events::{FunctionEvent, ModelCallResult};
use super::observer::FunctionObserver;
use crate::error::ModelError;

/// How much of each lifecycle event gets logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionLogging {
    /// No logging.
    #[default]
    Off,
    /// One human-readable line per event.
    BasicText,
    /// Structured `tracing` fields per event.
    DetailedObject,
    /// The full serialized event payload.
    DetailedJson,
}

impl FunctionLogging {
    /// The observer implementing this level, `None` for `Off`.
    pub fn observer(self) -> Option<Arc<dyn FunctionObserver>> {
        match self {
            Self::Off => None,
            level => Some(Arc::new(LoggingObserver { level })),
        }
    }
}

/// Observer that renders events through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct LoggingObserver {
    level: FunctionLogging,
}

impl LoggingObserver {
    pub const fn new(level: FunctionLogging) -> Self {
        Self { level }
    }
}

fn describe(event: &FunctionEvent) -> String {
    match event {
        FunctionEvent::Started { .. } => "started".to_string(),
        FunctionEvent::Finished { metadata, result, .. } => {
            let duration = metadata.duration_in_ms.unwrap_or_default();
            match result {
                ModelCallResult::Success { .. } => format!("finished in {duration}ms"),
                ModelCallResult::Error { error } => {
                    format!("finished with error after {duration}ms: {error}")
                }
                ModelCallResult::Abort => format!("aborted after {duration}ms"),
            }
        }
    }
}

impl FunctionObserver for LoggingObserver {
    fn on_function_event(&self, event: &FunctionEvent) -> Result<(), ModelError> {
        let metadata = event.metadata();
        match self.level {
            FunctionLogging::Off => {}
            FunctionLogging::BasicText => {
                info!(
                    "{} - {} {} {}",
                    event.timestamp().to_rfc3339(),
                    metadata.function_type,
                    metadata.call_id,
                    describe(event)
                );
            }
            FunctionLogging::DetailedObject => {
                info!(
                    event_type = event.event_type(),
                    call_id = %metadata.call_id,
                    parent_call_id = ?metadata.parent_call_id,
                    run_id = ?metadata.run_id,
                    function_id = ?metadata.function_id,
                    function_type = %metadata.function_type,
                    provider = %metadata.model.provider,
                    model = %metadata.model.model_name,
                    status = event.result().map(ModelCallResult::status),
                    duration_ms = metadata.duration_in_ms,
                    "model call {}",
                    event.event_type()
                );
            }
            FunctionLogging::DetailedJson => {
                let payload = serde_json::to_string(event)
                    .map_err(|e| ModelError::Observer(format!("event serialization failed: {e}")))?;
                info!("{payload}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallMetadata, FunctionType, ModelInformation};
    use chrono::Utc;
    use tracing_test::traced_test;

    fn started() -> FunctionEvent {
        FunctionEvent::Started {
            timestamp: Utc::now(),
            metadata: CallMetadata {
                call_id: "call-log".into(),
                parent_call_id: None,
                run_id: None,
                session_id: None,
                user_id: None,
                function_id: Some("summarize".into()),
                function_type: FunctionType::StreamText,
                model: ModelInformation::new("mock", "mock-1"),
                settings: serde_json::Value::Null,
                input: serde_json::json!("hi"),
                start_timestamp: Utc::now(),
                finish_timestamp: None,
                duration_in_ms: None,
                usage: None,
            },
        }
    }

    #[test]
    fn off_has_no_observer() {
        assert!(FunctionLogging::Off.observer().is_none());
        assert!(FunctionLogging::BasicText.observer().is_some());
    }

    #[test]
    fn level_names() {
        let level: FunctionLogging = serde_json::from_str("\"detailed-json\"").unwrap();
        assert_eq!(level, FunctionLogging::DetailedJson);
    }

    #[traced_test]
    #[test]
    fn basic_text_logs_one_line() {
        LoggingObserver::new(FunctionLogging::BasicText)
            .on_function_event(&started())
            .unwrap();
        assert!(logs_contain("stream-text call-log started"));
    }

    #[traced_test]
    #[test]
    fn detailed_json_logs_payload() {
        LoggingObserver::new(FunctionLogging::DetailedJson)
            .on_function_event(&started())
            .unwrap();
        assert!(logs_contain("\"eventType\":\"started\""));
        assert!(logs_contain("\"functionId\":\"summarize\""));
    }
}
