//! Call lifecycle shared by the standard and streaming executors
//!
//! Owns the metadata of one call, emits its `started` event on creation and
//! guarantees that exactly one `finished` event follows. A lifecycle dropped
//! before it finished reports an abort, which covers futures cancelled by
//! `tokio::time::timeout`, `select!` or task abort.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Instant;

use crate::observability::{EventBus, FunctionEvent, ModelCallResult};
use crate::run::FunctionOptions;
use crate::traits::Model;
use crate::types::{CallMetadata, FunctionType, Usage, new_call_id};

#[derive(Debug)]
pub struct CallLifecycle {
    metadata: CallMetadata,
    bus: EventBus,
    started_at: Instant,
    finished: AtomicBool,
}

impl CallLifecycle {
    /// Build the start metadata, assemble the event bus and emit `started`.
    pub fn start<M>(model: &M, options: &FunctionOptions, input: serde_json::Value, function_type: FunctionType) -> Self
    where
        M: Model + ?Sized,
    {
        let run = options.run.as_deref();
        let started_at = Instant::now();
        let metadata = CallMetadata {
            call_id: new_call_id(),
            parent_call_id: options.parent_call_id.clone(),
            run_id: run.and_then(|run| run.run_id.clone()),
            session_id: run.and_then(|run| run.session_id.clone()),
            user_id: run.and_then(|run| run.user_id.clone()),
            function_id: options.function_id.clone(),
            function_type,
            model: model.model_information(),
            settings: model.settings_for_event(),
            input,
            start_timestamp: Utc::now(),
            finish_timestamp: None,
            duration_in_ms: None,
            usage: None,
        };
        let bus = EventBus::for_call(options, model.observers());

        tracing::debug!(
            call_id = %metadata.call_id,
            function_type = %function_type,
            provider = %metadata.model.provider,
            model = %metadata.model.model_name,
            "model call started"
        );
        bus.notify(&FunctionEvent::Started {
            timestamp: metadata.start_timestamp,
            metadata: metadata.clone(),
        });

        Self {
            metadata,
            bus,
            started_at,
            finished: AtomicBool::new(false),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.metadata.call_id
    }

    /// Options for the adapter: this call becomes the parent of nested calls.
    pub fn child_options(&self, options: &FunctionOptions) -> FunctionOptions {
        options.for_child_call(&self.metadata.call_id)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Finalize the metadata and emit `finished`.
    ///
    /// Only the first call has an effect; later calls return `None`.
    pub fn finish(&self, result: ModelCallResult, usage: Option<Usage>) -> Option<CallMetadata> {
        if self.finished.swap(true, Ordering::AcqRel) {
            return None;
        }

        let finish_timestamp = Utc::now();
        let mut metadata = self.metadata.clone();
        metadata.finish_timestamp = Some(finish_timestamp);
        metadata.duration_in_ms = Some(self.started_at.elapsed().as_millis() as u64);
        metadata.usage = usage;

        tracing::debug!(
            call_id = %metadata.call_id,
            status = result.status(),
            duration_ms = metadata.duration_in_ms,
            "model call finished"
        );
        self.bus.notify(&FunctionEvent::Finished {
            metadata: metadata.clone(),
            timestamp: finish_timestamp,
            result,
        });
        Some(metadata)
    }
}

impl Drop for CallLifecycle {
    fn drop(&mut self) {
        if !self.is_finished() {
            tracing::debug!(call_id = %self.metadata.call_id, "model call dropped before completion");
            self.finish(ModelCallResult::Abort, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{Environment, EventRecorder};
    use crate::types::ModelInformation;
    use std::sync::Arc;

    struct Probe;

    impl Model for Probe {
        fn model_information(&self) -> ModelInformation {
            ModelInformation::new("probe", "probe-1")
        }
    }

    #[tokio::test]
    async fn finishes_exactly_once() {
        let recorder = EventRecorder::new();
        let options = FunctionOptions::new()
            .with_observer(recorder.clone())
            .with_environment(Arc::new(Environment::default()));
        let lifecycle = CallLifecycle::start(&Probe, &options, serde_json::json!("in"), FunctionType::GenerateText);

        assert!(!lifecycle.is_finished());
        let metadata = lifecycle.finish(ModelCallResult::Abort, None).unwrap();
        assert!(metadata.is_finished());
        assert!(lifecycle.finish(ModelCallResult::Abort, None).is_none());

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "started");
        assert_eq!(events[1].call_id(), lifecycle.call_id());
    }

    #[tokio::test]
    async fn dropping_unfinished_lifecycle_reports_abort() {
        let recorder = EventRecorder::new();
        let options = FunctionOptions::new()
            .with_observer(recorder.clone())
            .with_environment(Arc::new(Environment::default()));
        let lifecycle = CallLifecycle::start(&Probe, &options, serde_json::json!("in"), FunctionType::GenerateText);
        drop(lifecycle);

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].result(), Some(&ModelCallResult::Abort));
    }

    #[tokio::test]
    async fn duration_includes_started_observers() {
        let recorder = EventRecorder::new();
        let options = FunctionOptions::new()
            .with_observer(crate::observability::observer_fn(|event| {
                if event.result().is_none() {
                    std::thread::sleep(std::time::Duration::from_millis(30));
                }
                Ok(())
            }))
            .with_observer(recorder.clone())
            .with_environment(Arc::new(Environment::default()));
        let lifecycle = CallLifecycle::start(&Probe, &options, serde_json::json!("in"), FunctionType::GenerateText);
        let metadata = lifecycle.finish(ModelCallResult::Abort, None).unwrap();

        assert!(metadata.duration_in_ms.unwrap() >= 30);
    }
}
