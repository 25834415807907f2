//! Event bus
//!
//! Fans lifecycle events out to the observers registered for one call.
//! Observer failures, including panics, are isolated from the call.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::environment::Environment;
use super::events::FunctionEvent;
use super::observer::FunctionObserver;
use crate::error::ModelError;
use crate::run::{ErrorHandler, FunctionOptions};

/// Ordered observer list for the lifetime of one call.
#[derive(Clone, Default)]
pub struct EventBus {
    observers: Vec<Arc<dyn FunctionObserver>>,
    error_handler: Option<ErrorHandler>,
}

impl EventBus {
    pub fn new(observers: Vec<Arc<dyn FunctionObserver>>, error_handler: Option<ErrorHandler>) -> Self {
        Self {
            observers,
            error_handler,
        }
    }

    /// Assemble the bus for a call, in notification order: per-call
    /// observers, per-model observers, process-wide observers, the run
    /// observer, then the logging observer.
    pub fn for_call(options: &FunctionOptions, model_observers: Vec<Arc<dyn FunctionObserver>>) -> Self {
        let environment = options
            .environment
            .clone()
            .unwrap_or_else(Environment::current);
        let run = options.run.as_deref();

        let mut observers = options.observers.clone();
        observers.extend(model_observers);
        observers.extend(environment.observers().iter().cloned());
        observers.extend(run.and_then(|run| run.function_observer.clone()));
        observers.extend(options.logging.unwrap_or(environment.logging()).observer());

        Self::new(observers, run.and_then(|run| run.error_handler.clone()))
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer, synchronously and in order.
    pub fn notify(&self, event: &FunctionEvent) {
        for observer in &self.observers {
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_function_event(event)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => match error {
                    ModelError::Observer(_) => error,
                    other => ModelError::Observer(other.to_string()),
                },
                Err(panic) => ModelError::Observer(panic_message(&*panic)),
            };
            self.handle_error(&error);
        }
    }

    fn handle_error(&self, error: &ModelError) {
        match &self.error_handler {
            Some(handler) => handler(error),
            None => tracing::warn!(error = %error, "function observer failed"),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("observer panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("observer panicked: {message}")
    } else {
        "observer panicked".to_string()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("has_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{ChannelObserver, EventRecorder, FunctionLogging, observer_fn};
    use crate::run::Run;
    use crate::types::{CallMetadata, FunctionType, ModelInformation};
    use chrono::Utc;
    use std::sync::Mutex;

    fn event(call_id: &str) -> FunctionEvent {
        FunctionEvent::Started {
            timestamp: Utc::now(),
            metadata: CallMetadata {
                call_id: call_id.into(),
                parent_call_id: None,
                run_id: None,
                session_id: None,
                user_id: None,
                function_id: None,
                function_type: FunctionType::Embed,
                model: ModelInformation::new("mock", "embed-1"),
                settings: serde_json::Value::Null,
                input: serde_json::Value::Null,
                start_timestamp: Utc::now(),
                finish_timestamp: None,
                duration_in_ms: None,
                usage: None,
            },
        }
    }

    fn tagging(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Arc<dyn FunctionObserver> {
        let log = log.clone();
        observer_fn(move |_| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    #[test]
    fn notification_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let environment = Arc::new(
            Environment::builder()
                .observer(tagging(&log, "process"))
                .build(),
        );
        let run = Run::builder()
            .function_observer(tagging(&log, "run"))
            .build();
        let options = FunctionOptions::new()
            .with_observer(tagging(&log, "call"))
            .with_run(run)
            .with_environment(environment);

        let bus = EventBus::for_call(&options, vec![tagging(&log, "model")]);
        assert_eq!(bus.len(), 4);
        bus.notify(&event("call-1"));
        assert_eq!(*log.lock().unwrap(), vec!["call", "model", "process", "run"]);
    }

    #[test]
    fn logging_observer_is_last() {
        let options = FunctionOptions::new()
            .with_environment(Arc::new(Environment::default()))
            .with_logging(FunctionLogging::BasicText);
        let bus = EventBus::for_call(&options, Vec::new());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn failures_go_to_error_handler() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        let run = Run::builder()
            .error_handler(move |e| sink.lock().unwrap().push(e.clone()))
            .build();

        let recorder = EventRecorder::new();
        let options = FunctionOptions::new()
            .with_observer(observer_fn(|_| Err(ModelError::Internal("nope".into()))))
            .with_observer(observer_fn(|_| panic!("observer exploded")))
            .with_observer(recorder.clone())
            .with_run(run)
            .with_environment(Arc::new(Environment::default()));

        EventBus::for_call(&options, Vec::new()).notify(&event("call-2"));

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ModelError::Observer(_))));
        assert!(errors[1].to_string().contains("observer exploded"));
        // later observers still ran
        assert_eq!(recorder.events().len(), 1);
    }

    #[tokio::test]
    async fn channel_observer_drops_when_full() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        let handler: ErrorHandler = Arc::new(move |e: &ModelError| sink.lock().unwrap().push(e.clone()));

        let (observer, mut receiver) = ChannelObserver::new(1);
        let observer: Arc<dyn FunctionObserver> = Arc::new(observer);
        let bus = EventBus::new(vec![observer], Some(handler));
        bus.notify(&event("call-a"));
        bus.notify(&event("call-b"));

        assert_eq!(receiver.recv().await.unwrap().call_id(), "call-a");
        assert_eq!(errors.lock().unwrap().len(), 1);
    }
}
