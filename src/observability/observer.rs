//! Function observers
//!
//! Observers are read-only consumers of lifecycle events. They run
//! synchronously on the emitting call, so they must return quickly; use
//! [`ChannelObserver`] to move slow work onto a separate task.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::events::FunctionEvent;
use crate::error::ModelError;

/// Consumer of function lifecycle events.
pub trait FunctionObserver: Send + Sync {
    /// Handle one event. Errors are routed to the run's error handler and
    /// never reach the call that emitted the event.
    fn on_function_event(&self, event: &FunctionEvent) -> Result<(), ModelError>;
}

/// Observer backed by a closure.
pub struct FnObserver<F>(F);

impl<F> FunctionObserver for FnObserver<F>
where
    F: Fn(&FunctionEvent) -> Result<(), ModelError> + Send + Sync,
{
    fn on_function_event(&self, event: &FunctionEvent) -> Result<(), ModelError> {
        (self.0)(event)
    }
}

impl<F> std::fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnObserver")
    }
}

/// Wrap a closure as a shareable observer.
pub fn observer_fn<F>(f: F) -> Arc<dyn FunctionObserver>
where
    F: Fn(&FunctionEvent) -> Result<(), ModelError> + Send + Sync + 'static,
{
    Arc::new(FnObserver(f))
}

/// Observer that keeps every event it sees, in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<FunctionEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<FunctionEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Recorded events belonging to one call.
    pub fn events_for_call(&self, call_id: &str) -> Vec<FunctionEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.call_id() == call_id)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

impl FunctionObserver for EventRecorder {
    fn on_function_event(&self, event: &FunctionEvent) -> Result<(), ModelError> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}

/// Observer that forwards events into a bounded channel without waiting.
///
/// The receiving side can be drained by any task at its own pace. When the
/// channel is full the event is dropped and reported as an observer error.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::Sender<FunctionEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver that drains it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<FunctionEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl FunctionObserver for ChannelObserver {
    fn on_function_event(&self, event: &FunctionEvent) -> Result<(), ModelError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(event) => ModelError::Observer(format!(
                "event channel full, dropped {} event for {}",
                event.event_type(),
                event.call_id()
            )),
            mpsc::error::TrySendError::Closed(_) => {
                ModelError::Observer("event channel closed".to_string())
            }
        })
    }
}
