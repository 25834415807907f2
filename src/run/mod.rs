//! Run context and per-call options
//!
//! A [`Run`] groups every call made for one logical top-level operation. It
//! carries the correlation ids, the shared abort signal, an optional error
//! handler and an optional run-level observer. Runs are shared by `Arc` and
//! never modified by the calls that use them.

use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::observability::{Environment, FunctionLogging, FunctionObserver};
use crate::utils::cancel::AbortSignal;

/// Handler for errors that must not reach the call site (observer failures).
pub type ErrorHandler = Arc<dyn Fn(&ModelError) + Send + Sync>;

/// Context shared by all calls of a run.
#[derive(Clone, Default)]
pub struct Run {
    pub run_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub abort_signal: AbortSignal,
    pub error_handler: Option<ErrorHandler>,
    pub function_observer: Option<Arc<dyn FunctionObserver>>,
}

impl Run {
    /// A run with a fresh `run-<uuid>` id.
    pub fn new() -> Self {
        Self {
            run_id: Some(format!("run-{}", uuid::Uuid::new_v4())),
            ..Default::default()
        }
    }

    pub fn builder() -> RunBuilder {
        RunBuilder::default()
    }

    /// Fire the run's abort signal.
    pub fn abort(&self) {
        self.abort_signal.abort();
    }
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("run_id", &self.run_id)
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("aborted", &self.abort_signal.is_aborted())
            .field("has_error_handler", &self.error_handler.is_some())
            .field("has_function_observer", &self.function_observer.is_some())
            .finish()
    }
}

/// Builder for [`Run`].
#[derive(Default)]
pub struct RunBuilder {
    run: Run,
}

impl RunBuilder {
    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run.run_id = Some(run_id.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.run.session_id = Some(session_id.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.run.user_id = Some(user_id.into());
        self
    }

    /// Use an externally owned abort signal.
    pub fn abort_signal(mut self, signal: AbortSignal) -> Self {
        self.run.abort_signal = signal;
        self
    }

    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ModelError) + Send + Sync + 'static,
    {
        self.run.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn function_observer(mut self, observer: Arc<dyn FunctionObserver>) -> Self {
        self.run.function_observer = Some(observer);
        self
    }

    /// Finish the run; a `run-<uuid>` id is generated if none was set.
    pub fn build(mut self) -> Arc<Run> {
        if self.run.run_id.is_none() {
            self.run.run_id = Some(format!("run-{}", uuid::Uuid::new_v4()));
        }
        Arc::new(self.run)
    }
}

/// Options accepted by every model function and passed on to adapters.
#[derive(Clone, Default)]
pub struct FunctionOptions {
    /// Caller-chosen id of the logical function, for grouping events.
    pub function_id: Option<String>,
    /// Logging level; falls back to the environment's level.
    pub logging: Option<FunctionLogging>,
    /// Per-call observers, notified first.
    pub observers: Vec<Arc<dyn FunctionObserver>>,
    pub run: Option<Arc<Run>>,
    /// Call id of the enclosing call, set by the executors for nested calls.
    pub parent_call_id: Option<String>,
    /// Explicit environment; falls back to [`Environment::current`].
    pub environment: Option<Arc<Environment>>,
}

impl FunctionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_id(mut self, function_id: impl Into<String>) -> Self {
        self.function_id = Some(function_id.into());
        self
    }

    pub const fn with_logging(mut self, logging: FunctionLogging) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FunctionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_run(mut self, run: Arc<Run>) -> Self {
        self.run = Some(run);
        self
    }

    pub fn with_environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// The run's abort signal, if the call belongs to a run.
    pub fn abort_signal(&self) -> Option<&AbortSignal> {
        self.run.as_deref().map(|run| &run.abort_signal)
    }

    /// Options handed to the adapter of the call `call_id`: same function
    /// id, logging, observers, run and environment, with `call_id` as parent.
    pub fn for_child_call(&self, call_id: &str) -> Self {
        Self {
            parent_call_id: Some(call_id.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for FunctionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionOptions")
            .field("function_id", &self.function_id)
            .field("logging", &self.logging)
            .field("observers", &self.observers.len())
            .field("run", &self.run)
            .field("parent_call_id", &self.parent_call_id)
            .field("has_environment", &self.environment.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(Run: Send, Sync);
static_assertions::assert_impl_all!(FunctionOptions: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_generates_run_id() {
        let run = Run::builder().session_id("s-1").build();
        assert!(run.run_id.as_deref().unwrap().starts_with("run-"));
        assert_eq!(run.session_id.as_deref(), Some("s-1"));
        assert!(!run.abort_signal.is_aborted());
    }

    #[test]
    fn child_options_keep_run_and_set_parent() {
        let run = Run::builder().run_id("run-x").build();
        let options = FunctionOptions::new()
            .with_function_id("fn")
            .with_run(run.clone());
        let child = options.for_child_call("call-1");
        assert_eq!(child.parent_call_id.as_deref(), Some("call-1"));
        assert_eq!(child.function_id.as_deref(), Some("fn"));
        assert!(Arc::ptr_eq(child.run.as_ref().unwrap(), &run));
    }

    #[test]
    fn abort_signal_is_shared_through_run() {
        let run = Run::builder().build();
        let options = FunctionOptions::new().with_run(run.clone());
        run.abort();
        assert!(options.abort_signal().unwrap().is_aborted());
    }
}
