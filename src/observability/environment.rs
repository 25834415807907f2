//! Process-scoped observer configuration
//!
//! An [`Environment`] holds the observers and the default logging level that
//! apply to every call in the process. It is built once at startup and
//! installed explicitly; calls may also carry their own environment in
//! `FunctionOptions`, which takes precedence. `Environment::reset` restores
//! the empty default, mainly for test isolation.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::logging::FunctionLogging;
use super::observer::FunctionObserver;

static ENVIRONMENT: OnceLock<RwLock<Arc<Environment>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<Environment>> {
    ENVIRONMENT.get_or_init(|| RwLock::new(Arc::new(Environment::default())))
}

/// Observers and logging defaults shared by all calls.
#[derive(Clone, Default)]
pub struct Environment {
    observers: Vec<Arc<dyn FunctionObserver>>,
    logging: FunctionLogging,
}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    /// Process-wide observers.
    pub fn observers(&self) -> &[Arc<dyn FunctionObserver>] {
        &self.observers
    }

    /// Logging level used when a call does not choose one.
    pub const fn logging(&self) -> FunctionLogging {
        self.logging
    }

    /// Install this environment for the whole process, replacing the
    /// previous one. Calls already running keep the environment they resolved.
    pub fn install(self) -> Arc<Self> {
        let environment = Arc::new(self);
        *slot().write().unwrap_or_else(PoisonError::into_inner) = environment.clone();
        tracing::debug!(
            observers = environment.observers.len(),
            logging = ?environment.logging,
            "installed function environment"
        );
        environment
    }

    /// The currently installed environment.
    pub fn current() -> Arc<Self> {
        slot().read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Restore the empty default environment.
    pub fn reset() {
        *slot().write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Self::default());
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("observers", &self.observers.len())
            .field("logging", &self.logging)
            .finish()
    }
}

/// Builder for [`Environment`].
#[derive(Default)]
pub struct EnvironmentBuilder {
    observers: Vec<Arc<dyn FunctionObserver>>,
    logging: FunctionLogging,
}

impl EnvironmentBuilder {
    pub fn observer(mut self, observer: Arc<dyn FunctionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub const fn logging(mut self, logging: FunctionLogging) -> Self {
        self.logging = logging;
        self
    }

    pub fn build(self) -> Environment {
        Environment {
            observers: self.observers,
            logging: self.logging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::EventRecorder;

    #[test]
    fn install_and_reset() {
        let recorder = EventRecorder::new();
        let installed = Environment::builder()
            .observer(recorder)
            .logging(FunctionLogging::BasicText)
            .build()
            .install();

        let current = Environment::current();
        assert!(Arc::ptr_eq(&installed, &current));
        assert_eq!(current.observers().len(), 1);
        assert_eq!(current.logging(), FunctionLogging::BasicText);

        Environment::reset();
        let current = Environment::current();
        assert!(current.observers().is_empty());
        assert_eq!(current.logging(), FunctionLogging::Off);
    }
}
