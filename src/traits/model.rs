//! Base model trait

use std::sync::Arc;

use crate::observability::FunctionObserver;
use crate::types::ModelInformation;

/// Identity and observability hooks shared by every adapter.
pub trait Model: Send + Sync {
    fn model_information(&self) -> ModelInformation;

    /// Settings snapshot recorded in call metadata.
    fn settings_for_event(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Observers notified for every call served by this model.
    fn observers(&self) -> Vec<Arc<dyn FunctionObserver>> {
        Vec::new()
    }
}
