//! Streaming increments produced by adapters.

use futures::Stream;
use std::pin::Pin;

use crate::error::ModelError;

/// One increment of a streamed response.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<V> {
    /// The most recent provider payload, opaque to the pipeline.
    pub raw_delta: serde_json::Value,
    /// Cumulative provider payload so far, kept for diagnostics and as the
    /// final `response` of the call.
    pub full_delta: serde_json::Value,
    /// Extracted increment, `None` when nothing user-visible changed.
    pub value_delta: Option<V>,
}

impl<V> Delta<V> {
    pub fn new(raw_delta: serde_json::Value, full_delta: serde_json::Value, value_delta: Option<V>) -> Self {
        Self {
            raw_delta,
            full_delta,
            value_delta,
        }
    }
}

/// Pinned, boxed delta sequence returned by streaming adapters.
pub type DeltaStream<V> = Pin<Box<dyn Stream<Item = Result<Delta<V>, ModelError>> + Send>>;
