//! Call executors
//!
//! - lifecycle.rs: call metadata and exactly-once `finished` notification
//! - standard.rs: single-response calls
//! - stream.rs: streamed calls and [`ModelStream`]

pub mod lifecycle;
pub mod standard;
pub mod stream;

pub use lifecycle::CallLifecycle;
pub use standard::execute_standard_call;
pub use stream::{DeltaProcessor, ModelStream, StreamCompletion, StreamResult, execute_stream_call};
