//! Utility Module
//!
//! Small helpers shared across the pipeline.

pub mod cancel;

pub use cancel::{AbortSignal, abortable, abortable_stream};
