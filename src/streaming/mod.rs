//! Streaming helpers
//!
//! Incremental extraction used by the streaming functions: whitespace-aware
//! text accumulation and tolerant parsing of partial JSON documents.

pub mod accumulator;
pub mod partial_json;

pub use accumulator::TextDeltaAccumulator;
pub use partial_json::parse_partial_json;
