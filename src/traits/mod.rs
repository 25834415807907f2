//! Adapter contract
//!
//! Provider adapters implement [`Model`] plus one capability trait per kind of
//! operation they support. The `do_*` methods perform exactly one logical
//! provider request; retries and throttling happen inside them through an
//! [`ApiConfiguration`](crate::api_configuration::ApiConfiguration).

pub mod embedding;
pub mod model;
pub mod structure;
pub mod text;
pub mod tool_call;

pub use embedding::EmbeddingModel;
pub use model::Model;
pub use structure::{StructureGenerationModel, StructureStreamingModel};
pub use text::{TextGenerationModel, TextStreamingModel};
pub use tool_call::ToolCallGenerationModel;
