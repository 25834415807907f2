//! Shared data types of the call pipeline.

pub mod delta;
pub mod metadata;
pub mod response;
pub mod schema;
pub mod tools;

pub use delta::{Delta, DeltaStream};
pub use metadata::{CallMetadata, FunctionType, ModelInformation, Usage, new_call_id};
pub use response::{GenerateResponse, ModelResponse};
pub use schema::{JsonSchema, Schema, SerdeSchema, UncheckedSchema};
pub use tools::{Tool, ToolCall, ToolDefinition, ValidatedToolCall};
