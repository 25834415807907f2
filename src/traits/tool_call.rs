//! Tool call capability trait

use async_trait::async_trait;

use super::model::Model;
use crate::error::ModelError;
use crate::run::FunctionOptions;
use crate::types::{GenerateResponse, ToolCall, ToolDefinition};

#[async_trait]
pub trait ToolCallGenerationModel: Model {
    type Prompt: serde::Serialize + Send + Sync;

    /// Ask the model to call `tool`; `None` when it answered without a call.
    async fn do_generate_tool_call(
        &self,
        tool: &ToolDefinition,
        prompt: &Self::Prompt,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<Option<ToolCall>>, ModelError>;
}
