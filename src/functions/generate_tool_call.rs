//! Tool call generation

use crate::error::ModelError;
use crate::execution::execute_standard_call;
use crate::run::FunctionOptions;
use crate::traits::ToolCallGenerationModel;
use crate::types::{FunctionType, GenerateResponse, ModelResponse, Schema, Tool, ValidatedToolCall};

/// Ask the model to call `tool` and validate the arguments.
///
/// Fails with `ModelError::ToolCallGeneration` when the model answers
/// without calling the tool, and with `ModelError::ToolCallParse` when the
/// arguments do not match the tool's schema.
pub async fn generate_tool_call<M, S>(
    model: &M,
    tool: &Tool<S>,
    prompt: &M::Prompt,
    options: &FunctionOptions,
) -> Result<ModelResponse<ValidatedToolCall<S::Output>>, ModelError>
where
    M: ToolCallGenerationModel + ?Sized,
    S: Schema,
    S::Output: serde::Serialize,
{
    let definition = tool.definition();
    execute_standard_call(
        model,
        options,
        super::input_value(prompt),
        FunctionType::GenerateToolCall,
        |options| async move {
            let GenerateResponse {
                response,
                extracted_value,
                usage,
            } = model.do_generate_tool_call(&definition, prompt, options).await?;

            let call = extracted_value.ok_or_else(|| ModelError::ToolCallGeneration {
                tool_name: definition.name.clone(),
            })?;
            let args = tool
                .schema
                .validate(&call.args)
                .map_err(|message| ModelError::ToolCallParse {
                    tool_name: definition.name.clone(),
                    message,
                    value_text: Some(call.args.to_string()),
                })?;

            Ok(GenerateResponse {
                response,
                extracted_value: ValidatedToolCall {
                    id: call.id,
                    name: definition.name.clone(),
                    args,
                },
                usage,
            })
        },
    )
    .await
}
