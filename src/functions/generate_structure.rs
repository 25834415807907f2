//! Structured output generation

use crate::error::ModelError;
use crate::execution::execute_standard_call;
use crate::run::FunctionOptions;
use crate::traits::StructureGenerationModel;
use crate::types::{FunctionType, GenerateResponse, ModelResponse, Schema};

/// Generate a value conforming to `schema`.
///
/// Fails with `ModelError::Parse` when the model output is not JSON and
/// with `ModelError::Validation` when it does not match the schema.
pub async fn generate_structure<M, S>(
    model: &M,
    schema: &S,
    prompt: &M::Prompt,
    options: &FunctionOptions,
) -> Result<ModelResponse<S::Output>, ModelError>
where
    M: StructureGenerationModel + ?Sized,
    S: Schema + ?Sized,
    S::Output: serde::Serialize,
{
    let json_schema = schema.json_schema();
    execute_standard_call(
        model,
        options,
        super::input_value(prompt),
        FunctionType::GenerateStructure,
        |options| async move {
            let generated = model.do_generate_structure(&json_schema, prompt, options).await?;
            let GenerateResponse {
                response,
                extracted_value: text,
                usage,
            } = generated;

            let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
                ModelError::parse(format!("model output is not valid JSON: {e}"), Some(text.clone()))
            })?;
            let output = schema
                .validate(&value)
                .map_err(|message| ModelError::validation(message, Some(text.clone()), Some(value.clone())))?;

            Ok(GenerateResponse {
                response,
                extracted_value: output,
                usage,
            })
        },
    )
    .await
}
