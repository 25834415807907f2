//! Text generation

use crate::error::ModelError;
use crate::execution::execute_standard_call;
use crate::run::FunctionOptions;
use crate::traits::TextGenerationModel;
use crate::types::{FunctionType, ModelResponse};

/// Generate text for `prompt`.
pub async fn generate_text<M>(
    model: &M,
    prompt: &M::Prompt,
    options: &FunctionOptions,
) -> Result<ModelResponse<String>, ModelError>
where
    M: TextGenerationModel + ?Sized,
{
    execute_standard_call(
        model,
        options,
        super::input_value(prompt),
        FunctionType::GenerateText,
        |options| model.do_generate_text(prompt, options),
    )
    .await
}
