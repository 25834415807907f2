//! Embeddings

use futures_util::future::try_join_all;

use crate::error::ModelError;
use crate::execution::execute_standard_call;
use crate::run::FunctionOptions;
use crate::traits::EmbeddingModel;
use crate::types::{FunctionType, GenerateResponse, ModelResponse, Usage};

/// Embed a single value.
pub async fn embed<M>(
    model: &M,
    value: &M::Value,
    options: &FunctionOptions,
) -> Result<ModelResponse<Vec<f32>>, ModelError>
where
    M: EmbeddingModel + ?Sized,
{
    execute_standard_call(
        model,
        options,
        super::input_value(value),
        FunctionType::Embed,
        |options| async move {
            let generated = model.do_embed_values(std::slice::from_ref(value), options).await?;
            let GenerateResponse {
                response,
                extracted_value,
                usage,
            } = generated;
            let embedding = extracted_value
                .into_iter()
                .next()
                .ok_or_else(|| ModelError::api_call("model returned no embedding", None, false))?;
            Ok(GenerateResponse {
                response,
                extracted_value: embedding,
                usage,
            })
        },
    )
    .await
}

/// Embed many values in one recorded call.
///
/// Values are split into groups of at most `max_values_per_call`; groups run
/// concurrently when the model supports it. Embeddings keep input order, the
/// response is the list of provider responses.
pub async fn embed_many<M>(
    model: &M,
    values: &[M::Value],
    options: &FunctionOptions,
) -> Result<ModelResponse<Vec<Vec<f32>>>, ModelError>
where
    M: EmbeddingModel + ?Sized,
{
    execute_standard_call(
        model,
        options,
        super::input_value(values),
        FunctionType::Embed,
        |options| async move {
            if values.is_empty() {
                return Ok(GenerateResponse::new(serde_json::Value::Array(Vec::new()), Vec::new()));
            }
            let group_size = model.max_values_per_call().unwrap_or(values.len()).max(1);
            let groups = values.chunks(group_size);

            let results = if model.supports_parallel_calls() {
                try_join_all(groups.map(|group| model.do_embed_values(group, options.clone()))).await?
            } else {
                let mut results = Vec::new();
                for group in groups {
                    results.push(model.do_embed_values(group, options.clone()).await?);
                }
                results
            };

            let mut responses = Vec::with_capacity(results.len());
            let mut embeddings = Vec::with_capacity(values.len());
            let mut usage: Option<Usage> = None;
            for result in results {
                responses.push(result.response);
                embeddings.extend(result.extracted_value);
                if let Some(group_usage) = result.usage {
                    usage = Some(usage.map_or(group_usage, |total| total.merge(group_usage)));
                }
            }

            Ok(GenerateResponse {
                response: serde_json::Value::Array(responses),
                extracted_value: embeddings,
                usage,
            })
        },
    )
    .await
}
