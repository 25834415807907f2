//! Embedding capability trait

use async_trait::async_trait;

use super::model::Model;
use crate::error::ModelError;
use crate::run::FunctionOptions;
use crate::types::GenerateResponse;

#[async_trait]
pub trait EmbeddingModel: Model {
    type Value: serde::Serialize + Send + Sync;

    /// Embed at most [`max_values_per_call`](Self::max_values_per_call) values.
    async fn do_embed_values(
        &self,
        values: &[Self::Value],
        options: FunctionOptions,
    ) -> Result<GenerateResponse<Vec<Vec<f32>>>, ModelError>;

    /// Batch size limit; `None` means unlimited.
    fn max_values_per_call(&self) -> Option<usize> {
        None
    }

    /// Whether batches may be sent concurrently.
    fn supports_parallel_calls(&self) -> bool {
        true
    }
}
