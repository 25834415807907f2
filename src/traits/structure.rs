//! Structured (JSON) output capability traits

use async_trait::async_trait;
use serde_json::Value;

use super::model::Model;
use crate::error::ModelError;
use crate::run::FunctionOptions;
use crate::types::{DeltaStream, GenerateResponse};

#[async_trait]
pub trait StructureGenerationModel: Model {
    type Prompt: serde::Serialize + Send + Sync;

    /// Generate a JSON value for `schema`. The extracted value is the raw
    /// JSON text produced by the model.
    async fn do_generate_structure(
        &self,
        schema: &Value,
        prompt: &Self::Prompt,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<String>, ModelError>;
}

#[async_trait]
pub trait StructureStreamingModel: Model {
    type Prompt: serde::Serialize + Send + Sync;

    /// Stream the JSON text; each delta's `value_delta` is a text fragment.
    async fn do_stream_structure(
        &self,
        schema: &Value,
        prompt: &Self::Prompt,
        options: FunctionOptions,
    ) -> Result<DeltaStream<String>, ModelError>;
}
