//! Text generation capability traits

use async_trait::async_trait;

use super::model::Model;
use crate::error::ModelError;
use crate::run::FunctionOptions;
use crate::types::{DeltaStream, GenerateResponse};

#[async_trait]
pub trait TextGenerationModel: Model {
    type Prompt: serde::Serialize + Send + Sync;

    async fn do_generate_text(
        &self,
        prompt: &Self::Prompt,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<String>, ModelError>;
}

#[async_trait]
pub trait TextStreamingModel: Model {
    type Prompt: serde::Serialize + Send + Sync;

    /// Open the delta stream. Each delta's `value_delta` is the new text fragment.
    async fn do_stream_text(
        &self,
        prompt: &Self::Prompt,
        options: FunctionOptions,
    ) -> Result<DeltaStream<String>, ModelError>;

    /// Whether leading/trailing whitespace of the whole text is trimmed.
    fn trim_whitespace(&self) -> bool {
        true
    }
}
