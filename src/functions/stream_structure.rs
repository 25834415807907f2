//! Structured output streaming

use serde_json::Value;

use crate::error::ModelError;
use crate::execution::{DeltaProcessor, ModelStream, StreamResult, execute_stream_call};
use crate::run::FunctionOptions;
use crate::streaming::parse_partial_json;
use crate::traits::StructureStreamingModel;
use crate::types::{Delta, FunctionType, Schema};

/// Item of a structure stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureStreamPart<T> {
    /// Best-effort parse of the text received so far. Not validated.
    Partial(Value),
    /// The complete, validated value. Always the last item.
    Complete(T),
}

impl<T> StructureStreamPart<T> {
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

struct StructureProcessor<S> {
    schema: S,
    text: String,
    last_partial: Option<Value>,
}

impl<S> DeltaProcessor<String> for StructureProcessor<S>
where
    S: Schema + 'static,
{
    type Output = StructureStreamPart<S::Output>;

    fn process_delta(&mut self, delta: &Delta<String>) -> Option<Self::Output> {
        self.text.push_str(delta.value_delta.as_deref()?);
        let partial = parse_partial_json(&self.text)?;
        if self.last_partial.as_ref() == Some(&partial) {
            return None;
        }
        self.last_partial = Some(partial.clone());
        Some(StructureStreamPart::Partial(partial))
    }

    fn finish(&mut self) -> Result<StreamResult<Self::Output>, ModelError> {
        let value: Value = serde_json::from_str(&self.text).map_err(|e| {
            ModelError::parse(format!("model output is not valid JSON: {e}"), Some(self.text.clone()))
        })?;
        let output = self.schema.validate(&value).map_err(|message| {
            ModelError::validation(message, Some(self.text.clone()), Some(value.clone()))
        })?;
        Ok(StreamResult::new(value).with_final_output(StructureStreamPart::Complete(output)))
    }
}

/// Stream a value conforming to `schema`.
///
/// Yields a `Partial` whenever the parsed prefix changes, then one
/// `Complete` with the validated value. Invalid JSON or schema violations at
/// the end are yielded as the final error.
pub async fn stream_structure<M, S>(
    model: &M,
    schema: S,
    prompt: &M::Prompt,
    options: &FunctionOptions,
) -> Result<ModelStream<StructureStreamPart<S::Output>>, ModelError>
where
    M: StructureStreamingModel + ?Sized,
    S: Schema + 'static,
{
    let json_schema = schema.json_schema();
    let processor = StructureProcessor {
        schema,
        text: String::new(),
        last_partial: None,
    };
    execute_stream_call(
        model,
        options,
        super::input_value(prompt),
        FunctionType::StreamStructure,
        |options| async move { model.do_stream_structure(&json_schema, prompt, options).await },
        processor,
    )
    .await
}
