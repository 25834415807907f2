//! Text streaming

use crate::error::ModelError;
use crate::execution::{DeltaProcessor, ModelStream, StreamResult, execute_stream_call};
use crate::run::FunctionOptions;
use crate::streaming::TextDeltaAccumulator;
use crate::traits::TextStreamingModel;
use crate::types::{Delta, FunctionType};

/// Accumulates text fragments into display chunks.
#[derive(Debug)]
struct TextProcessor {
    accumulator: TextDeltaAccumulator,
}

impl DeltaProcessor<String> for TextProcessor {
    type Output = String;

    fn process_delta(&mut self, delta: &Delta<String>) -> Option<String> {
        delta
            .value_delta
            .as_deref()
            .and_then(|fragment| self.accumulator.push(fragment))
    }

    fn finish(&mut self) -> Result<StreamResult<String>, ModelError> {
        Ok(StreamResult::new(serde_json::Value::String(
            self.accumulator.text().to_string(),
        )))
    }
}

/// Stream text for `prompt`. Items are text chunks; the settled value
/// reported in the `finished` event is the accumulated text.
pub async fn stream_text<M>(
    model: &M,
    prompt: &M::Prompt,
    options: &FunctionOptions,
) -> Result<ModelStream<String>, ModelError>
where
    M: TextStreamingModel + ?Sized,
{
    let processor = TextProcessor {
        accumulator: TextDeltaAccumulator::new(model.trim_whitespace()),
    };
    execute_stream_call(
        model,
        options,
        super::input_value(prompt),
        FunctionType::StreamText,
        |options| model.do_stream_text(prompt, options),
        processor,
    )
    .await
}
