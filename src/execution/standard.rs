//! Standard (single response) call executor

use serde::Serialize;
use std::future::Future;

use super::lifecycle::CallLifecycle;
use crate::error::ModelError;
use crate::observability::ModelCallResult;
use crate::run::FunctionOptions;
use crate::traits::Model;
use crate::types::{FunctionType, GenerateResponse, ModelResponse};
use crate::utils::cancel::{AbortSignal, abortable};

/// Execute one non-streaming model call with full lifecycle tracking.
///
/// Emits `started`, runs `generate_response` with options whose
/// `parent_call_id` is this call, races it against the run's abort signal,
/// then emits exactly one `finished` event. An abort observed before the
/// call finishes wins over a result that resolved concurrently. No retries
/// happen here; adapters retry inside `generate_response`.
pub async fn execute_standard_call<M, T, F, Fut>(
    model: &M,
    options: &FunctionOptions,
    input: serde_json::Value,
    function_type: FunctionType,
    generate_response: F,
) -> Result<ModelResponse<T>, ModelError>
where
    M: Model + ?Sized,
    T: Serialize,
    F: FnOnce(FunctionOptions) -> Fut,
    Fut: Future<Output = Result<GenerateResponse<T>, ModelError>>,
{
    let lifecycle = CallLifecycle::start(model, options, input, function_type);
    let signal = options.abort_signal();

    let outcome = abortable(signal, generate_response(lifecycle.child_options(options))).await;
    let aborted = signal.is_some_and(AbortSignal::is_aborted);

    match outcome {
        Err(error) if aborted || error.is_abort() => {
            lifecycle.finish(ModelCallResult::Abort, None);
            Err(ModelError::Aborted)
        }
        Ok(_) if aborted => {
            lifecycle.finish(ModelCallResult::Abort, None);
            Err(ModelError::Aborted)
        }
        Err(error) => {
            lifecycle.finish(
                ModelCallResult::Error {
                    error: error.clone(),
                },
                None,
            );
            Err(error)
        }
        Ok(GenerateResponse {
            response,
            extracted_value,
            usage,
        }) => {
            let value = serde_json::to_value(&extracted_value).unwrap_or_else(|error| {
                tracing::warn!(call_id = %lifecycle.call_id(), %error, "extracted value is not serializable, reporting null");
                serde_json::Value::Null
            });
            let result = ModelCallResult::Success {
                value,
                response: response.clone(),
                usage,
            };
            let metadata = lifecycle
                .finish(result, usage)
                .ok_or_else(|| ModelError::Internal("call finished twice".to_string()))?;
            Ok(ModelResponse {
                value: extracted_value,
                response,
                metadata,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{Environment, EventRecorder};
    use crate::types::ModelInformation;
    use serde::Serializer;
    use std::sync::Arc;
    use tracing_test::traced_test;

    struct Echo;

    impl Model for Echo {
        fn model_information(&self) -> ModelInformation {
            ModelInformation::new("echo", "echo-1")
        }
    }

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque value"))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn unserializable_value_is_logged_and_reported_as_null() {
        let recorder = EventRecorder::new();
        let options = FunctionOptions::new()
            .with_observer(recorder.clone())
            .with_environment(Arc::new(Environment::default()));

        let response: ModelResponse<Opaque> = execute_standard_call(
            &Echo,
            &options,
            serde_json::Value::Null,
            FunctionType::GenerateText,
            |_| async { Ok(GenerateResponse::new(serde_json::json!({}), Opaque)) },
        )
        .await
        .unwrap();

        assert!(logs_contain("opaque value"));
        assert_eq!(
            recorder.events()[1].result(),
            Some(&ModelCallResult::Success {
                value: serde_json::Value::Null,
                response: serde_json::json!({}),
                usage: None,
            })
        );
        assert_eq!(response.metadata.model.provider, "echo");
    }
}
