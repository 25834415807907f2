//! Streaming call executor
//!
//! Opens the adapter's delta stream and exposes the extracted values as a
//! pull-driven [`ModelStream`]. The `finished` event is emitted when the
//! stream is drained, fails, is aborted or is dropped early.

use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use super::lifecycle::CallLifecycle;
use crate::error::ModelError;
use crate::observability::ModelCallResult;
use crate::run::FunctionOptions;
use crate::traits::Model;
use crate::types::{CallMetadata, Delta, DeltaStream, FunctionType, Usage};
use crate::utils::cancel::abortable;

/// Settled outcome of a drained stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamResult<O> {
    /// Value reported in the `finished` event.
    pub value: serde_json::Value,
    /// Extra item yielded after the last delta, if any.
    pub final_output: Option<O>,
    pub usage: Option<Usage>,
}

impl<O> StreamResult<O> {
    pub const fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            final_output: None,
            usage: None,
        }
    }

    pub fn with_final_output(mut self, output: O) -> Self {
        self.final_output = Some(output);
        self
    }
}

/// Turns deltas into stream items and computes the settled value.
pub trait DeltaProcessor<V>: Send + 'static {
    type Output: Send + 'static;

    /// Process one delta; `None` means nothing to yield.
    fn process_delta(&mut self, delta: &Delta<V>) -> Option<Self::Output>;

    /// Called once after the last delta.
    fn finish(&mut self) -> Result<StreamResult<Self::Output>, ModelError>;
}

/// Final state of a completed stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCompletion {
    pub metadata: CallMetadata,
    pub value: serde_json::Value,
    /// Last full delta received from the adapter.
    pub response: serde_json::Value,
}

type SharedCompletion = Arc<Mutex<Option<StreamCompletion>>>;

/// Stream of extracted values for one model call.
///
/// Dropping the stream before it is drained, polled or not, finishes the
/// call as an abort.
pub struct ModelStream<O> {
    inner: Pin<Box<dyn Stream<Item = Result<O, ModelError>> + Send>>,
    lifecycle: Arc<CallLifecycle>,
    completion: SharedCompletion,
}

impl<O> ModelStream<O> {
    pub fn call_id(&self) -> &str {
        self.lifecycle.call_id()
    }

    /// Final state, available once the stream has been drained successfully.
    pub fn completion(&self) -> Option<StreamCompletion> {
        self.completion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Finished metadata, available once the stream has been drained successfully.
    pub fn finished_metadata(&self) -> Option<CallMetadata> {
        self.completion().map(|completion| completion.metadata)
    }
}

impl<O> Stream for ModelStream<O> {
    type Item = Result<O, ModelError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<O> std::fmt::Debug for ModelStream<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStream")
            .field("call_id", &self.call_id())
            .field("completed", &self.completion().is_some())
            .finish()
    }
}

enum Step<V> {
    Abort,
    Next(Option<Result<Delta<V>, ModelError>>),
}

/// Execute a streaming model call.
///
/// Emits `started`, then opens the delta stream with `start_stream`. A
/// failure to open emits `finished` with the error and returns it. Otherwise
/// the returned [`ModelStream`] drives the deltas through `processor` as it
/// is polled.
pub async fn execute_stream_call<M, V, P, F, Fut>(
    model: &M,
    options: &FunctionOptions,
    input: serde_json::Value,
    function_type: FunctionType,
    start_stream: F,
    mut processor: P,
) -> Result<ModelStream<P::Output>, ModelError>
where
    M: Model + ?Sized,
    V: Send + 'static,
    P: DeltaProcessor<V>,
    F: FnOnce(FunctionOptions) -> Fut,
    Fut: Future<Output = Result<DeltaStream<V>, ModelError>>,
{
    let lifecycle = Arc::new(CallLifecycle::start(model, options, input, function_type));
    let signal = options.abort_signal().cloned();

    let opened = abortable(signal.as_ref(), start_stream(lifecycle.child_options(options))).await;
    let mut deltas = match opened {
        Ok(_) if signal.as_ref().is_some_and(|s| s.is_aborted()) => {
            lifecycle.finish(ModelCallResult::Abort, None);
            return Err(ModelError::Aborted);
        }
        Ok(deltas) => deltas,
        Err(error) if error.is_abort() => {
            lifecycle.finish(ModelCallResult::Abort, None);
            return Err(ModelError::Aborted);
        }
        Err(error) => {
            lifecycle.finish(
                ModelCallResult::Error {
                    error: error.clone(),
                },
                None,
            );
            return Err(error);
        }
    };

    let completion: SharedCompletion = Arc::new(Mutex::new(None));
    let shared = completion.clone();

    let driver = lifecycle.clone();
    let inner = async_stream::stream! {
        let lifecycle = driver;
        let mut last_full_delta = serde_json::Value::Null;

        loop {
            let step = match &signal {
                Some(signal) => tokio::select! {
                    biased;
                    _ = signal.aborted() => Step::Abort,
                    next = deltas.next() => Step::Next(next),
                },
                None => Step::Next(deltas.next().await),
            };

            match step {
                Step::Next(Some(Ok(delta))) => {
                    last_full_delta = delta.full_delta.clone();
                    if let Some(output) = processor.process_delta(&delta) {
                        yield Ok(output);
                    }
                }
                Step::Next(Some(Err(error))) if !error.is_abort() => {
                    lifecycle.finish(ModelCallResult::Error { error: error.clone() }, None);
                    yield Err(error);
                    break;
                }
                Step::Abort | Step::Next(Some(Err(_))) => {
                    lifecycle.finish(ModelCallResult::Abort, None);
                    yield Err(ModelError::Aborted);
                    break;
                }
                Step::Next(None) => {
                    match processor.finish() {
                        Ok(result) => {
                            let success = ModelCallResult::Success {
                                value: result.value.clone(),
                                response: last_full_delta.clone(),
                                usage: result.usage,
                            };
                            if let Some(metadata) = lifecycle.finish(success, result.usage) {
                                *shared.lock().unwrap_or_else(PoisonError::into_inner) = Some(StreamCompletion {
                                    metadata,
                                    value: result.value,
                                    response: last_full_delta.clone(),
                                });
                            }
                            if let Some(output) = result.final_output {
                                yield Ok(output);
                            }
                        }
                        Err(error) => {
                            lifecycle.finish(ModelCallResult::Error { error: error.clone() }, None);
                            yield Err(error);
                        }
                    }
                    break;
                }
            }
        }
    };

    Ok(ModelStream {
        inner: Box::pin(inner),
        lifecycle,
        completion,
    })
}
