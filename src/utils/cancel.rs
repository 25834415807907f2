//! Cancellation utilities
//!
//! Provides the abort signal shared by all calls of a run, plus helpers that
//! race futures and streams against it.

use futures::{Stream, StreamExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::ModelError;

/// Shared cancellation token observed at every suspension point of a run.
///
/// Cloning yields another handle to the same signal; the signal is owned by
/// whoever created the run, never by an individual call.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// Create a new, not yet fired, abort signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Every pending wait observing it unwinds into
    /// `ModelError::Aborted`.
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Check if the signal fired.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when the signal fires.
    pub fn aborted(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A child signal: fires when this one fires, but can also be fired on
    /// its own without affecting the parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Run `future` unless the signal fires first. A signal that already
    /// fired wins even if `future` is immediately ready.
    pub async fn run<F, T>(&self, future: F) -> Result<T, ModelError>
    where
        F: Future<Output = Result<T, ModelError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ModelError::Aborted),
            result = future => result,
        }
    }
}

/// Race `future` against an optional abort signal.
pub async fn abortable<F, T>(signal: Option<&AbortSignal>, future: F) -> Result<T, ModelError>
where
    F: Future<Output = Result<T, ModelError>>,
{
    match signal {
        Some(signal) => signal.run(future).await,
        None => future.await,
    }
}

/// Make a stream stop as soon as `signal` fires; the last item yielded is
/// `Err(ModelError::Aborted)`.
pub fn abortable_stream<S, T>(
    stream: S,
    signal: AbortSignal,
) -> impl Stream<Item = Result<T, ModelError>> + Send
where
    S: Stream<Item = Result<T, ModelError>> + Send + 'static,
    T: Send + 'static,
{
    async_stream::stream! {
        let mut inner = Box::pin(stream);
        loop {
            tokio::select! {
                biased;
                _ = signal.aborted() => {
                    yield Err(ModelError::Aborted);
                    break;
                }
                item = inner.next() => {
                    let Some(item) = item else { break };
                    yield item;
                }
            }
        }
    }
}
