//! # Callflow - execution pipeline for generative model calls
//!
//! Callflow runs text, structured output, tool call and embedding requests
//! against provider adapters and handles everything around the request:
//! retries, throttling, lifecycle events, cancellation and incremental
//! extraction of streamed results.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Capability Traits**: adapters implement [`traits::Model`] plus one trait per supported operation.
//! - **Retry + Throttle**: [`ApiConfiguration`] wraps provider requests with backoff and admission control.
//! - **Lifecycle Events**: every call emits exactly one `started` and one `finished` [`FunctionEvent`].
//! - **Runs**: calls sharing a [`Run`] share correlation ids, an abort signal and error handling.
//! - **Streaming**: whitespace-aware text accumulation and partial JSON parsing for structured streams.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use callflow::prelude::*;
//!
//! async fn summarize<M>(model: &M, prompt: &M::Prompt) -> Result<String, ModelError>
//! where
//!     M: TextGenerationModel,
//! {
//!     let run = Run::builder().session_id("session-1").build();
//!     let options = FunctionOptions::new()
//!         .with_run(run)
//!         .with_logging(FunctionLogging::BasicText);
//!
//!     let response = generate_text(model, prompt, &options).await?;
//!     Ok(response.value)
//! }
//! ```

pub mod api_configuration;
pub mod error;
pub mod execution;
pub mod functions;
pub mod observability;
pub mod retry;
pub mod run;
pub mod streaming;
pub mod throttle;
pub mod traits;
pub mod types;
pub mod utils;

pub use api_configuration::{ApiConfiguration, ApiConfigurationConfig, RetryConfig, ThrottleConfig};
pub use error::{ErrorCategory, ModelError, Result};
pub use execution::{
    DeltaProcessor, ModelStream, StreamCompletion, StreamResult, execute_standard_call, execute_stream_call,
};
pub use functions::{
    StructureStreamPart, embed, embed_many, generate_structure, generate_text, generate_tool_call,
    stream_structure, stream_text,
};
pub use observability::{
    ChannelObserver, Environment, EventBus, EventRecorder, FunctionEvent, FunctionLogging, FunctionObserver,
    ModelCallResult, observer_fn,
};
pub use retry::{RetryDecision, RetryPolicy, RetryThrottleExecutor};
pub use run::{FunctionOptions, Run};
pub use throttle::{MaxConcurrency, RateLimit, ThrottleOff, ThrottlePolicy};
pub use utils::cancel::AbortSignal;

/// Convenient imports
pub mod prelude {
    pub use crate::api_configuration::ApiConfiguration;
    pub use crate::error::{ModelError, Result};
    pub use crate::execution::ModelStream;
    pub use crate::functions::*;
    pub use crate::observability::{Environment, FunctionEvent, FunctionLogging, FunctionObserver, observer_fn};
    pub use crate::retry::RetryPolicy;
    pub use crate::run::{FunctionOptions, Run};
    pub use crate::throttle::{MaxConcurrency, RateLimit, ThrottleOff, ThrottlePolicy};
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use crate::utils::cancel::AbortSignal;
}
