//! Scripted model adapter shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use callflow::prelude::*;
use serde_json::{Value, json};

/// Adapter whose behavior is fully scripted by the test.
pub struct MockModel {
    pub api: ApiConfiguration,
    /// Outcome of each successive attempt; the fallback applies once empty.
    pub script: Mutex<VecDeque<Result<String, ModelError>>>,
    pub fallback: String,
    /// Time every attempt takes.
    pub latency: Duration,
    pub attempts: AtomicU32,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    /// Fragments yielded by the streaming capabilities.
    pub fragments: Vec<String>,
    pub fragment_delay: Duration,
    /// Yield this error instead of the fragment at the given index.
    pub stream_error_at: Option<(usize, ModelError)>,
    pub tool_call: Option<ToolCall>,
    pub max_values_per_call: Option<usize>,
    pub embed_batches: Mutex<Vec<usize>>,
    pub trim_whitespace: bool,
    pub observers: Vec<Arc<dyn FunctionObserver>>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self {
            api: ApiConfiguration::new(RetryPolicy::Never, Arc::new(ThrottleOff)),
            script: Mutex::new(VecDeque::new()),
            fallback: "ok".to_string(),
            latency: Duration::ZERO,
            attempts: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            fragments: Vec::new(),
            fragment_delay: Duration::ZERO,
            stream_error_at: None,
            tool_call: None,
            max_values_per_call: None,
            embed_batches: Mutex::new(Vec::new()),
            trim_whitespace: true,
            observers: Vec::new(),
        }
    }
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self {
            fallback: text.to_string(),
            ..Default::default()
        }
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_script(self, script: Vec<Result<String, ModelError>>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub fn with_api(mut self, api: ApiConfiguration) -> Self {
        self.api = api;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn attempt(&self) -> Result<String, ModelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn text_response(&self, options: &FunctionOptions) -> Result<GenerateResponse<String>, ModelError> {
        let text = self.api.execute(options.abort_signal(), || self.attempt()).await?;
        Ok(GenerateResponse::new(json!({ "text": text }), text).with_usage(Usage::new(10, 5)))
    }

    fn delta_stream(&self) -> DeltaStream<String> {
        let fragments = self.fragments.clone();
        let delay = self.fragment_delay;
        let error_at = self.stream_error_at.clone();
        Box::pin(async_stream::stream! {
            let mut full = String::new();
            for (index, fragment) in fragments.into_iter().enumerate() {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if let Some((at, error)) = &error_at && *at == index {
                    yield Err(error.clone());
                    continue;
                }
                full.push_str(&fragment);
                yield Ok(Delta::new(
                    json!({ "delta": fragment }),
                    json!({ "text": full }),
                    Some(fragment),
                ));
            }
        })
    }
}

impl Model for MockModel {
    fn model_information(&self) -> ModelInformation {
        ModelInformation::new("mock", "mock-model-1")
    }

    fn settings_for_event(&self) -> Value {
        json!({ "temperature": 0.0 })
    }

    fn observers(&self) -> Vec<Arc<dyn FunctionObserver>> {
        self.observers.clone()
    }
}

#[async_trait]
impl TextGenerationModel for MockModel {
    type Prompt = String;

    async fn do_generate_text(
        &self,
        _prompt: &String,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<String>, ModelError> {
        self.text_response(&options).await
    }
}

#[async_trait]
impl TextStreamingModel for MockModel {
    type Prompt = String;

    async fn do_stream_text(&self, _prompt: &String, options: FunctionOptions) -> Result<DeltaStream<String>, ModelError> {
        self.api.execute(options.abort_signal(), || self.attempt()).await?;
        Ok(self.delta_stream())
    }

    fn trim_whitespace(&self) -> bool {
        self.trim_whitespace
    }
}

#[async_trait]
impl StructureGenerationModel for MockModel {
    type Prompt = String;

    async fn do_generate_structure(
        &self,
        _schema: &Value,
        _prompt: &String,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<String>, ModelError> {
        self.text_response(&options).await
    }
}

#[async_trait]
impl StructureStreamingModel for MockModel {
    type Prompt = String;

    async fn do_stream_structure(
        &self,
        _schema: &Value,
        _prompt: &String,
        options: FunctionOptions,
    ) -> Result<DeltaStream<String>, ModelError> {
        self.api.execute(options.abort_signal(), || self.attempt()).await?;
        Ok(self.delta_stream())
    }
}

#[async_trait]
impl ToolCallGenerationModel for MockModel {
    type Prompt = String;

    async fn do_generate_tool_call(
        &self,
        tool: &ToolDefinition,
        _prompt: &String,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<Option<ToolCall>>, ModelError> {
        self.api.execute(options.abort_signal(), || self.attempt()).await?;
        Ok(GenerateResponse::new(
            json!({ "tool": tool.name, "call": self.tool_call }),
            self.tool_call.clone(),
        ))
    }
}

#[async_trait]
impl EmbeddingModel for MockModel {
    type Value = String;

    async fn do_embed_values(
        &self,
        values: &[String],
        _options: FunctionOptions,
    ) -> Result<GenerateResponse<Vec<Vec<f32>>>, ModelError> {
        self.embed_batches.lock().unwrap().push(values.len());
        let embeddings = values.iter().map(|v| vec![v.len() as f32, 1.0]).collect();
        Ok(GenerateResponse::new(json!({ "count": values.len() }), embeddings).with_usage(Usage::new(values.len() as u32, 0)))
    }

    fn max_values_per_call(&self) -> Option<usize> {
        self.max_values_per_call
    }
}

/// Environment with no observers and logging off, isolated from the
/// process-wide one.
pub fn quiet_environment() -> Arc<Environment> {
    Arc::new(Environment::default())
}

/// Options recording every event into `recorder`.
pub fn recorded_options(recorder: &Arc<callflow::EventRecorder>) -> FunctionOptions {
    FunctionOptions::new()
        .with_observer(recorder.clone())
        .with_environment(quiet_environment())
}
