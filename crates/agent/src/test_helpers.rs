//! Shared test helpers: a scripted provider and canned tools.

use async_trait::async_trait;
use scoutclaw_core::error::{ProviderError, ToolError};
use scoutclaw_core::message::Message;
use scoutclaw_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Once the script runs out, a repeating provider keeps
/// returning its last entry; any other provider panics.
pub struct SequentialMockProvider {
    responses: Vec<Result<ProviderResponse, ProviderError>>,
    repeat_last: bool,
    call_count: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses,
            repeat_last: false,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script plain-text replies, one per call.
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    /// Reply with the same text forever.
    pub fn repeating(text: &str) -> Self {
        let mut provider = Self::from_texts(&[text]);
        provider.repeat_last = true;
        provider
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        let mut provider = Self::new(vec![Err(error)]);
        provider.repeat_last = true;
        provider
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);

        let entry = match self.responses.get(index) {
            Some(entry) => entry,
            None if self.repeat_last && !self.responses.is_empty() => {
                &self.responses[self.responses.len() - 1]
            }
            None => panic!(
                "SequentialMockProvider: no more responses (call #{index}, have {})",
                self.responses.len()
            ),
        };
        entry.clone()
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A tool that always returns the same envelope and records its calls.
pub struct StaticTool {
    name: String,
    result: ToolResult,
    calls: Arc<AtomicUsize>,
    seen_args: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl StaticTool {
    pub fn succeeding(name: &str, data: serde_json::Value) -> Self {
        Self::with_result(name, ToolResult::success(data))
    }

    pub fn failing(name: &str, error: &str) -> Self {
        Self::with_result(name, ToolResult::failure(error))
    }

    fn with_result(name: &str, result: ToolResult) -> Self {
        Self {
            name: name.into(),
            result,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn seen_args(&self) -> Arc<Mutex<Vec<serde_json::Value>>> {
        self.seen_args.clone()
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a canned result."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_args
            .lock()
            .unwrap()
            .push(serde_json::Value::Object(args.clone()));
        Ok(self.result.clone())
    }
}

/// A tool that panics when executed.
pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "boom"
    }

    fn description(&self) -> &str {
        "Always panics."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn execute(&self, _args: &ToolArgs) -> Result<ToolResult, ToolError> {
        panic!("tool exploded")
    }
}
