//! Shared test helpers for orchestrator and assistant tests.

use coursewise_core::error::{ProviderError, ToolError};
use coursewise_core::message::ContentBlock;
use coursewise_core::provider::{
    Provider, ProviderRequest, ProviderResponse, StopReason, Usage,
};
use coursewise_core::tool::Tool;
use std::sync::Mutex;

/// A provider that replays scripted responses and records every request.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Calls that offered the model a tool choice.
    pub fn tool_offering_calls(&self) -> usize {
        self.requests().iter().filter(|r| r.offers_tools()).count()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        if responses.is_empty() {
            panic!("ScriptedProvider: no more responses (call #{call})");
        }
        responses.remove(0)
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        input_tokens: 10,
        output_tokens: 5,
    })
}

/// A final text answer.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
        usage: usage(),
        model: "scripted-model".into(),
    }
}

/// A tool-use response with one block per `(id, name, input)`.
pub fn tool_use_response(calls: Vec<(&str, &str, serde_json::Value)>) -> ProviderResponse {
    ProviderResponse {
        content: calls
            .into_iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.into(),
                name: name.into(),
                input,
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        usage: usage(),
        model: "scripted-model".into(),
    }
}

/// Convenience for a single `search` call with the given query.
pub fn search_call(id: &str, query: &str) -> ProviderResponse {
    tool_use_response(vec![(id, "search", serde_json::json!({"query": query}))])
}

/// Answers each query from a fixed table and remembers one source per hit.
pub struct LookupTool {
    pub name: &'static str,
    pub answers: Vec<(&'static str, String)>,
    pub sources: Mutex<Vec<String>>,
}

impl LookupTool {
    pub fn new(name: &'static str, answers: Vec<(&'static str, String)>) -> Self {
        Self {
            name,
            answers,
            sources: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Tool for LookupTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Looks up canned answers"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        let answer = self
            .answers
            .iter()
            .find(|(q, _)| *q == query)
            .map(|(_, a)| a.clone())
            .unwrap_or_else(|| "No relevant content found.".into());
        self.sources
            .lock()
            .unwrap()
            .push(format!("Source for {query}"));
        Ok(answer)
    }

    fn last_sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }

    fn reset_sources(&self) {
        self.sources.lock().unwrap().clear();
    }
}

/// A tool whose every execution fails with `reason`.
pub struct FailingTool {
    pub name: &'static str,
    pub reason: &'static str,
}

#[async_trait::async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: self.name.into(),
            reason: self.reason.into(),
        })
    }
}
