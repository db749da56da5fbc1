//! The sequential tool-calling orchestrator.
//!
//! One run answers one query:
//!
//! 1. **AwaitingModel**: start a round, call the model with tools offered
//! 2. **ExecutingTools**: run every requested tool, fold results into context
//! 3. Loop to 1 while the round budget allows
//! 4. **Synthesizing**: budget spent after a tool round, make one tool-free call
//! 5. **Done**: return the model's text
//!
//! The conversation, tracker, and accumulated context belong to a single
//! run and are dropped when it returns. Only the tool registry is shared.

use chrono::Utc;
use coursewise_core::event::{DomainEvent, EventBus};
use coursewise_core::message::{ContentBlock, Conversation, Message};
use coursewise_core::provider::{
    Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition,
};
use coursewise_core::tool::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::context::{
    AccumulatedContext, ContextEntry, SYSTEM_PROMPT, ToolExecution, enriched_system_prompt,
    synthesis_system_prompt, with_history,
};
use crate::round_tracker::{RoundTracker, TrackerSummary};

/// Returned when no call produced usable text.
pub const FALLBACK_RESPONSE: &str = "I apologize, but I couldn't generate a proper response.";

/// Default rounds per query.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 2;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    AwaitingModel,
    ExecutingTools,
    Synthesizing,
    Done,
}

/// How a run produced its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunExit {
    /// No tools were offered; a single call answered.
    Direct,
    /// The model answered inside a round without asking for a tool.
    Answered,
    /// The round budget ran out and a tool-free call synthesized the answer.
    Synthesized,
    /// Neither path applied; last assistant text or the apology.
    Fallback,
}

/// The answer plus what it took to get there.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub answer: String,
    pub exit: RunExit,
    pub summary: TrackerSummary,
    pub context: Vec<ContextEntry>,
}

/// Mutable state of one run.
struct RunState {
    conversation: Conversation,
    tracker: RoundTracker,
    context: AccumulatedContext,
    system: String,
    phase: Phase,
}

impl RunState {
    fn new(query: &str, history: Option<&str>, max_tool_rounds: u32) -> Self {
        Self {
            conversation: Conversation::starting_with(query),
            tracker: RoundTracker::new(max_tool_rounds),
            context: AccumulatedContext::new(),
            system: with_history(SYSTEM_PROMPT, history),
            phase: Phase::AwaitingModel,
        }
    }

    fn enter(&mut self, next: Phase) {
        debug!(
            conversation_id = %self.conversation.id,
            round = self.tracker.current_round(),
            from = ?self.phase,
            to = ?next,
            "Phase transition"
        );
        self.phase = next;
    }

    fn finish(mut self, answer: String, exit: RunExit) -> RunOutcome {
        self.enter(Phase::Done);
        let summary = self.tracker.summary();
        info!(
            conversation_id = %self.conversation.id,
            exit = ?exit,
            rounds = summary.total_rounds,
            tool_calls = summary.total_calls,
            failed_calls = summary.failed_calls,
            "Run finished"
        );
        RunOutcome {
            answer,
            exit,
            summary,
            context: self.context.into_entries(),
        }
    }
}

/// Drives bounded, multi-round tool use against a provider.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    event_bus: Option<Arc<EventBus>>,
}

impl Orchestrator {
    /// Create an orchestrator with deterministic sampling and 800 max tokens.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 800,
            event_bus: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Publish round and tool events to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `query`, returning only the text.
    ///
    /// Without a non-empty registry, or with `max_tool_rounds == 0`, this is
    /// one direct model call with nothing offered.
    pub async fn generate_response(
        &self,
        query: &str,
        conversation_history: Option<&str>,
        tools: Option<&ToolRegistry>,
        max_tool_rounds: u32,
    ) -> coursewise_core::Result<String> {
        self.run(query, conversation_history, tools, max_tool_rounds)
            .await
            .map(|outcome| outcome.answer)
    }

    /// Answer `query` and report how the run went.
    ///
    /// Tool failures become error-flagged tool results. A failed model call
    /// ends the run with an error.
    pub async fn run(
        &self,
        query: &str,
        conversation_history: Option<&str>,
        tools: Option<&ToolRegistry>,
        max_tool_rounds: u32,
    ) -> coursewise_core::Result<RunOutcome> {
        let mut state = RunState::new(query, conversation_history, max_tool_rounds);

        let registry = match tools {
            Some(registry) if !registry.is_empty() && max_tool_rounds > 0 => registry,
            _ => {
                debug!(conversation_id = %state.conversation.id, "No tool rounds, answering directly");
                let system = state.system.clone();
                let response = self
                    .call(&state.conversation, system, Vec::new(), None)
                    .await?;
                return Ok(state.finish(response.text(), RunExit::Direct));
            }
        };
        let definitions = registry.definitions();

        while state.tracker.can_start_round() {
            let round = state.tracker.start_round();
            self.publish(|| DomainEvent::RoundStarted {
                conversation_id: state.conversation.id.to_string(),
                round,
                max_rounds: max_tool_rounds,
                timestamp: Utc::now(),
            });

            let system = enriched_system_prompt(&state.system, &state.context, round, max_tool_rounds);
            let response = self
                .call(
                    &state.conversation,
                    system,
                    definitions.clone(),
                    Some(ToolChoice::Auto),
                )
                .await?;
            state
                .conversation
                .push(Message::assistant_blocks(response.content.clone()));

            if !response.requests_tool_use() {
                return Ok(state.finish(response.text(), RunExit::Answered));
            }

            state.enter(Phase::ExecutingTools);
            let (results, executions) = self
                .execute_tools(registry, &response, &mut state.tracker, round)
                .await;

            if results.is_empty() {
                warn!(
                    conversation_id = %state.conversation.id,
                    round,
                    "Tool use requested but no tool calls found, abandoning rounds"
                );
                break;
            }

            state.conversation.push(Message::tool_results(results));
            state.context.push(ContextEntry::new(round, executions));
            state.enter(Phase::AwaitingModel);
        }

        if state.conversation.ends_with_tool_results() {
            state.enter(Phase::Synthesizing);
            self.publish(|| DomainEvent::SynthesisStarted {
                conversation_id: state.conversation.id.to_string(),
                rounds: state.tracker.current_round(),
                timestamp: Utc::now(),
            });

            let system = synthesis_system_prompt(&state.system, &state.context);
            let response = self.call(&state.conversation, system, Vec::new(), None).await?;
            return Ok(state.finish(response.text(), RunExit::Synthesized));
        }

        let answer = state
            .conversation
            .last_assistant_text()
            .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());
        warn!(conversation_id = %state.conversation.id, "Falling back to last assistant text");
        Ok(state.finish(answer, RunExit::Fallback))
    }

    /// Run every tool-use block of `response` and collect one result each.
    ///
    /// Calls are independent: a failure is recorded and the rest still run.
    async fn execute_tools(
        &self,
        registry: &ToolRegistry,
        response: &ProviderResponse,
        tracker: &mut RoundTracker,
        round: u32,
    ) -> (Vec<ContentBlock>, Vec<ToolExecution>) {
        let mut results = Vec::new();
        let mut executions = Vec::new();

        for (id, name, input) in response.tool_uses() {
            debug!(round, tool = %name, "Executing tool");
            let start = Instant::now();
            let outcome = registry.execute(name, input).await;
            let duration = start.elapsed();

            let success = outcome.is_ok();
            match outcome {
                Ok(output) => {
                    tracker.log_call(name, input, duration, true, None);
                    results.push(ContentBlock::tool_result(id, output.clone()));
                    executions.push(ToolExecution::succeeded(name, input.clone(), output, duration));
                }
                Err(e) => {
                    warn!(round, tool = %name, error = %e, "Tool execution failed");
                    let message = format!("Tool execution failed: {e}");
                    tracker.log_call(name, input, duration, false, Some(message.clone()));
                    results.push(ContentBlock::tool_error(id, message.clone()));
                    executions.push(ToolExecution::failed(
                        name,
                        input.clone(),
                        message,
                        e.to_string(),
                        duration,
                    ));
                }
            }

            self.publish(|| DomainEvent::ToolExecuted {
                round,
                tool_name: name.to_string(),
                success,
                duration_ms: duration.as_millis() as u64,
                timestamp: Utc::now(),
            });
        }

        (results, executions)
    }

    async fn call(
        &self,
        conversation: &Conversation,
        system: String,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
    ) -> coursewise_core::Result<ProviderResponse> {
        let request = ProviderRequest {
            model: self.model.clone(),
            system,
            messages: conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tools,
            tool_choice,
        };

        debug!(
            conversation_id = %conversation.id,
            provider = %self.provider.name(),
            messages = request.messages.len(),
            offers_tools = request.offers_tools(),
            "Calling model"
        );

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            self.publish(|| DomainEvent::ResponseGenerated {
                conversation_id: conversation.id.to_string(),
                model: response.model.clone(),
                tokens_used: usage.total(),
                timestamp: Utc::now(),
            });
        }

        Ok(response)
    }

    fn publish(&self, event: impl FnOnce() -> DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event());
        }
    }
}
