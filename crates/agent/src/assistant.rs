//! The course assistant: the query entry point used by front ends.
//!
//! Wraps the orchestrator with session history and source attribution.
//! The tool registry is shared by every query, so the reset, run, and
//! read of sources happen under one lock: sources reported for a query
//! always come from that query.

use coursewise_config::AppConfig;
use coursewise_core::provider::Provider;
use coursewise_core::tool::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::orchestrator::{Orchestrator, RunExit};
use crate::round_tracker::TrackerSummary;
use crate::session::SessionManager;

#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<String>,
    pub session_id: String,
    pub exit: RunExit,
    pub summary: TrackerSummary,
}

pub struct CourseAssistant {
    orchestrator: Orchestrator,
    tools: Arc<ToolRegistry>,
    sessions: SessionManager,
    max_tool_rounds: u32,
    query_lock: Mutex<()>,
}

impl CourseAssistant {
    pub fn new(orchestrator: Orchestrator, tools: Arc<ToolRegistry>, max_history: usize) -> Self {
        Self {
            orchestrator,
            tools,
            sessions: SessionManager::new(max_history),
            max_tool_rounds: crate::orchestrator::DEFAULT_MAX_TOOL_ROUNDS,
            query_lock: Mutex::new(()),
        }
    }

    /// Build from configuration: model, sampling, round budget, and history size.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let orchestrator = Orchestrator::new(provider, config.model.clone())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        Self::new(orchestrator, tools, config.max_history).with_max_tool_rounds(config.max_tool_rounds)
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Answer a question about the course materials.
    ///
    /// Without a `session_id` a new session is opened; the returned answer
    /// names the session so follow-up questions can reuse it.
    pub async fn query(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> coursewise_core::Result<QueryAnswer> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session().await,
        };
        let history = self.sessions.history(&session_id).await;
        let prompt = format!("Answer this question about course materials: {query}");

        let (outcome, sources) = {
            let _guard = self.query_lock.lock().await;
            self.tools.reset_sources();
            let outcome = self
                .orchestrator
                .run(
                    &prompt,
                    history.as_deref(),
                    Some(self.tools.as_ref()),
                    self.max_tool_rounds,
                )
                .await?;
            let sources = self.tools.last_sources();
            self.tools.reset_sources();
            (outcome, sources)
        };

        self.sessions
            .add_exchange(&session_id, query, &outcome.answer)
            .await;

        info!(
            session_id = %session_id,
            sources = sources.len(),
            exit = ?outcome.exit,
            "Query answered"
        );

        Ok(QueryAnswer {
            answer: outcome.answer,
            sources,
            session_id,
            exit: outcome.exit,
            summary: outcome.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn assistant(provider: Arc<ScriptedProvider>) -> CourseAssistant {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(LookupTool::new(
            "search",
            vec![("MCP", "MCP connects models to tools".to_string())],
        )));
        CourseAssistant::new(
            Orchestrator::new(provider, "test-model"),
            Arc::new(registry),
            2,
        )
    }

    #[tokio::test]
    async fn wraps_query_and_reports_sources() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            search_call("t1", "MCP"),
            text_response("MCP is a protocol."),
        ]));
        let assistant = assistant(provider.clone());

        let answer = assistant.query("What is MCP?", None).await.unwrap();

        assert_eq!(answer.answer, "MCP is a protocol.");
        assert_eq!(answer.sources, vec!["Source for MCP"]);
        assert_eq!(answer.session_id, "session_1");

        let first = &provider.requests()[0];
        assert_eq!(
            first.messages[0].text().as_deref(),
            Some("Answer this question about course materials: What is MCP?")
        );
    }

    #[tokio::test]
    async fn sources_do_not_leak_between_queries() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            search_call("t1", "MCP"),
            text_response("first"),
            text_response("second, no search"),
        ]));
        let assistant = assistant(provider);

        let first = assistant.query("What is MCP?", None).await.unwrap();
        assert_eq!(first.sources.len(), 1);

        let second = assistant.query("Hello", None).await.unwrap();
        assert!(second.sources.is_empty());
    }

    #[tokio::test]
    async fn follow_up_sees_session_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("Lesson 1 covers setup."),
            text_response("Lesson 2 covers tools."),
        ]));
        let assistant = assistant(provider.clone());

        let first = assistant.query("What is in lesson 1?", None).await.unwrap();
        assistant
            .query("And lesson 2?", Some(&first.session_id))
            .await
            .unwrap();

        let second = &provider.requests()[1];
        assert!(second.system.contains(
            "Previous conversation:\nUser: What is in lesson 1?\nAssistant: Lesson 1 covers setup."
        ));
    }

    #[tokio::test]
    async fn from_config_applies_round_budget() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("direct")]));
        let config = AppConfig {
            max_tool_rounds: 0,
            ..AppConfig::default()
        };
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(LookupTool::new("search", vec![])));
        let assistant = CourseAssistant::from_config(&config, provider.clone(), Arc::new(registry));

        let answer = assistant.query("q", None).await.unwrap();
        assert_eq!(answer.exit, RunExit::Direct);
        assert_eq!(provider.requests()[0].model, "claude-sonnet-4-20250514");
        assert_eq!(provider.requests()[0].max_tokens, Some(800));
    }
}
