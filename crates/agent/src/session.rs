//! Conversation sessions: short rolling history per user.
//!
//! Only the last `max_history` exchanges are kept. They are rendered as
//! plain `User:` / `Assistant:` lines and handed to the orchestrator as
//! prior conversation for the system prompt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Exchange {
    question: String,
    answer: String,
}

pub struct SessionManager {
    max_history: usize,
    counter: AtomicU64,
    sessions: RwLock<HashMap<String, Vec<Exchange>>>,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            counter: AtomicU64::new(0),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new empty session and return its id (`session_1`, `session_2`, ...).
    pub async fn create_session(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("session_{n}");
        self.sessions.write().await.insert(id.clone(), Vec::new());
        debug!(session_id = %id, "Created session");
        id
    }

    /// Record a question and its answer, dropping the oldest beyond the limit.
    ///
    /// An unknown id starts a new session under that id.
    pub async fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut sessions = self.sessions.write().await;
        let exchanges = sessions.entry(session_id.to_string()).or_default();
        exchanges.push(Exchange {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        if exchanges.len() > self.max_history {
            let excess = exchanges.len() - self.max_history;
            exchanges.drain(..excess);
        }
    }

    /// Rendered history for `session_id`, or `None` when there is nothing to show.
    pub async fn history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let exchanges = sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }
        let lines: Vec<String> = exchanges
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.question, e.answer))
            .collect();
        Some(lines.join("\n"))
    }

    pub async fn clear_session(&self, session_id: &str) {
        if let Some(exchanges) = self.sessions.write().await.get_mut(session_id) {
            exchanges.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_ids_are_sequential() {
        let manager = SessionManager::new(2);
        assert_eq!(manager.create_session().await, "session_1");
        assert_eq!(manager.create_session().await, "session_2");
    }

    #[tokio::test]
    async fn new_session_has_no_history() {
        let manager = SessionManager::new(2);
        let id = manager.create_session().await;
        assert!(manager.history(&id).await.is_none());
        assert!(manager.history("nope").await.is_none());
    }

    #[tokio::test]
    async fn history_renders_exchanges() {
        let manager = SessionManager::new(2);
        let id = manager.create_session().await;
        manager.add_exchange(&id, "What is MCP?", "A protocol.").await;

        assert_eq!(
            manager.history(&id).await.unwrap(),
            "User: What is MCP?\nAssistant: A protocol."
        );
    }

    #[tokio::test]
    async fn keeps_only_recent_exchanges() {
        let manager = SessionManager::new(2);
        let id = manager.create_session().await;
        manager.add_exchange(&id, "q1", "a1").await;
        manager.add_exchange(&id, "q2", "a2").await;
        manager.add_exchange(&id, "q3", "a3").await;

        let history = manager.history(&id).await.unwrap();
        assert!(!history.contains("q1"));
        assert_eq!(history, "User: q2\nAssistant: a2\nUser: q3\nAssistant: a3");
    }

    #[tokio::test]
    async fn zero_history_remembers_nothing() {
        let manager = SessionManager::new(0);
        let id = manager.create_session().await;
        manager.add_exchange(&id, "q", "a").await;
        assert!(manager.history(&id).await.is_none());
    }

    #[tokio::test]
    async fn clear_session_forgets_history() {
        let manager = SessionManager::new(2);
        manager.add_exchange("custom", "q", "a").await;
        assert!(manager.history("custom").await.is_some());
        manager.clear_session("custom").await;
        assert!(manager.history("custom").await.is_none());
    }
}
