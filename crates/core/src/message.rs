//! Message and Conversation domain types.
//!
//! A conversation is owned by exactly one orchestration run: it starts with
//! the user's query and grows by appending assistant turns and tool-result
//! turns. Nothing here is persisted across queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (one orchestration run).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
///
/// Tool results travel back to the model as `User` messages made of
/// `tool_result` blocks, so there is no separate tool role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (and tool results returned on their behalf)
    User,
    /// The AI assistant
    Assistant,
}

/// A structured block of message content, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },

    /// A request from the model to invoke a tool.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// The outcome of a tool invocation, keyed by the request id.
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// A successful tool result.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// A tool result flagged as an error so the model sees the call failed.
    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult { .. })
    }
}

/// Message content: either a bare string or a list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// Text or structured content
    pub content: MessageContent,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with(role: Role, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with(Role::User, MessageContent::Text(content.into()))
    }

    /// Create a new plain-text assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with(Role::Assistant, MessageContent::Text(content.into()))
    }

    /// Create an assistant message carrying the model's raw content blocks.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::with(Role::Assistant, MessageContent::Blocks(blocks))
    }

    /// Create a single user-role message holding all tool results of a round.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self::with(Role::User, MessageContent::Blocks(results))
    }

    /// The text parts of this message joined by newlines, if there are any.
    pub fn text(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks.iter().filter_map(ContentBlock::as_text).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
        }
    }

    /// Whether this message carries at least one tool-result block.
    pub fn has_tool_results(&self) -> bool {
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Blocks(blocks) => blocks.iter().any(ContentBlock::is_tool_result),
        }
    }
}

/// The ordered messages of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Start a conversation holding only the user's query.
    pub fn starting_with(query: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Message::user(query));
        conversation
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether the most recent message is a tool-result message.
    pub fn ends_with_tool_results(&self) -> bool {
        self.last().is_some_and(|m| m.role == Role::User && m.has_tool_results())
    }

    /// Text of the most recent assistant message that has any.
    pub fn last_assistant_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .find_map(Message::text)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
