//! # Coursewise Core
//!
//! Domain types, traits, and error definitions for the Coursewise
//! course-materials assistant. This crate has **no transport dependencies**:
//! it defines the seams that the provider, tool, and agent crates implement
//! against.
//!
//! ## Seams
//!
//! - [`Provider`]: the black-box LLM call (final answer or tool-use directive)
//! - [`Tool`] and [`ToolRegistry`]: named capabilities the model may invoke
//! - [`CourseStore`]: the vector-similarity backend behind course search
//! - [`EventBus`]: fire-and-forget domain events for observers

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{ContentBlock, Conversation, ConversationId, Message, MessageContent, Role};
pub use provider::{
    Provider, ProviderRequest, ProviderResponse, StopReason, ToolChoice, ToolDefinition, Usage,
};
pub use store::{CourseHit, CourseStore, SearchFilter};
pub use tool::{Tool, ToolRegistry};
