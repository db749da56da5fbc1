//! Tool trait: the abstraction over assistant capabilities.
//!
//! Tools are what let the model reach outside the conversation, most
//! importantly to search course materials. A tool may also remember the
//! sources behind its most recent results so answers can be attributed.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The core Tool trait.
///
/// Tools are registered once in a [`ToolRegistry`] at startup and shared by
/// every query afterwards, so per-query state (sources) must be interior.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search_course_content").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given keyword arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError>;

    /// Attribution strings for the most recent execution.
    ///
    /// Tools that do not track sources keep the default.
    fn last_sources(&self) -> Vec<String> {
        Vec::new()
    }

    /// Forget the sources of earlier executions.
    fn reset_sources(&self) {}

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, kept in registration order.
///
/// Registering a name that already exists replaces the earlier tool in place:
/// the last write wins and the earlier position in [`definitions`] is kept.
///
/// [`definitions`]: ToolRegistry::definitions
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => {
                debug!(tool = %tool.name(), "Replacing registered tool");
                self.tools[index] = tool;
            }
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Tool definitions in registration order (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name.
    ///
    /// An unknown name is not an error: the returned text says the tool was
    /// not found, so the model can read it as tool output and adapt. Errors
    /// raised by the tool itself are passed through untouched; timing and
    /// logging them is the caller's job.
    pub async fn execute(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        match self.get(name) {
            Some(tool) => tool.execute(arguments.clone()).await,
            None => {
                debug!(tool = %name, "Requested tool is not registered");
                Ok(format!("Tool '{name}' not found"))
            }
        }
    }

    /// Sources gathered by every source-tracking tool, in registration order.
    pub fn last_sources(&self) -> Vec<String> {
        self.tools.iter().flat_map(|t| t.last_sources()).collect()
    }

    /// Clear the tracked sources of every registered tool.
    pub fn reset_sources(&self) {
        for tool in &self.tools {
            tool.reset_sources();
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
