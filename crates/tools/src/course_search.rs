//! Course search tool: semantic search over course materials.
//!
//! Wraps a [`CourseStore`] and renders hits as labelled text blocks the
//! model can quote from. Remembers the attribution of its latest hits so
//! the assistant can list sources next to the answer.

use async_trait::async_trait;
use coursewise_core::error::ToolError;
use coursewise_core::store::{CourseHit, CourseStore, SearchFilter};
use coursewise_core::tool::Tool;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const TOOL_NAME: &str = "search_course_content";

pub struct CourseSearchTool {
    store: Arc<dyn CourseStore>,
    last_sources: Mutex<Vec<String>>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self {
            store,
            last_sources: Mutex::new(Vec::new()),
        }
    }

    fn parse_filter(arguments: &serde_json::Value) -> Result<SearchFilter, ToolError> {
        let course_name = match &arguments["course_name"] {
            serde_json::Value::Null => None,
            serde_json::Value::String(name) => Some(name.clone()),
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "'course_name' must be a string, got {other}"
                )));
            }
        };

        let lesson_number = match &arguments["lesson_number"] {
            serde_json::Value::Null => None,
            value => {
                let n = value.as_u64().ok_or_else(|| {
                    ToolError::InvalidArguments(format!(
                        "'lesson_number' must be a non-negative integer, got {value}"
                    ))
                })?;
                Some(u32::try_from(n).map_err(|_| {
                    ToolError::InvalidArguments(format!("'lesson_number' {n} is out of range"))
                })?)
            }
        };

        Ok(SearchFilter {
            course_name,
            lesson_number,
        })
    }

    fn set_sources(&self, sources: Vec<String>) {
        if let Ok(mut guard) = self.last_sources.lock() {
            *guard = sources;
        }
    }
}

/// Render hits as `[Course - Lesson N]\ncontent` blocks separated by blank lines.
fn format_hits(hits: &[CourseHit]) -> String {
    hits.iter()
        .map(|hit| format!("[{}]\n{}", hit.label(), hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn no_results_message(filter: &SearchFilter) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = &filter.course_name {
        message.push_str(&format!(" in course '{course}'"));
    }
    if let Some(lesson) = filter.lesson_number {
        message.push_str(&format!(" in lesson {lesson}"));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the course content"
                },
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                },
                "lesson_number": {
                    "type": "integer",
                    "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let filter = Self::parse_filter(&arguments)?;

        let hits = self
            .store
            .search(query, &filter)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: TOOL_NAME.into(),
                reason: e.to_string(),
            })?;

        debug!(
            store = %self.store.name(),
            query,
            hits = hits.len(),
            "Course search finished"
        );

        // Sources from an earlier hit survive an empty search
        if hits.is_empty() {
            return Ok(no_results_message(&filter));
        }

        self.set_sources(hits.iter().map(CourseHit::label).collect());
        Ok(format_hits(&hits))
    }

    fn last_sources(&self) -> Vec<String> {
        self.last_sources
            .lock()
            .map(|sources| sources.clone())
            .unwrap_or_default()
    }

    fn reset_sources(&self) {
        self.set_sources(Vec::new());
    }
}
