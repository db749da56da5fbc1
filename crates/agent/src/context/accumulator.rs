//! Accumulated context: the per-run digest of earlier rounds.
//!
//! Each completed round adds one [`ContextEntry`]. Entries are never edited
//! after they are pushed. The digest rendered from them is what later
//! prompts see, so every tool result is cut to a fixed preview length at
//! render time while the stored result stays whole.

use serde::Serialize;
use std::time::Duration;

/// Characters of a tool result kept in the digest.
pub const RESULT_PREVIEW_CHARS: usize = 300;

const TRUNCATION_MARKER: &str = "...";

/// One tool call as remembered for later rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExecution {
    pub tool_name: String,
    pub input: serde_json::Value,
    /// Tool output on success, the error-flagged result text on failure.
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
    pub duration: Duration,
}

impl ToolExecution {
    pub fn succeeded(
        tool_name: impl Into<String>,
        input: serde_json::Value,
        result: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
            result: result.into(),
            error: None,
            success: true,
            duration,
        }
    }

    pub fn failed(
        tool_name: impl Into<String>,
        input: serde_json::Value,
        result: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
            result: result.into(),
            error: Some(error.into()),
            success: false,
            duration,
        }
    }

    fn digest_line(&self) -> String {
        if self.success {
            format!("  - {}: {}", self.tool_name, preview(&self.result))
        } else {
            let error = self.error.as_deref().unwrap_or("Unknown error");
            format!("  - {}: Failed ({error})", self.tool_name)
        }
    }
}

/// Everything one round produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub round: u32,
    pub executions: Vec<ToolExecution>,
    pub total_calls: usize,
    pub successful_calls: usize,
}

impl ContextEntry {
    pub fn new(round: u32, executions: Vec<ToolExecution>) -> Self {
        let successful_calls = executions.iter().filter(|e| e.success).count();
        Self {
            round,
            total_calls: executions.len(),
            successful_calls,
            executions,
        }
    }

    fn render(&self) -> String {
        let mut out = format!("Round {}:", self.round);
        for execution in &self.executions {
            out.push('\n');
            out.push_str(&execution.digest_line());
        }
        out
    }
}

/// Append-only sequence of round entries, owned by one run.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedContext {
    entries: Vec<ContextEntry>,
}

impl AccumulatedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ContextEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ContextEntry> {
        self.entries
    }

    pub fn digest(&self) -> String {
        build_digest(&self.entries)
    }
}

/// Render `entries` as a readable summary, one block per round.
///
/// Rounds appear in ascending order separated by a blank line.
pub fn build_digest(entries: &[ContextEntry]) -> String {
    let mut ordered: Vec<&ContextEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.round);
    ordered
        .into_iter()
        .map(ContextEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(RESULT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(tool: &str, result: &str) -> ToolExecution {
        ToolExecution::succeeded(tool, json!({}), result, Duration::from_millis(5))
    }

    #[test]
    fn single_round_digest() {
        let entry = ContextEntry::new(1, vec![ok("search_course_content", "Python is a language")]);
        assert_eq!(
            build_digest(&[entry]),
            "Round 1:\n  - search_course_content: Python is a language"
        );
    }

    #[test]
    fn failed_call_shows_error() {
        let failed = ToolExecution::failed(
            "search_course_content",
            json!({"query": "q"}),
            "Tool execution failed: search_course_content: boom",
            "search_course_content: boom",
            Duration::from_millis(1),
        );
        let entry = ContextEntry::new(1, vec![failed]);
        assert_eq!(entry.successful_calls, 0);
        assert_eq!(
            build_digest(&[entry]),
            "Round 1:\n  - search_course_content: Failed (search_course_content: boom)"
        );
    }

    #[test]
    fn rounds_are_separated_and_ordered() {
        let digest = build_digest(&[
            ContextEntry::new(2, vec![ok("search", "B")]),
            ContextEntry::new(1, vec![ok("search", "A"), ok("other", "C")]),
        ]);
        assert_eq!(
            digest,
            "Round 1:\n  - search: A\n  - other: C\n\nRound 2:\n  - search: B"
        );
    }

    #[test]
    fn long_results_are_cut_to_preview() {
        let long = "x".repeat(1000);
        let entry = ContextEntry::new(1, vec![ok("search", &long)]);
        let digest = build_digest(&[entry.clone()]);

        let line = digest.lines().nth(1).unwrap();
        let shown = line.trim_start_matches("  - search: ");
        assert_eq!(shown.len(), RESULT_PREVIEW_CHARS + TRUNCATION_MARKER.len());
        assert!(shown.ends_with("..."));

        // Stored result is untouched, so rendering twice gives the same digest
        assert_eq!(entry.executions[0].result.len(), 1000);
        assert_eq!(build_digest(&[entry]), digest);
    }

    #[test]
    fn exact_preview_length_is_not_marked() {
        let exact = "y".repeat(RESULT_PREVIEW_CHARS);
        let digest = build_digest(&[ContextEntry::new(1, vec![ok("search", &exact)])]);
        assert!(!digest.ends_with("..."));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let wide = "é".repeat(RESULT_PREVIEW_CHARS + 10);
        let shown = preview(&wide);
        assert_eq!(shown.chars().count(), RESULT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn accumulated_context_is_append_only() {
        let mut context = AccumulatedContext::new();
        assert!(context.is_empty());
        assert_eq!(context.digest(), "");

        context.push(ContextEntry::new(1, vec![ok("search", "A")]));
        context.push(ContextEntry::new(2, vec![ok("search", "B")]));
        assert_eq!(context.entries().len(), 2);
        assert_eq!(context.entries()[0].total_calls, 1);
        assert!(context.digest().starts_with("Round 1:"));
    }
}
