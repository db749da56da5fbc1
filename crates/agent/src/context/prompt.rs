//! System prompts for the assistant, per round and for the final synthesis.
//!
//! The base prompt is a process-wide constant. Every call derives its own
//! system text from it plus round guidance and the accumulated digest.

use super::accumulator::AccumulatedContext;

/// Base system prompt shared by every query.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in course materials and educational content with access to a comprehensive search tool for course information.

Search Tool Usage:
- Use the search tool **only** for questions about specific course content or detailed educational materials
- **Sequential searches per query, within the search budget given below** - use multiple searches for complex queries requiring comparison, analysis, or comprehensive coverage
- Strategic search approach: First search for initial relevant information, second search for additional context, comparisons, or related topics
- Synthesize ALL search results into accurate, fact-based responses
- If any search yields no results, state this clearly without offering alternatives

Sequential Search Strategy:
- **Complex queries**: Use multiple searches to gather comprehensive information (e.g., \"Compare X and Y\" → search X, then search Y)
- **Broad topics**: Start with general search, then narrow down with specific follow-up searches
- **Multi-part questions**: Break down into separate searches for each component
- **Course comparisons**: Search each course/topic separately for detailed analysis

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without searching
- **Course-specific questions**: Search strategically, using multiple calls if beneficial for comprehensive answers
- **No meta-commentary**:
 - Provide direct answers only: no reasoning process, search explanations, or question-type analysis
 - Do not mention \"based on the search results\" or describe your search process

All responses must be:
1. **Comprehensive and well-informed** - Leverage all gathered information from multiple searches
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
5. **Comparative when relevant** - Highlight similarities and differences when comparing content

Provide only the direct answer to what was asked, informed by all available search results.
";

const SYNTHESIS_GUIDANCE: &str = "

Final Response Phase:
- Synthesize information from ALL previous searches
- Provide a comprehensive answer that leverages all gathered context
- Do not mention the search process itself
- Focus on directly answering the user's question with all available information
";

/// Append prior conversation turns to `base`, if there are any.
pub fn with_history(base: &str, history: Option<&str>) -> String {
    match history.map(str::trim).filter(|h| !h.is_empty()) {
        Some(history) => format!("{base}\n\nPrevious conversation:\n{history}"),
        None => base.to_string(),
    }
}

fn ordinal(n: u32) -> String {
    match n {
        1 => "first".into(),
        2 => "second".into(),
        3 => "third".into(),
        4 => "fourth".into(),
        5 => "fifth".into(),
        _ => {
            let suffix = match (n % 10, n % 100) {
                (1, r) if r != 11 => "st",
                (2, r) if r != 12 => "nd",
                (3, r) if r != 13 => "rd",
                _ => "th",
            };
            format!("{n}{suffix}")
        }
    }
}

/// Guidance telling the model where it stands in the round budget.
pub fn round_guidance(round: u32, max_rounds: u32) -> String {
    if round >= max_rounds {
        format!(
            "Tool Round {round}: This is your {} and final search opportunity. \
             Use this to gather any additional information needed for a comprehensive answer.",
            ordinal(round)
        )
    } else if round == 1 {
        format!(
            "Tool Round 1: This is your first search opportunity. \
             You can make up to {max_rounds} total searches. \
             Consider if you need additional information after this search to fully answer the question."
        )
    } else {
        format!(
            "Tool Round {round}: This is your {} search opportunity of {max_rounds}. \
             Build on the previous search results and consider whether another search is still needed.",
            ordinal(round)
        )
    }
}

/// System text for tool round `round`: base, guidance, then any earlier results.
pub fn enriched_system_prompt(
    base: &str,
    context: &AccumulatedContext,
    round: u32,
    max_rounds: u32,
) -> String {
    let mut prompt = format!("{base}\n\n{}", round_guidance(round, max_rounds));
    if !context.is_empty() {
        prompt.push_str("\n\nPrevious search results:\n");
        prompt.push_str(&context.digest());
    }
    prompt
}

/// System text for the final tool-free call.
pub fn synthesis_system_prompt(base: &str, context: &AccumulatedContext) -> String {
    let mut prompt = format!("{base}{SYNTHESIS_GUIDANCE}");
    if !context.is_empty() {
        prompt.push_str("\n\nAll search results to synthesize:\n");
        prompt.push_str(&context.digest());
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::accumulator::{ContextEntry, ToolExecution};
    use std::time::Duration;

    fn context_with(result: &str) -> AccumulatedContext {
        let mut context = AccumulatedContext::new();
        context.push(ContextEntry::new(
            1,
            vec![ToolExecution::succeeded(
                "search_course_content",
                serde_json::json!({"query": "q"}),
                result,
                Duration::from_millis(3),
            )],
        ));
        context
    }

    #[test]
    fn history_is_appended_when_present() {
        assert_eq!(with_history("BASE", None), "BASE");
        assert_eq!(with_history("BASE", Some("  ")), "BASE");
        assert_eq!(
            with_history("BASE", Some("User: hi\nAssistant: hello")),
            "BASE\n\nPrevious conversation:\nUser: hi\nAssistant: hello"
        );
    }

    #[test]
    fn two_round_guidance_texts() {
        assert_eq!(
            round_guidance(1, 2),
            "Tool Round 1: This is your first search opportunity. You can make up to 2 total searches. \
             Consider if you need additional information after this search to fully answer the question."
        );
        assert_eq!(
            round_guidance(2, 2),
            "Tool Round 2: This is your second and final search opportunity. \
             Use this to gather any additional information needed for a comprehensive answer."
        );
    }

    #[test]
    fn base_prompt_leaves_budget_to_guidance() {
        assert!(!SYSTEM_PROMPT.contains("Up to 2"));
        let prompt = enriched_system_prompt(SYSTEM_PROMPT, &AccumulatedContext::new(), 1, 3);
        assert!(prompt.contains("up to 3 total searches"));
    }

    #[test]
    fn single_round_budget_gets_final_guidance() {
        assert!(round_guidance(1, 1).contains("first and final"));
    }

    #[test]
    fn intermediate_rounds_name_their_position() {
        let text = round_guidance(2, 4);
        assert!(text.starts_with("Tool Round 2:"));
        assert!(text.contains("second search opportunity of 4"));
        assert!(round_guidance(12, 12).contains("12th and final"));
        assert!(round_guidance(22, 30).contains("22nd"));
    }

    #[test]
    fn first_round_has_no_previous_results() {
        let prompt = enriched_system_prompt("BASE", &AccumulatedContext::new(), 1, 2);
        assert!(prompt.starts_with("BASE\n\nTool Round 1:"));
        assert!(!prompt.contains("Previous search results"));
    }

    #[test]
    fn later_rounds_carry_the_digest() {
        let prompt = enriched_system_prompt("BASE", &context_with("text A"), 2, 2);
        assert!(prompt.contains("Tool Round 2:"));
        assert!(prompt.ends_with(
            "Previous search results:\nRound 1:\n  - search_course_content: text A"
        ));
    }

    #[test]
    fn synthesis_prompt_has_guidance_and_all_results() {
        let prompt = synthesis_system_prompt("BASE", &context_with("text A"));
        assert!(prompt.starts_with("BASE\n\nFinal Response Phase:"));
        assert!(prompt.contains("Do not mention the search process itself"));
        assert!(prompt.ends_with(
            "All search results to synthesize:\nRound 1:\n  - search_course_content: text A"
        ));
    }

    #[test]
    fn synthesis_without_context_is_guidance_only() {
        let prompt = synthesis_system_prompt("BASE", &AccumulatedContext::new());
        assert!(!prompt.contains("All search results"));
    }
}
