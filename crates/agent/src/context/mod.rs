//! Cross-round context for the orchestrator.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`accumulator`] | Append-only record of each round's tool calls and its digest |
//! | [`prompt`] | Base prompt, round guidance, and synthesis prompt built from the digest |

pub mod accumulator;
pub mod prompt;

pub use accumulator::{
    AccumulatedContext, ContextEntry, RESULT_PREVIEW_CHARS, ToolExecution, build_digest,
};
pub use prompt::{
    SYSTEM_PROMPT, enriched_system_prompt, round_guidance, synthesis_system_prompt, with_history,
};
