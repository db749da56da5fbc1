//! Sequential tool-calling orchestration for Coursewise.
//!
//! A query runs through a bounded number of **rounds**:
//!
//! 1. **Ask** the model, offering the course search tool
//! 2. **If it answers**: return the text
//! 3. **If it asks for tools**: run them, fold results into the digest, go to 1
//! 4. **If the budget is spent**: make one tool-free synthesis call
//!
//! [`CourseAssistant`] adds sessions and source attribution on top.

pub mod assistant;
pub mod context;
pub mod orchestrator;
pub mod round_tracker;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assistant::{CourseAssistant, QueryAnswer};
pub use context::{AccumulatedContext, ContextEntry, SYSTEM_PROMPT, ToolExecution};
pub use orchestrator::{FALLBACK_RESPONSE, Orchestrator, Phase, RunExit, RunOutcome};
pub use round_tracker::{CallRecord, RoundTracker, TrackerSummary};
pub use session::SessionManager;
