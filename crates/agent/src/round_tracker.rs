//! Round budget enforcement and per-call telemetry for one orchestration run.

use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// One tool invocation, tagged with the round it ran in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub round: u32,
    pub tool_name: String,
    pub params: serde_json::Value,
    pub duration: Duration,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Derived view over a [`RoundTracker`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSummary {
    pub total_rounds: u32,
    pub total_calls: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub total_duration: Duration,
    pub errors: Vec<String>,
}

/// Counts rounds against a fixed budget and records every tool call.
///
/// `current_round` only moves forward and never passes `max_rounds`.
#[derive(Debug, Clone)]
pub struct RoundTracker {
    max_rounds: u32,
    current_round: u32,
    calls: Vec<CallRecord>,
    total_duration: Duration,
    errors: Vec<String>,
}

impl RoundTracker {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds,
            current_round: 0,
            calls: Vec::new(),
            total_duration: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn can_start_round(&self) -> bool {
        self.current_round < self.max_rounds
    }

    /// Begin the next round and return its number (1-based).
    ///
    /// Callers check [`can_start_round`](Self::can_start_round) first. An
    /// exhausted tracker stays on its last round.
    pub fn start_round(&mut self) -> u32 {
        if !self.can_start_round() {
            warn!(
                current_round = self.current_round,
                max_rounds = self.max_rounds,
                "Round budget exhausted, not starting another round"
            );
            return self.current_round;
        }
        self.current_round += 1;
        self.current_round
    }

    /// Record a tool call under the current round.
    pub fn log_call(
        &mut self,
        tool_name: impl Into<String>,
        params: &serde_json::Value,
        duration: Duration,
        success: bool,
        error: Option<String>,
    ) {
        self.total_duration += duration;
        if let Some(error) = &error {
            self.errors.push(error.clone());
        }
        self.calls.push(CallRecord {
            round: self.current_round,
            tool_name: tool_name.into(),
            params: params.clone(),
            duration,
            success,
            error,
        });
    }

    pub fn summary(&self) -> TrackerSummary {
        let successful_calls = self.calls.iter().filter(|c| c.success).count();
        TrackerSummary {
            total_rounds: self.current_round,
            total_calls: self.calls.len(),
            successful_calls,
            failed_calls: self.calls.len() - successful_calls,
            total_duration: self.total_duration,
            errors: self.errors.clone(),
        }
    }
}
