//! Output structures for terminal display

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use colored::Colorize;
use crate::types::{CoinMode, FlipPhase, FlipState, Outcome};
use crate::READY_LABEL;

/// What the presentation surface renders for each state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Busy/idle
    pub phase: FlipPhase,
    /// Current coin mode
    pub mode: CoinMode,
    /// Custom labels as typed
    pub label_a: String,
    pub label_b: String,
    /// Last committed outcome
    pub outcome: Option<Outcome>,
    /// Resolved label, or "Ready" when nothing is shown
    pub display: String,
}

impl DisplayState {
    pub fn from_state(state: &FlipState) -> Self {
        Self {
            timestamp: Utc::now(),
            phase: state.phase,
            mode: state.mode,
            label_a: state.label_a.clone(),
            label_b: state.label_b.clone(),
            outcome: state.last_outcome,
            display: state
                .display_label()
                .unwrap_or_else(|| READY_LABEL.to_string()),
        }
    }

    /// Is the "Ready" sentinel shown?
    pub fn is_ready(&self) -> bool {
        self.outcome.is_none()
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let display = match (self.phase, self.outcome) {
            (FlipPhase::Flipping, _) => "flipping...".yellow().to_string(),
            (FlipPhase::Idle, None) => self.display.dimmed().to_string(),
            (FlipPhase::Idle, Some(_)) => self.display.green().bold().to_string(),
        };

        format!(
            "{} {} | mode={} | state={}",
            self.phase.emoji(),
            display,
            self.mode,
            self.phase
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "display={} | mode={} | state={} | outcome={}",
            self.display,
            self.mode,
            self.phase,
            self.outcome.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string())
        )
    }
}
