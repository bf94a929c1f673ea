//! Flip state definitions

use serde::{Deserialize, Serialize};
use crate::LABEL_MAX_CHARS;

/// Busy/idle status of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlipPhase {
    /// No flip running, all intents accepted
    #[default]
    Idle,
    /// A flip is running, flip/reset/mode intents are ignored
    Flipping,
}

impl FlipPhase {
    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            FlipPhase::Idle => "🪙",
            FlipPhase::Flipping => "🌀",
        }
    }
}

impl std::fmt::Display for FlipPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlipPhase::Idle => "IDLE",
            FlipPhase::Flipping => "FLIPPING",
        };
        write!(f, "{}", name)
    }
}

/// Which pair of faces the coin shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinMode {
    /// Heads / Tails
    #[default]
    Standard,
    /// User-labeled A / B
    Custom,
}

impl std::fmt::Display for CoinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoinMode::Standard => write!(f, "standard"),
            CoinMode::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for CoinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "std" | "heads-tails" => Ok(CoinMode::Standard),
            "custom" | "ab" | "a/b" => Ok(CoinMode::Custom),
            other => Err(format!("unknown mode '{}' (expected standard or custom)", other)),
        }
    }
}

/// Custom label slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Canonical name used when the custom label is empty
    pub fn canonical(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

/// Result of one flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Heads,
    Tails,
    SideA,
    SideB,
}

impl Outcome {
    /// Map one random bit onto the faces of the given mode
    pub fn from_toss(mode: CoinMode, first_face: bool) -> Self {
        match (mode, first_face) {
            (CoinMode::Standard, true) => Outcome::Heads,
            (CoinMode::Standard, false) => Outcome::Tails,
            (CoinMode::Custom, true) => Outcome::SideA,
            (CoinMode::Custom, false) => Outcome::SideB,
        }
    }

    /// Custom label slot, if this is a custom-mode outcome
    pub fn side(&self) -> Option<Side> {
        match self {
            Outcome::SideA => Some(Side::A),
            Outcome::SideB => Some(Side::B),
            Outcome::Heads | Outcome::Tails => None,
        }
    }

    /// Canonical side name ("Heads", "Tails", "A", "B")
    pub fn canonical(&self) -> &'static str {
        match self {
            Outcome::Heads => "Heads",
            Outcome::Tails => "Tails",
            Outcome::SideA => Side::A.canonical(),
            Outcome::SideB => Side::B.canonical(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Everything the coordinator owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipState {
    pub phase: FlipPhase,
    pub mode: CoinMode,
    pub label_a: String,
    pub label_b: String,
    /// `None` until the first flip settles, cleared by reset and mode switch
    pub last_outcome: Option<Outcome>,
}

impl FlipState {
    /// Is a flip in progress?
    pub fn is_flipping(&self) -> bool {
        self.phase == FlipPhase::Flipping
    }

    /// Raw label for a side (untrimmed, as typed)
    pub fn label(&self, side: Side) -> &str {
        match side {
            Side::A => &self.label_a,
            Side::B => &self.label_b,
        }
    }

    /// Store a label, truncated to `LABEL_MAX_CHARS` characters.
    /// Returns true if the text had to be truncated.
    pub fn set_label(&mut self, side: Side, text: &str) -> bool {
        let truncated = text.chars().count() > LABEL_MAX_CHARS;
        let value: String = text.chars().take(LABEL_MAX_CHARS).collect();
        match side {
            Side::A => self.label_a = value,
            Side::B => self.label_b = value,
        }
        truncated
    }

    /// Display label for an outcome: trimmed custom label, else canonical name
    pub fn resolve_label(&self, outcome: Outcome) -> String {
        match outcome.side() {
            Some(side) => {
                let custom = self.label(side).trim();
                if custom.is_empty() {
                    side.canonical().to_string()
                } else {
                    custom.to_string()
                }
            }
            None => outcome.canonical().to_string(),
        }
    }

    /// Resolved label of the last outcome, if any
    pub fn display_label(&self) -> Option<String> {
        self.last_outcome.map(|o| self.resolve_label(o))
    }
}
