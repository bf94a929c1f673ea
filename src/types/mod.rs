//! Core types for Coinflip

mod state;
mod reason;
mod output;
mod history;
mod motion;
mod error;
mod intent;

pub use state::{FlipPhase, CoinMode, Side, Outcome, FlipState};
pub use reason::{ReasonCode, Dispatch};
pub use output::DisplayState;
pub use history::HistoryEntry;
pub use motion::{MotionSample, MotionTrigger};
pub use error::{StorageError, HapticError, MotionError, ConfigError, FlipError};
pub use intent::Intent;
