//! Inbound intents from the presentation surface

use serde::{Deserialize, Serialize};
use crate::types::{CoinMode, Side};

/// Everything a user can ask the coordinator to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Flip,
    Reset,
    SetMode { mode: CoinMode },
    SetLabel { side: Side, text: String },
    OpenHistory,
    ClearHistory,
    Status,
    Help,
    Quit,
}
