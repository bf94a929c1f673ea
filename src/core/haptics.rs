//! Tactile cues
//!
//! Fire-and-forget. Every call site tolerates failure and absence.

use std::io::Write;

use serde::{Deserialize, Serialize};
use crate::types::HapticError;

/// Cue styles the coordinator asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticCue {
    LightImpact,
    MediumImpact,
    SuccessNotification,
}

impl std::fmt::Display for HapticCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HapticCue::LightImpact => write!(f, "light_impact"),
            HapticCue::MediumImpact => write!(f, "medium_impact"),
            HapticCue::SuccessNotification => write!(f, "success_notification"),
        }
    }
}

/// Tactile cue capability
pub trait Haptics: Send + Sync {
    fn pulse(&self, cue: HapticCue) -> Result<(), HapticError>;
}

/// No tactile hardware
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _cue: HapticCue) -> Result<(), HapticError> {
        Err(HapticError::Unavailable)
    }
}

/// Terminal bell on success, impacts are silent
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&self, cue: HapticCue) -> Result<(), HapticError> {
        if cue != HapticCue::SuccessNotification {
            return Ok(());
        }
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| HapticError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_haptics_reports_unavailable() {
        assert!(matches!(
            NoHaptics.pulse(HapticCue::LightImpact),
            Err(HapticError::Unavailable)
        ));
    }

    #[test]
    fn test_bell_ignores_impacts() {
        assert!(TerminalBell.pulse(HapticCue::MediumImpact).is_ok());
    }
}
