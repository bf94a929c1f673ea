//! Reason codes for accepted/ignored intents and swallowed failures

use serde::{Deserialize, Serialize};

/// Reason codes for every coordinator decision and degraded collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // F1xx: Flip lifecycle
    // =========================================================================
    /// Flip accepted, coin in the air
    F100_FLIP_STARTED,
    /// Flip settled, outcome committed
    F101_FLIP_SETTLED,
    /// Flip aborted by an unexpected failure, guard released
    F102_FLIP_FAILSAFE_RESET,

    // =========================================================================
    // F2xx: Guards
    // =========================================================================
    /// Another flip is still running
    F200_FLIP_IN_PROGRESS,

    // =========================================================================
    // F3xx: Display, mode and labels
    // =========================================================================
    /// Displayed outcome cleared
    F300_DISPLAY_RESET,
    /// Coin mode switched
    F301_MODE_CHANGED,
    /// Custom label stored
    F302_LABEL_SET,
    /// Custom label stored after truncation
    F303_LABEL_TRUNCATED,

    // =========================================================================
    // F4xx: Motion
    // =========================================================================
    /// Upward flick detected
    F400_FLICK_DETECTED,
    /// Shake detected
    F401_SHAKE_DETECTED,
    /// Sample had a non-finite component
    F402_SAMPLE_REJECTED,
    /// Motion source missing or failed
    F403_MOTION_UNAVAILABLE,

    // =========================================================================
    // F5xx: History
    // =========================================================================
    /// Entry appended to history
    F500_HISTORY_APPENDED,
    /// History write failed (flip still counts)
    F501_HISTORY_WRITE_FAILED,
    /// History cleared
    F502_HISTORY_CLEARED,
    /// History clear failed
    F503_HISTORY_CLEAR_FAILED,
    /// Stored history unreadable, treated as empty
    F504_HISTORY_CORRUPT,
    /// Storage backend failed
    F505_STORAGE_ERROR,

    // =========================================================================
    // F6xx: Collaborators
    // =========================================================================
    /// Tactile cue unavailable or failed
    F600_HAPTIC_FAILED,
    /// Configuration rejected
    F601_CONFIG_INVALID,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::F100_FLIP_STARTED => "F100_FLIP_STARTED",
            Self::F101_FLIP_SETTLED => "F101_FLIP_SETTLED",
            Self::F102_FLIP_FAILSAFE_RESET => "F102_FLIP_FAILSAFE_RESET",
            Self::F200_FLIP_IN_PROGRESS => "F200_FLIP_IN_PROGRESS",
            Self::F300_DISPLAY_RESET => "F300_DISPLAY_RESET",
            Self::F301_MODE_CHANGED => "F301_MODE_CHANGED",
            Self::F302_LABEL_SET => "F302_LABEL_SET",
            Self::F303_LABEL_TRUNCATED => "F303_LABEL_TRUNCATED",
            Self::F400_FLICK_DETECTED => "F400_FLICK_DETECTED",
            Self::F401_SHAKE_DETECTED => "F401_SHAKE_DETECTED",
            Self::F402_SAMPLE_REJECTED => "F402_SAMPLE_REJECTED",
            Self::F403_MOTION_UNAVAILABLE => "F403_MOTION_UNAVAILABLE",
            Self::F500_HISTORY_APPENDED => "F500_HISTORY_APPENDED",
            Self::F501_HISTORY_WRITE_FAILED => "F501_HISTORY_WRITE_FAILED",
            Self::F502_HISTORY_CLEARED => "F502_HISTORY_CLEARED",
            Self::F503_HISTORY_CLEAR_FAILED => "F503_HISTORY_CLEAR_FAILED",
            Self::F504_HISTORY_CORRUPT => "F504_HISTORY_CORRUPT",
            Self::F505_STORAGE_ERROR => "F505_STORAGE_ERROR",
            Self::F600_HAPTIC_FAILED => "F600_HAPTIC_FAILED",
            Self::F601_CONFIG_INVALID => "F601_CONFIG_INVALID",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::F100_FLIP_STARTED => "Flip started",
            Self::F101_FLIP_SETTLED => "Flip settled",
            Self::F102_FLIP_FAILSAFE_RESET => "Flip aborted, returned to idle",
            Self::F200_FLIP_IN_PROGRESS => "Ignored - flip in progress",
            Self::F300_DISPLAY_RESET => "Display reset",
            Self::F301_MODE_CHANGED => "Mode changed",
            Self::F302_LABEL_SET => "Label set",
            Self::F303_LABEL_TRUNCATED => "Label truncated to 150 characters",
            Self::F400_FLICK_DETECTED => "Flick detected",
            Self::F401_SHAKE_DETECTED => "Shake detected",
            Self::F402_SAMPLE_REJECTED => "Non-finite motion sample rejected",
            Self::F403_MOTION_UNAVAILABLE => "Motion source unavailable",
            Self::F500_HISTORY_APPENDED => "History entry saved",
            Self::F501_HISTORY_WRITE_FAILED => "History entry not saved",
            Self::F502_HISTORY_CLEARED => "History cleared",
            Self::F503_HISTORY_CLEAR_FAILED => "History could not be cleared",
            Self::F504_HISTORY_CORRUPT => "Stored history unreadable, treated as empty",
            Self::F505_STORAGE_ERROR => "Storage error",
            Self::F600_HAPTIC_FAILED => "Tactile cue failed",
            Self::F601_CONFIG_INVALID => "Invalid configuration",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Result of a state-mutating intent. Ignored is a sentinel, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Dispatch {
    Accepted(ReasonCode),
    Ignored(ReasonCode),
}

impl Dispatch {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Dispatch::Accepted(_))
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            Dispatch::Accepted(r) | Dispatch::Ignored(r) => *r,
        }
    }
}
