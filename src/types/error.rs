//! Collaborator error types
//!
//! None of these ever escape the coordinator: each is logged with its
//! reason code and the feature degrades.

use thiserror::Error;
use crate::types::ReasonCode;

/// Key-value storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn reason(&self) -> ReasonCode {
        ReasonCode::F505_STORAGE_ERROR
    }
}

/// Tactile cue failures
#[derive(Debug, Error)]
pub enum HapticError {
    #[error("haptics not available on this device")]
    Unavailable,
    #[error("haptic cue failed: {0}")]
    Failed(String),
}

impl HapticError {
    pub fn reason(&self) -> ReasonCode {
        ReasonCode::F600_HAPTIC_FAILED
    }
}

/// Motion source failures
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("motion source not available")]
    Unavailable,
    #[error("motion source already subscribed")]
    AlreadySubscribed,
    #[error("failed to read motion script '{path}': {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MotionError {
    pub fn reason(&self) -> ReasonCode {
        ReasonCode::F403_MOTION_UNAVAILABLE
    }
}

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn reason(&self) -> ReasonCode {
        ReasonCode::F601_CONFIG_INVALID
    }
}

/// Unexpected failure inside the flip sequence
#[derive(Debug, Error)]
pub enum FlipError {
    #[error("flip task panicked: {0}")]
    Panicked(String),
}

impl FlipError {
    pub fn reason(&self) -> ReasonCode {
        ReasonCode::F102_FLIP_FAILSAFE_RESET
    }
}
