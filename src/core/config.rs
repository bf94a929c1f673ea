//! Runtime configuration
//!
//! Every value defaults to the named constant in the crate root. A JSON
//! file may override any subset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::types::ConfigError;
use crate::{
    FLIP_PREROLL_MS, FLIP_TOTAL_DURATION_MS,
    FLICK_COOLDOWN_MS, FLICK_Y_DELTA_THRESHOLD, MOTION_SAMPLE_INTERVAL_MS,
    SHAKE_COOLDOWN_MS, SHAKE_MAGNITUDE_THRESHOLD, SHAKE_RESET_DELAY_MS,
};

/// Flip timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipTiming {
    pub total_ms: u64,
    pub preroll_ms: u64,
}

impl Default for FlipTiming {
    fn default() -> Self {
        Self {
            total_ms: FLIP_TOTAL_DURATION_MS,
            preroll_ms: FLIP_PREROLL_MS,
        }
    }
}

impl FlipTiming {
    pub fn preroll(&self) -> Duration {
        Duration::from_millis(self.preroll_ms)
    }

    /// Time left after the outcome is drawn
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.total_ms.saturating_sub(self.preroll_ms))
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }
}

/// Motion trigger thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub sample_interval_ms: u64,
    pub flick_y_delta: f64,
    pub flick_cooldown_ms: u64,
    pub shake_magnitude: f64,
    pub shake_cooldown_ms: u64,
    pub shake_reset_delay_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: MOTION_SAMPLE_INTERVAL_MS,
            flick_y_delta: FLICK_Y_DELTA_THRESHOLD,
            flick_cooldown_ms: FLICK_COOLDOWN_MS,
            shake_magnitude: SHAKE_MAGNITUDE_THRESHOLD,
            shake_cooldown_ms: SHAKE_COOLDOWN_MS,
            shake_reset_delay_ms: SHAKE_RESET_DELAY_MS,
        }
    }
}

impl MotionConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn flick_cooldown(&self) -> Duration {
        Duration::from_millis(self.flick_cooldown_ms)
    }

    pub fn shake_cooldown(&self) -> Duration {
        Duration::from_millis(self.shake_cooldown_ms)
    }

    pub fn shake_reset_delay(&self) -> Duration {
        Duration::from_millis(self.shake_reset_delay_ms)
    }
}

/// History storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./.coinflip"),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinConfig {
    pub flip: FlipTiming,
    pub motion: MotionConfig,
    pub history: HistoryConfig,
}

impl CoinConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flip.preroll_ms > self.flip.total_ms {
            return Err(ConfigError::Invalid(format!(
                "flip.preroll_ms ({}) exceeds flip.total_ms ({})",
                self.flip.preroll_ms, self.flip.total_ms
            )));
        }
        if self.motion.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid("motion.sample_interval_ms must be > 0".into()));
        }
        for (name, value) in [
            ("motion.flick_y_delta", self.motion.flick_y_delta),
            ("motion.shake_magnitude", self.motion.shake_magnitude),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be a finite, non-negative number", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = CoinConfig::default();
        assert_eq!(config.flip.total(), Duration::from_millis(FLIP_TOTAL_DURATION_MS));
        assert_eq!(config.flip.remaining(), Duration::from_millis(crate::FLIP_REMAINING_MS));
        assert_eq!(config.flip.preroll() + config.flip.remaining(), config.flip.total());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"flip": {{"total_ms": 1000}}}}"#).unwrap();

        let config = CoinConfig::load(file.path()).unwrap();
        assert_eq!(config.flip.total_ms, 1000);
        assert_eq!(config.flip.preroll_ms, FLIP_PREROLL_MS);
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn test_preroll_longer_than_total_rejected() {
        let mut config = CoinConfig::default();
        config.flip.preroll_ms = config.flip.total_ms + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "flip = 3").unwrap();
        assert!(matches!(CoinConfig::load(file.path()), Err(ConfigError::Parse { .. })));
    }
}
