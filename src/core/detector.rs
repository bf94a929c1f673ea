//! Motion Trigger Detector
//!
//! Turns a raw accelerometer stream into two debounced events:
//! - Flick: y rose by more than the threshold since the previous sample,
//!   flick cooldown elapsed, no flip running
//! - Shake: otherwise, magnitude above the threshold and shake cooldown elapsed
//!
//! A flick sample never also counts as a shake. The detector is pure: the
//! caller supplies the sample time and the coordinator's busy flag.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::core::config::MotionConfig;
use crate::types::{MotionSample, MotionTrigger, ReasonCode};

/// Rolling detector state: one previous y, two last-trigger times
#[derive(Debug, Clone)]
pub struct MotionDetector {
    config: MotionConfig,
    previous_y: f64,
    last_flick: Option<Instant>,
    last_shake: Option<Instant>,
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

/// Never-triggered counts as cooled down
fn cooled_down(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    last.map_or(true, |t| now.saturating_duration_since(t) > cooldown)
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            previous_y: 0.0,
            last_flick: None,
            last_shake: None,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn previous_y(&self) -> f64 {
        self.previous_y
    }

    /// Feed one sample taken at `now`
    pub fn process(&mut self, sample: MotionSample, now: Instant, flip_in_progress: bool) -> Option<MotionTrigger> {
        if !sample.is_finite() {
            trace!(reason = ReasonCode::F402_SAMPLE_REJECTED.code(), ?sample, "sample_rejected");
            return None;
        }

        let y_delta = sample.y - self.previous_y;
        self.previous_y = sample.y;

        if y_delta > self.config.flick_y_delta
            && cooled_down(self.last_flick, now, self.config.flick_cooldown())
            && !flip_in_progress
        {
            self.last_flick = Some(now);
            debug!(reason = ReasonCode::F400_FLICK_DETECTED.code(), y_delta, "flick_detected");
            return Some(MotionTrigger::Flick);
        }

        let magnitude = sample.magnitude();
        if magnitude > self.config.shake_magnitude
            && cooled_down(self.last_shake, now, self.config.shake_cooldown())
        {
            self.last_shake = Some(now);
            debug!(reason = ReasonCode::F401_SHAKE_DETECTED.code(), magnitude, "shake_detected");
            return Some(MotionTrigger::Shake);
        }

        None
    }
}
