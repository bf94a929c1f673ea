//! Motion sample and trigger definitions

use serde::{Deserialize, Serialize};

/// Raw accelerometer reading in g, unvalidated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// All three components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean magnitude
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Discrete event emitted by the motion detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionTrigger {
    /// Fast upward motion, requests a flip
    Flick,
    /// High-magnitude motion, requests a display reset
    Shake,
}

impl std::fmt::Display for MotionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionTrigger::Flick => write!(f, "flick"),
            MotionTrigger::Shake => write!(f, "shake"),
        }
    }
}
