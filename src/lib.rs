//! Coinflip: a virtual coin decision aid
//!
//! Flip lifecycle (tap / flick / shake) → FlipCoordinator → bounded history log

pub mod core;
pub mod types;

// =============================================================================
// FLIP TIMING [C]
// =============================================================================

/// Total wall-clock time from flip request to settle (milliseconds)
pub const FLIP_TOTAL_DURATION_MS: u64 = 3200;

/// Delay before the outcome is drawn, so the animation visibly starts first
pub const FLIP_PREROLL_MS: u64 = 100;

/// Remainder of the flip after the outcome is drawn
pub const FLIP_REMAINING_MS: u64 = FLIP_TOTAL_DURATION_MS - FLIP_PREROLL_MS;

// =============================================================================
// MOTION TRIGGERS [C]
// =============================================================================

/// Nominal accelerometer sample interval (milliseconds)
pub const MOTION_SAMPLE_INTERVAL_MS: u64 = 100;

/// Upward y-delta (in g) between two samples that counts as a flick
pub const FLICK_Y_DELTA_THRESHOLD: f64 = 0.8;

/// Minimum time between two flick-triggered flips (milliseconds)
pub const FLICK_COOLDOWN_MS: u64 = 4000;

/// Acceleration magnitude (in g) that counts as a shake
pub const SHAKE_MAGNITUDE_THRESHOLD: f64 = 1.5;

/// Minimum time between two shakes (milliseconds)
pub const SHAKE_COOLDOWN_MS: u64 = 1000;

/// Debounce delay between a shake and the display reset (milliseconds)
pub const SHAKE_RESET_DELAY_MS: u64 = 100;

// =============================================================================
// HISTORY + LABELS [C]
// =============================================================================

/// Number of flips kept in the history log
pub const HISTORY_CAPACITY: usize = 10;

/// Storage slot holding the JSON-encoded history
pub const HISTORY_STORAGE_KEY: &str = "coinFlipHistory";

/// Maximum custom label length, in characters
pub const LABEL_MAX_CHARS: usize = 150;

/// Display text while no outcome is shown
pub const READY_LABEL: &str = "Ready";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
