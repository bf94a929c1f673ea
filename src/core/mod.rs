//! Core modules for Coinflip

pub mod config;
pub mod storage;
pub mod haptics;
pub mod history;
pub mod detector;
pub mod motion;
pub mod coordinator;
pub mod intent;

pub use config::{CoinConfig, FlipTiming, MotionConfig, HistoryConfig};
pub use storage::{KeyValueStore, FileStore, MemoryStore};
pub use haptics::{HapticCue, Haptics, NoHaptics, TerminalBell};
pub use history::HistoryLog;
pub use detector::MotionDetector;
pub use motion::{MotionSource, UnavailableMotion, ChannelMotion, ScriptedMotion, DebounceTimer, MotionListener, parse_script};
pub use coordinator::{FlipCoordinator, FlipCoordinatorBuilder, CoinToss, RandomToss, FlipResult, FlipRecord, IntentResponse};
pub use intent::{IntentParser, HELP};
