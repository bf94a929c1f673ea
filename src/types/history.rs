//! History entry model

use serde::{Deserialize, Serialize};

/// One settled flip as stored in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Resolved display label at time of flip
    pub label: String,
    /// Wall-clock milliseconds at flip completion
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(label: impl Into<String>, timestamp: i64) -> Self {
        Self {
            label: label.into(),
            timestamp,
        }
    }

    /// Entry stamped with the current wall-clock time
    pub fn now(label: impl Into<String>) -> Self {
        Self::new(label, chrono::Utc::now().timestamp_millis())
    }

    /// Local time of day for list rendering
    pub fn time_of_day(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string())
    }
}
