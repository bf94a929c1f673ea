//! Bounded flip history
//!
//! Newest-first JSON array under a single storage key, capped at
//! `HISTORY_CAPACITY`. Insertion order is the only ordering key.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::storage::KeyValueStore;
use crate::types::{HistoryEntry, ReasonCode, StorageError};
use crate::{HISTORY_CAPACITY, HISTORY_STORAGE_KEY};

/// History log over a key-value store
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    /// Serializes read-modify-write so two appends never interleave
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl HistoryLog {
    /// Log under the default key and capacity
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, HISTORY_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            capacity: HISTORY_CAPACITY,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend `entry`, keep the newest `capacity` entries, persist
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        // read errors abort; the slot is left as is
        let mut entries = self.load()?;
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let json = serde_json::to_string(&entries).map_err(|source| StorageError::Encode {
            key: self.key.clone(),
            source,
        })?;
        self.store.set(&self.key, &json)?;

        debug!(reason = ReasonCode::F500_HISTORY_APPENDED.code(), len = entries.len(), "history_append");
        Ok(())
    }

    /// Persisted entries, newest first. Missing, corrupt or mistyped
    /// content reads as empty.
    pub fn read_all(&self) -> Vec<HistoryEntry> {
        self.load().unwrap_or_else(|e| {
            warn!(reason = e.reason().code(), error = %e, "history_read_failed");
            Vec::new()
        })
    }

    /// Stored entries; storage errors propagate, bad content decodes as empty
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        Ok(match self.store.get(&self.key)? {
            Some(raw) => decode_entries(&raw, self.capacity),
            None => Vec::new(),
        })
    }

    /// Delete the persisted slot
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.remove(&self.key)
    }
}

/// Lenient decode: anything but an array is empty, array items that are
/// not `{label, timestamp}` objects are skipped.
fn decode_entries(raw: &str, capacity: usize) -> Vec<HistoryEntry> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            warn!(reason = ReasonCode::F504_HISTORY_CORRUPT.code(), "history_corrupt");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<HistoryEntry>(item).ok())
        .take(capacity)
        .collect()
}
