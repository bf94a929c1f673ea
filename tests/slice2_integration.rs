//! Integration tests for Slice 2
//!
//! History log on disk: bounded newest-first log, corrupt slots read as empty,
//! survives a process restart.

use std::sync::Arc;
use std::thread;

use coinflip::core::{FileStore, HistoryLog, KeyValueStore};
use coinflip::types::HistoryEntry;
use coinflip::{HISTORY_CAPACITY, HISTORY_STORAGE_KEY};
use pretty_assertions::assert_eq;

fn file_log(dir: &std::path::Path) -> (Arc<FileStore>, HistoryLog) {
    let store = Arc::new(FileStore::new(dir));
    let log = HistoryLog::new(store.clone());
    (store, log)
}

/// Twelve appends keep E12..E3, newest first
#[test]
fn test_twelve_appends_keep_newest_ten() {
    let dir = tempfile::tempdir().unwrap();
    let (_, log) = file_log(dir.path());

    for i in 1..=12 {
        log.append(HistoryEntry::new(format!("E{}", i), i)).unwrap();
    }

    let labels: Vec<String> = log.read_all().into_iter().map(|e| e.label).collect();
    let expected: Vec<String> = (3..=12).rev().map(|i| format!("E{}", i)).collect();
    assert_eq!(labels, expected);
}

#[test]
fn test_never_written_slot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (_, log) = file_log(&dir.path().join("does-not-exist-yet"));
    assert!(log.read_all().is_empty());
}

#[test]
fn test_corrupt_file_is_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let (store, log) = file_log(dir.path());

    for raw in ["", "{", "{\"label\":\"Heads\",\"timestamp\":1}", "true", "[1, 2"] {
        store.set(HISTORY_STORAGE_KEY, raw).unwrap();
        assert!(log.read_all().is_empty(), "expected empty for {:?}", raw);
    }
}

#[test]
fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, log) = file_log(dir.path());
        log.append(HistoryEntry::new("Heads", 10)).unwrap();
        log.append(HistoryEntry::new("Pizza", 20)).unwrap();
    }

    let (_, reopened) = file_log(dir.path());
    assert_eq!(
        reopened.read_all(),
        vec![HistoryEntry::new("Pizza", 20), HistoryEntry::new("Heads", 10)]
    );
}

#[test]
fn test_persisted_blob_is_json_array_of_label_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let (store, log) = file_log(dir.path());
    log.append(HistoryEntry::new("Tails", 1)).unwrap();
    log.append(HistoryEntry::new("A", 2)).unwrap();

    let raw = store.get(HISTORY_STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"label": "A", "timestamp": 2},
            {"label": "Tails", "timestamp": 1}
        ])
    );
}

#[test]
fn test_clear_deletes_file() {
    let dir = tempfile::tempdir().unwrap();
    let (store, log) = file_log(dir.path());
    log.append(HistoryEntry::new("Heads", 1)).unwrap();

    log.clear().unwrap();
    assert_eq!(store.get(HISTORY_STORAGE_KEY).unwrap(), None);
    assert!(log.read_all().is_empty());

    // clearing twice is fine
    assert!(log.clear().is_ok());
}

/// Concurrent appends never corrupt the blob or exceed capacity
#[test]
fn test_concurrent_appends_stay_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let (store, log) = file_log(dir.path());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    log.append(HistoryEntry::new(format!("T{}-{}", t, i), i)).unwrap();
                    let _ = log.read_all();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }

    let raw = store.get(HISTORY_STORAGE_KEY).unwrap().unwrap();
    let parsed: Vec<HistoryEntry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), HISTORY_CAPACITY);
    assert_eq!(log.read_all(), parsed);
}
