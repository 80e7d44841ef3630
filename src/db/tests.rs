#![allow(clippy::unwrap_used)]

use super::memory::MemoryStore;
use super::*;

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.keys().unwrap().is_empty());
    assert!(db.get(RECEIPTS_KEY).unwrap().is_none());
}

#[test]
fn test_reopen_file_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let db = Database::open(&path).unwrap();
        db.set(QUOTA_KEY, r#"{"count":1}"#).unwrap();
    }
    // Second open runs the migration path on an existing schema.
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get(QUOTA_KEY).unwrap().as_deref(), Some(r#"{"count":1}"#));
}

// ── KvStore ───────────────────────────────────────────────────

#[test]
fn test_set_overwrites() {
    let db = Database::open_in_memory().unwrap();
    db.set("a", "1").unwrap();
    db.set("a", "2").unwrap();
    assert_eq!(db.get("a").unwrap().as_deref(), Some("2"));
    assert_eq!(db.keys().unwrap(), vec!["a".to_string()]);
}

#[test]
fn test_keys_are_independent() {
    let db = Database::open_in_memory().unwrap();
    db.set(RECEIPTS_KEY, "[]").unwrap();
    db.set(QUOTA_KEY, "{}").unwrap();
    assert_eq!(db.get(RECEIPTS_KEY).unwrap().as_deref(), Some("[]"));
    assert_eq!(db.get(QUOTA_KEY).unwrap().as_deref(), Some("{}"));
    assert_eq!(db.keys().unwrap().len(), 2);
}

// ── JSON helpers ──────────────────────────────────────────────

#[test]
fn test_json_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    save_json(&db, "nums", &vec![1, 2, 3]);
    let back: Option<Vec<i32>> = load_json(&db, "nums");
    assert_eq!(back, Some(vec![1, 2, 3]));
}

#[test]
fn test_load_json_missing_key() {
    let db = Database::open_in_memory().unwrap();
    let back: Option<Vec<i32>> = load_json(&db, "nope");
    assert!(back.is_none());
}

#[test]
fn test_load_json_corrupt_fails_open() {
    let store = MemoryStore::with("nums", "{not json");
    let back: Option<Vec<i32>> = load_json(&store, "nums");
    assert!(back.is_none());
}

#[test]
fn test_load_json_read_error_fails_open() {
    let store = MemoryStore::with("nums", "[1]");
    store.fail_reads.set(true);
    let back: Option<Vec<i32>> = load_json(&store, "nums");
    assert!(back.is_none());
}

#[test]
fn test_save_json_write_error_is_swallowed() {
    let store = MemoryStore::default();
    store.fail_writes.set(true);
    save_json(&store, "nums", &vec![1]);
    assert!(store.raw("nums").is_none());
}
