//! Integration tests for HistoryStore against a scratch directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;

use skycast_history::{HistoryEntry, HistoryError, HistoryStore};
use tempfile::TempDir;

/// Helper to create a store in a fresh temp directory
fn test_store() -> (TempDir, HistoryStore) {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("searchHistory.json"));
    (dir, store)
}

fn cities(entries: &[HistoryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.city.as_str()).collect()
}

#[tokio::test]
async fn test_append_then_list_contains_entry() {
    let (_dir, store) = test_store();

    for city in ["Paris", "São Paulo", "  spaced  ", "New York, US"] {
        let entry = store.append(city).await.unwrap();
        assert_eq!(entry.city, city);

        let listed = store.list().await;
        assert!(listed.iter().any(|e| e.id == entry.id && e.city == city));
    }
}

#[tokio::test]
async fn test_generated_ids_are_distinct() {
    let (_dir, store) = test_store();

    let mut ids = HashSet::new();
    for i in 0..120 {
        let entry = store.append(&format!("City {}", i)).await.unwrap();
        assert!(ids.insert(entry.id), "id generated twice");
    }

    assert_eq!(store.list().await.len(), 120);
}

#[tokio::test]
async fn test_append_preserves_order() {
    let (_dir, store) = test_store();

    store.append("Berlin").await.unwrap();
    store.append("A").await.unwrap();
    store.append("B").await.unwrap();

    let listed = store.list().await;
    assert_eq!(cities(&listed), vec!["Berlin", "A", "B"]);
}

#[tokio::test]
async fn test_duplicate_cities_are_kept() {
    let (_dir, store) = test_store();

    let first = store.append("Rome").await.unwrap();
    let second = store.append("Rome").await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(cities(&store.list().await), vec!["Rome", "Rome"]);
}

#[tokio::test]
async fn test_remove_unknown_id_returns_none_and_keeps_history() {
    let (_dir, store) = test_store();
    store.append("Paris").await.unwrap();
    store.append("Tokyo").await.unwrap();
    let before = store.list().await;

    let result = store.remove_by_id("not-an-id").await.unwrap();

    assert!(result.is_none());
    assert_eq!(store.list().await, before);
}

#[tokio::test]
async fn test_remove_by_id_removes_only_that_entry() {
    let (_dir, store) = test_store();
    let a = store.append("A").await.unwrap();
    let b = store.append("B").await.unwrap();
    let c = store.append("C").await.unwrap();

    let remaining = store.remove_by_id(&b.id).await.unwrap().unwrap();

    assert_eq!(remaining, vec![a.clone(), c.clone()]);
    assert_eq!(store.list().await, vec![a, c]);

    // A second delete of the same id is a not-found
    assert!(store.remove_by_id(&b.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_last_entry_leaves_empty_array() {
    let (dir, store) = test_store();
    let only = store.append("Cairo").await.unwrap();

    let remaining = store.remove_by_id(&only.id).await.unwrap().unwrap();

    assert!(remaining.is_empty());
    let raw = std::fs::read_to_string(dir.path().join("searchHistory.json")).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[tokio::test]
async fn test_reload_yields_identical_sequence() {
    let (dir, store) = test_store();
    for city in ["Lisbon", "Madrid", "Porto", "Seville"] {
        store.append(city).await.unwrap();
    }
    let written = store.list().await;

    // Fresh instance over the same file
    let reopened = HistoryStore::new(dir.path().join("searchHistory.json"));
    assert_eq!(reopened.list().await, written);
}

#[tokio::test]
async fn test_legacy_name_documents_are_read_and_rewritten() {
    let (dir, store) = test_store();
    let path = dir.path().join("searchHistory.json");
    std::fs::write(
        &path,
        r#"[{"id":"1","name":"Paris"},{"id":"2","name":"Tokyo"}]"#,
    )
    .unwrap();

    assert_eq!(cities(&store.list().await), vec!["Paris", "Tokyo"]);

    store.append("Lima").await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("\"name\""));
    assert_eq!(cities(&store.list().await), vec!["Paris", "Tokyo", "Lima"]);
}

#[tokio::test]
async fn test_entries_with_both_city_and_name_prefer_city() {
    let (dir, store) = test_store();
    std::fs::write(
        dir.path().join("searchHistory.json"),
        r#"[{"id":"1","city":"Paris","name":"Paris"},{"id":"2","city":"Oslo","name":"Bergen"}]"#,
    )
    .unwrap();

    assert_eq!(cities(&store.list().await), vec!["Paris", "Oslo"]);
    assert!(store.remove_by_id("1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_corrupt_document_lists_empty_but_refuses_mutation() {
    let (dir, store) = test_store();
    let path = dir.path().join("searchHistory.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(store.list().await.is_empty());

    let err = store.append("Paris").await.unwrap_err();
    assert!(matches!(err, HistoryError::Corrupt { .. }), "got {:?}", err);

    let err = store.remove_by_id("1").await.unwrap_err();
    assert!(matches!(err, HistoryError::Corrupt { .. }), "got {:?}", err);

    // The damaged file is left for inspection
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_unwritable_location_is_persistence_error() {
    let dir = TempDir::new().unwrap();
    // Parent "directory" is a regular file, so nothing can be created beneath it
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let store = HistoryStore::new(blocker.join("searchHistory.json"));

    let err = store.append("Paris").await.unwrap_err();

    assert!(matches!(err, HistoryError::Persistence { .. }), "got {:?}", err);
    assert!(err.to_string().contains("Failed to persist"));
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn test_failed_remove_is_persistence_error_and_keeps_history() {
    let (dir, store) = test_store();
    let paris = store.append("Paris").await.unwrap();
    store.append("Tokyo").await.unwrap();

    // A directory squatting on the temp file name makes the write fail
    std::fs::create_dir(dir.path().join("searchHistory.json.tmp")).unwrap();

    let err = store.remove_by_id(&paris.id).await.unwrap_err();

    assert!(matches!(err, HistoryError::Persistence { .. }), "got {:?}", err);
    assert_eq!(cities(&store.list().await), vec!["Paris", "Tokyo"]);
}

#[tokio::test]
async fn test_unreadable_document_lists_empty_but_refuses_mutation() {
    let (dir, store) = test_store();
    std::fs::create_dir(dir.path().join("searchHistory.json")).unwrap();

    assert!(store.list().await.is_empty());

    let err = store.append("Paris").await.unwrap_err();
    assert!(matches!(err, HistoryError::Persistence { .. }), "got {:?}", err);

    let err = store.remove_by_id("1").await.unwrap_err();
    assert!(matches!(err, HistoryError::Persistence { .. }), "got {:?}", err);

    assert!(dir.path().join("searchHistory.json").is_dir());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_not_lost() {
    let (_dir, store) = test_store();
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.append(&format!("City {}", i)).await.unwrap()
        }));
    }

    let mut created = Vec::new();
    for handle in handles {
        created.push(handle.await.unwrap());
    }

    let listed = store.list().await;
    assert_eq!(listed.len(), 32);

    let ids: HashSet<&str> = listed.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 32);
    for entry in &created {
        assert!(ids.contains(entry.id.as_str()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_append_and_remove_both_apply() {
    let (_dir, store) = test_store();
    let store = Arc::new(store);
    let doomed = store.append("Doomed").await.unwrap();

    let remover = {
        let store = store.clone();
        let id = doomed.id.clone();
        tokio::spawn(async move { store.remove_by_id(&id).await.unwrap() })
    };
    let appender = {
        let store = store.clone();
        tokio::spawn(async move { store.append("Kept").await.unwrap() })
    };

    let removed = remover.await.unwrap();
    let kept = appender.await.unwrap();

    assert!(removed.is_some());
    assert_eq!(store.list().await, vec![kept]);
}
