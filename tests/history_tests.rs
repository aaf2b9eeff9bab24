//! Durable history store invariants
//!
//! The store is a single JSON slot: capped at five entries, newest first,
//! rewritten wholesale on every append, tolerant of missing or corrupt
//! durable state.

use breedscan::{
    BreedGuess, BreedReference, HistoryEntry, HistoryStore, ScanResult, HISTORY_CAPACITY,
};
use tempfile::TempDir;

fn sample_result(breed: &str) -> ScanResult {
    ScanResult {
        is_dog: true,
        breeds: vec![BreedGuess {
            name: breed.to_string(),
            confidence: 90.0,
        }],
        fact: format!("{} are very good dogs.", breed),
        reference: BreedReference::default(),
    }
}

fn entry(tag: usize) -> HistoryEntry {
    HistoryEntry::new(format!("image-{}", tag), sample_result("Beagle"))
}

fn slot(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("dog_scan_history.json")
}

#[tokio::test]
async fn append_caps_at_capacity_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(slot(&dir));
    store.load().await;

    for i in 0..7 {
        store.append(entry(i)).await.unwrap();
    }

    let entries = store.list().await;
    assert_eq!(entries.len(), HISTORY_CAPACITY);
    // Newest first: the last appended entry leads, the oldest two are evicted
    assert_eq!(entries[0].image_ref, "image-6");
    assert_eq!(entries[4].image_ref, "image-2");
    assert!(!entries.iter().any(|e| e.image_ref == "image-0"));
    assert!(!entries.iter().any(|e| e.image_ref == "image-1"));
}

#[tokio::test]
async fn load_with_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(slot(&dir));
    store.load().await;
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn load_with_corrupt_file_is_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(slot(&dir), "{ not json at all").unwrap();

    let store = HistoryStore::new(slot(&dir));
    store.load().await;
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(slot(&dir));
    store.load().await;
    store.append(entry(0)).await.unwrap();
    store.append(entry(1)).await.unwrap();

    let reader = HistoryStore::new(slot(&dir));
    reader.load().await;
    let first = reader.list().await;
    reader.load().await;
    let second = reader.list().await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn every_append_is_durable() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(slot(&dir));
    store.load().await;

    for i in 0..3 {
        store.append(entry(i)).await.unwrap();

        // A fresh store sees exactly what was appended so far
        let reader = HistoryStore::new(slot(&dir));
        reader.load().await;
        let entries = reader.list().await;
        assert_eq!(entries.len(), i + 1);
        assert_eq!(entries[0].image_ref, format!("image-{}", i));
    }
}

#[tokio::test]
async fn survives_reload_with_same_contents() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(slot(&dir));
    store.load().await;
    store.append(entry(0)).await.unwrap();
    store.append(entry(1)).await.unwrap();
    let before = store.list().await;

    let reloaded = HistoryStore::new(slot(&dir));
    reloaded.load().await;
    assert_eq!(reloaded.list().await, before);
}

#[tokio::test]
async fn oversized_durable_document_is_truncated_on_load() {
    let dir = TempDir::new().unwrap();

    let oversized: Vec<HistoryEntry> = (0..8).map(entry).collect();
    let doc = serde_json::json!({ "dog_scan_history": oversized });
    std::fs::write(slot(&dir), serde_json::to_string(&doc).unwrap()).unwrap();

    let store = HistoryStore::new(slot(&dir));
    store.load().await;
    assert_eq!(store.list().await.len(), HISTORY_CAPACITY);
}
