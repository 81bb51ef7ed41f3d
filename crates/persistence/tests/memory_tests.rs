//! In-memory backend integration tests.
//!
//! These tests exercise the store contract through the public API, the same
//! way the probe drives it.

use rand::SeedableRng;
use rand::rngs::StdRng;

use strongbox_persistence::backends::memory::MemoryStore;
use strongbox_persistence::core::{BlobId, BlobStore, DocumentStore, Store};
use strongbox_persistence::error::{BlobError, StoreError};
use strongbox_persistence::record::generate;
use strongbox_persistence::BackendKind;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// ============================================================================
// Document Tests
// ============================================================================

#[tokio::test]
async fn test_insert_then_find_returns_equal_record() {
    let store = MemoryStore::new();
    let record = generate("roundtrip", &mut rng(1));

    let ack = store.insert(&record).await.unwrap();
    assert!(ack.acknowledged);
    assert!(!ack.inserted_id.is_empty());

    let found = store.find_by_name("roundtrip").await.unwrap();
    assert_eq!(found, Some(record));
}

#[tokio::test]
async fn test_absent_name_is_not_an_error() {
    let store = MemoryStore::new();

    assert_eq!(store.find_by_name("never").await.unwrap(), None);

    let ack = store.delete_by_name("never").await.unwrap();
    assert!(ack.acknowledged);
    assert!(!ack.matched);
}

#[tokio::test]
async fn test_replace_then_find_returns_replacement() {
    let store = MemoryStore::new();
    let mut rng = rng(2);
    let original = generate("swap", &mut rng);
    let replacement = generate("swap", &mut rng);
    assert_ne!(original, replacement);

    store.insert(&original).await.unwrap();
    let ack = store.replace_by_name("swap", &replacement).await.unwrap();
    assert!(ack.matched);

    let found = store.find_by_name("swap").await.unwrap().unwrap();
    assert_eq!(found, replacement);
    assert_ne!(found, original);
}

#[tokio::test]
async fn test_full_record_lifecycle() {
    let store = MemoryStore::new();
    let mut rng = rng(3);
    let first = generate("test", &mut rng);
    let second = generate("test", &mut rng);

    store.insert(&first).await.unwrap();
    store.replace_by_name("test", &second).await.unwrap();
    assert_eq!(store.find_by_name("test").await.unwrap(), Some(second));

    let ack = store.delete_by_name("test").await.unwrap();
    assert!(ack.matched);
    assert_eq!(store.find_by_name("test").await.unwrap(), None);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn test_records_with_other_names_are_untouched() {
    let store = MemoryStore::new();
    let mut rng = rng(4);
    let kept = generate("kept", &mut rng);
    store.insert(&kept).await.unwrap();
    store.insert(&generate("gone", &mut rng)).await.unwrap();

    store.delete_by_name("gone").await.unwrap();

    assert_eq!(store.find_by_name("kept").await.unwrap(), Some(kept));
}

// ============================================================================
// Blob Tests
// ============================================================================

#[tokio::test]
async fn test_blob_lifecycle() {
    let store = MemoryStore::new();
    let bytes = b"\x89PNG not really".to_vec();

    let id = store.upload_blob("texture", bytes.clone()).await.unwrap();

    let meta = store.find_blob_by_name("texture").await.unwrap().unwrap();
    assert_eq!(meta.id, id);
    assert_eq!(meta.filename, "texture");
    assert_eq!(meta.length, bytes.len() as u64);

    assert_eq!(store.download_blob(&id).await.unwrap(), bytes);

    assert!(store.delete_blob(&id).await.unwrap().matched);
    assert_eq!(store.find_blob_by_name("texture").await.unwrap(), None);
}

#[tokio::test]
async fn test_reupload_creates_independent_blob() {
    let store = MemoryStore::new();

    let first = store.upload_blob("same", vec![1]).await.unwrap();
    let second = store.upload_blob("same", vec![2]).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(store.blob_count(), 2);

    let meta = store.find_blob_by_name("same").await.unwrap().unwrap();
    assert_eq!(meta.id, second);

    store.delete_blob(&second).await.unwrap();
    let meta = store.find_blob_by_name("same").await.unwrap().unwrap();
    assert_eq!(meta.id, first);
    assert_eq!(store.download_blob(&first).await.unwrap(), vec![1]);
}

#[tokio::test]
async fn test_download_unknown_blob_is_not_found() {
    let store = MemoryStore::new();

    let err = store
        .download_blob(&BlobId::new("does-not-exist"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        StoreError::Blob(BlobError::NotFound { ref id }) if id == "does-not-exist"
    ));
}

#[tokio::test]
async fn test_records_and_blobs_are_independent() {
    let store = MemoryStore::new();
    let record = generate("shared", &mut rng(5));

    store.insert(&record).await.unwrap();
    store.upload_blob("shared", vec![0; 16]).await.unwrap();
    store.delete_by_name("shared").await.unwrap();

    assert!(store.find_blob_by_name("shared").await.unwrap().is_some());
}

#[test]
fn test_memory_store_identity() {
    let store = MemoryStore::new();
    assert_eq!(store.kind(), BackendKind::Memory);
    assert_eq!(store.backend_name(), "memory");
}
