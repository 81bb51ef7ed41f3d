//! In-process store backend.
//!
//! [`MemoryStore`] keeps encoded documents and blobs behind a mutex and
//! mirrors the lookup semantics of the network backends: names are not
//! unique, record lookups return the first match in insertion order, blob
//! lookups return the newest upload, and blobs with the same filename are
//! independent. Records go through the BSON codec on
//! the way in and out, so a round trip here exercises the same wire contract
//! as a real server.

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::{
    BackendKind, BlobId, BlobMeta, BlobStore, DocumentStore, InsertAck, Store, WriteAck,
};
use crate::error::{BlobError, RecordError, StoreResult};
use crate::record::Record;
use crate::record::codec::NAME_KEY;

const BACKEND_NAME: &str = "memory";

#[derive(Debug, Clone)]
struct StoredBlob {
    meta: BlobMeta,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: Vec<(String, Document)>,
    blobs: Vec<StoredBlob>,
}

/// In-process document and blob store.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    unique_names: bool,
}

impl MemoryStore {
    /// Creates an empty store that allows duplicate record names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects inserts of an existing name with
    /// `RecordError::DuplicateKey`.
    pub fn with_unique_names() -> Self {
        Self {
            unique_names: true,
            ..Self::default()
        }
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.state.lock().documents.len()
    }

    /// Returns the number of stored blobs.
    pub fn blob_count(&self) -> usize {
        self.state.lock().blobs.len()
    }
}

fn name_of(document: &Document) -> Option<&str> {
    match document.get(NAME_KEY) {
        Some(Bson::String(name)) => Some(name.as_str()),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, record: &Record) -> StoreResult<InsertAck> {
        let mut state = self.state.lock();
        if self.unique_names
            && state
                .documents
                .iter()
                .any(|(_, doc)| name_of(doc) == Some(record.name.as_str()))
        {
            return Err(RecordError::DuplicateKey {
                name: record.name.clone(),
            }
            .into());
        }

        let id = Uuid::new_v4().to_string();
        state.documents.push((id.clone(), record.to_document()));
        debug!(name = %record.name, id = %id, "Inserted record");

        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn replace_by_name(&self, name: &str, record: &Record) -> StoreResult<WriteAck> {
        let mut state = self.state.lock();
        let slot = state
            .documents
            .iter_mut()
            .find(|(_, doc)| name_of(doc) == Some(name));

        match slot {
            Some((_, doc)) => {
                *doc = record.to_document();
                Ok(WriteAck::acknowledged(true))
            }
            None => Ok(WriteAck::acknowledged(false)),
        }
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Record>> {
        let state = self.state.lock();
        let found = state
            .documents
            .iter()
            .find(|(_, doc)| name_of(doc) == Some(name));

        match found {
            Some((_, doc)) => Ok(Some(Record::from_document(doc)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_name(&self, name: &str) -> StoreResult<WriteAck> {
        let mut state = self.state.lock();
        let position = state
            .documents
            .iter()
            .position(|(_, doc)| name_of(doc) == Some(name));

        if let Some(index) = position {
            state.documents.remove(index);
        }
        Ok(WriteAck::acknowledged(position.is_some()))
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload_blob(&self, filename: &str, bytes: Vec<u8>) -> StoreResult<BlobId> {
        let id = BlobId::new(Uuid::new_v4().simple().to_string());
        let meta = BlobMeta {
            id: id.clone(),
            filename: filename.to_string(),
            length: bytes.len() as u64,
            uploaded_at: Utc::now(),
        };
        self.state.lock().blobs.push(StoredBlob { meta, bytes });
        debug!(filename = %filename, id = %id, "Uploaded blob");
        Ok(id)
    }

    async fn find_blob_by_name(&self, filename: &str) -> StoreResult<Option<BlobMeta>> {
        let state = self.state.lock();
        Ok(state
            .blobs
            .iter()
            .rev()
            .find(|blob| blob.meta.filename == filename)
            .map(|blob| blob.meta.clone()))
    }

    async fn download_blob(&self, id: &BlobId) -> StoreResult<Vec<u8>> {
        let state = self.state.lock();
        state
            .blobs
            .iter()
            .find(|blob| &blob.meta.id == id)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| {
                BlobError::NotFound {
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn delete_blob(&self, id: &BlobId) -> StoreResult<WriteAck> {
        let mut state = self.state.lock();
        let before = state.blobs.len();
        state.blobs.retain(|blob| &blob.meta.id != id);
        Ok(WriteAck::acknowledged(state.blobs.len() != before))
    }
}

impl Store for MemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::record::generate;

    #[tokio::test]
    async fn test_first_match_wins_for_duplicate_names() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(11);
        let first = generate("dup", &mut rng);
        let second = generate("dup", &mut rng);

        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();
        assert_eq!(store.record_count(), 2);

        assert_eq!(store.find_by_name("dup").await.unwrap(), Some(first));
        assert!(store.delete_by_name("dup").await.unwrap().matched);
        assert_eq!(store.find_by_name("dup").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_unique_names_rejects_duplicate_insert() {
        let store = MemoryStore::with_unique_names();
        let record = generate("only", &mut StdRng::seed_from_u64(12));

        store.insert(&record).await.unwrap();
        let err = store.insert(&record).await.unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_replace_never_upserts() {
        let store = MemoryStore::new();
        let record = generate("ghost", &mut StdRng::seed_from_u64(13));

        let ack = store.replace_by_name("ghost", &record).await.unwrap();
        assert!(ack.acknowledged);
        assert!(!ack.matched);
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.upload_blob("shared", vec![7]).await.unwrap();
        assert_eq!(store.blob_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_surfaces_decode_error() {
        let store = MemoryStore::new();
        store
            .state
            .lock()
            .documents
            .push(("x".to_string(), bson::doc! { "name": "bad", "someBool": 1 }));

        let err = store.find_by_name("bad").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Record(RecordError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_blob_reports_no_match() {
        let store = MemoryStore::new();
        let ack = store.delete_blob(&BlobId::new("missing")).await.unwrap();
        assert!(!ack.matched);
    }
}
