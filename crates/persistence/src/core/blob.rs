//! Blob store trait.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::WriteAck;
use crate::error::StoreResult;

/// Opaque identifier assigned to a blob by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(String);

impl BlobId {
    /// Wraps a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata describing a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    /// Store-assigned identifier.
    pub id: BlobId,
    /// Filename given at upload.
    pub filename: String,
    /// Size in bytes.
    pub length: u64,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

/// Binary object operations against a bucket.
///
/// Filenames are not unique: uploading the same filename twice yields two
/// blobs with distinct ids. Lookups by filename return the most recent
/// upload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `filename` and returns the assigned id.
    async fn upload_blob(&self, filename: &str, bytes: Vec<u8>) -> StoreResult<BlobId>;

    /// Returns metadata for the newest blob named `filename`, or `None`.
    async fn find_blob_by_name(&self, filename: &str) -> StoreResult<Option<BlobMeta>>;

    /// Returns the contents of the blob with the given id.
    ///
    /// # Errors
    ///
    /// * `StoreError::Blob(NotFound)` - If no blob has this id
    async fn download_blob(&self, id: &BlobId) -> StoreResult<Vec<u8>>;

    /// Deletes the blob with the given id.
    ///
    /// Deleting an unknown id is not an error; the ack reports
    /// `matched == false`.
    async fn delete_blob(&self, id: &BlobId) -> StoreResult<WriteAck>;
}
