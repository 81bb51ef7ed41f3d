//! Document store trait.
//!
//! This module defines the [`DocumentStore`] trait, which provides the CRUD
//! operations for [`Record`]s keyed by name.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::record::Record;

/// Acknowledgement of an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertAck {
    /// Whether the store acknowledged the write.
    pub acknowledged: bool,

    /// The store-assigned identifier of the new document.
    pub inserted_id: String,
}

/// Acknowledgement of a replace or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    /// Whether the store acknowledged the write.
    pub acknowledged: bool,

    /// Whether an existing entry matched and was affected.
    pub matched: bool,
}

impl WriteAck {
    /// An acknowledged write with the given match outcome.
    pub fn acknowledged(matched: bool) -> Self {
        Self {
            acknowledged: true,
            matched,
        }
    }
}

/// CRUD operations for records, addressed by [`Record::name`].
///
/// Names are not unique unless the backend says otherwise. Every operation
/// that takes a name acts on the first match in the store's own order, and
/// callers must not assume which one that is when duplicates exist.
///
/// # Errors
///
/// Every operation may fail with `StoreError::Backend` on transport failure
/// or timeout. Implementations do not retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// * `StoreError::Record(DuplicateKey)` - If the backend enforces name
    ///   uniqueness and the name is taken
    async fn insert(&self, record: &Record) -> StoreResult<InsertAck>;

    /// Replaces the first record named `name` with `record`.
    ///
    /// Never creates a record: when nothing matches, the returned ack has
    /// `matched == false`.
    async fn replace_by_name(&self, name: &str, record: &Record) -> StoreResult<WriteAck>;

    /// Returns the first record named `name`, or `None`.
    ///
    /// # Errors
    ///
    /// * `StoreError::Record(Decode)` - If the stored document is not a
    ///   valid record
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Record>>;

    /// Deletes the first record named `name`.
    ///
    /// Deleting an absent name is not an error; the ack reports
    /// `matched == false`.
    async fn delete_by_name(&self, name: &str) -> StoreResult<WriteAck>;
}
