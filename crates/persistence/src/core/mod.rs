//! Core store traits and abstractions.
//!
//! This module provides the seams between the probe and the stores it
//! exercises:
//!
//! - [`DocumentStore`] - Insert, replace, find and delete records by name
//! - [`BlobStore`] - Upload, find, download and delete binary objects
//! - [`Store`] - A backend offering both, plus identification
//!
//! # Trait Hierarchy
//!
//! ```text
//! DocumentStore ──┐
//!                 ├── Store
//! BlobStore ──────┘
//! ```
//!
//! # Example: Driving a Store
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use strongbox_persistence::backends::memory::MemoryStore;
//! use strongbox_persistence::core::{BlobStore, DocumentStore};
//! use strongbox_persistence::record::generate;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let record = generate("test", &mut StdRng::seed_from_u64(1));
//!
//! store.insert(&record).await?;
//! assert_eq!(store.find_by_name("test").await?, Some(record));
//!
//! let id = store.upload_blob("test", vec![1, 2, 3]).await?;
//! assert_eq!(store.download_blob(&id).await?, vec![1, 2, 3]);
//! # Ok::<(), strongbox_persistence::StoreError>(())
//! # });
//! ```

pub mod backend;
pub mod blob;
pub mod document;

// Re-export main types
pub use backend::{BackendKind, Store};
pub use blob::{BlobId, BlobMeta, BlobStore};
pub use document::{DocumentStore, InsertAck, WriteAck};
