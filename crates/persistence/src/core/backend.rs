//! Backend identification.
//!
//! This module defines the [`Store`] trait, implemented by every backend that
//! offers both a document collection and a blob bucket.

use std::fmt::Debug;

use super::{BlobStore, DocumentStore};

/// Identifies the type of store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// MongoDB collection plus GridFS bucket.
    MongoDB,
    /// In-process store.
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::MongoDB => write!(f, "mongodb"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// A backend that owns both a document collection and a blob bucket.
///
/// The two halves are addressed independently: a record and a blob sharing a
/// name are unrelated as far as the store is concerned.
pub trait Store: DocumentStore + BlobStore + Debug {
    /// Returns the kind of this backend.
    fn kind(&self) -> BackendKind;

    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::MongoDB.to_string(), "mongodb");
        assert_eq!(BackendKind::Memory.to_string(), "memory");
    }
}
