//! Error types for the persistence layer.
//!
//! Errors are grouped by the stage that produced them: resolving the store
//! host, establishing a session, encoding or decoding records, addressing
//! blobs, and the transport underneath every individual operation.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Host resolution errors
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Session establishment errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Record-level errors
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Blob addressing errors
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Transport errors raised by the backend during an operation
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// Returns `true` if this error means the referenced blob does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Blob(BlobError::NotFound { .. }))
    }

    /// Returns `true` if this error is a uniqueness violation on insert.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::Record(RecordError::DuplicateKey { .. }))
    }
}

/// Errors raised while turning a symbolic host into a usable address.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The resolver itself failed.
    #[error("failed to resolve host '{host}': {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The host resolved, but not to any IPv4 address.
    #[error("host '{host}' has no IPv4 address")]
    NoIpv4Address { host: String },
}

/// Errors raised while establishing or authenticating a session.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The connection descriptor could not be turned into a valid session
    /// configuration.
    #[error("invalid connection descriptor: {message}")]
    InvalidDescriptor { message: String },

    /// The server could not be reached.
    #[error("connection failed to {backend_name}: {message}")]
    Unreachable {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected the supplied credentials.
    #[error("authentication rejected by {backend_name}: {message}")]
    AuthenticationFailed {
        backend_name: String,
        message: String,
    },
}

/// Errors tied to a record's identity or wire form.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A record with the same name already exists and the store enforces
    /// uniqueness.
    #[error("duplicate key: a record named '{name}' already exists")]
    DuplicateKey { name: String },

    /// A stored document could not be decoded into a record.
    #[error("failed to decode field '{field}': {message}")]
    Decode { field: String, message: String },
}

/// Errors addressing a blob.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No blob exists with the given id.
    #[error("blob not found: {id}")]
    NotFound { id: String },
}

/// Errors originating from the backend while an operation was in flight.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The operation failed in transport or on the server.
    #[error("{operation} failed on {backend_name}: {message}")]
    Transport {
        backend_name: String,
        operation: StoreOperation,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation exceeded the deadline configured on the connection.
    #[error("{operation} timed out on {backend_name}")]
    Timeout {
        backend_name: String,
        operation: StoreOperation,
    },
}

/// Identifies a store operation, for error context and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Document insert.
    Insert,
    /// Document replace by name.
    Replace,
    /// Document lookup by name.
    Find,
    /// Document delete by name.
    Delete,
    /// Blob upload.
    UploadBlob,
    /// Blob lookup by filename.
    FindBlob,
    /// Blob download by id.
    DownloadBlob,
    /// Blob delete by id.
    DeleteBlob,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Insert => "insert",
            StoreOperation::Replace => "replace",
            StoreOperation::Find => "find",
            StoreOperation::Delete => "delete",
            StoreOperation::UploadBlob => "upload-blob",
            StoreOperation::FindBlob => "find-blob",
            StoreOperation::DownloadBlob => "download-blob",
            StoreOperation::DeleteBlob => "delete-blob",
        };
        write!(f, "{}", name)
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_is_transparent() {
        let err = StoreError::Blob(BlobError::NotFound {
            id: "65f0c0ffee".to_string(),
        });
        assert_eq!(err.to_string(), "blob not found: 65f0c0ffee");
        assert!(err.is_not_found());
        assert!(!err.is_duplicate_key());
    }

    #[test]
    fn test_resolution_error_display() {
        let err = ResolutionError::NoIpv4Address {
            host: "db.internal".to_string(),
        };
        assert_eq!(err.to_string(), "host 'db.internal' has no IPv4 address");
    }

    #[test]
    fn test_backend_error_names_operation() {
        let err = BackendError::Transport {
            backend_name: "mongodb".to_string(),
            operation: StoreOperation::Replace,
            message: "connection reset".to_string(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "replace failed on mongodb: connection reset"
        );

        let err = BackendError::Timeout {
            backend_name: "mongodb".to_string(),
            operation: StoreOperation::DownloadBlob,
        };
        assert_eq!(err.to_string(), "download-blob timed out on mongodb");
    }

    #[test]
    fn test_store_error_from_category_errors() {
        let err: StoreError = RecordError::DuplicateKey {
            name: "test".to_string(),
        }
        .into();
        assert!(err.is_duplicate_key());

        let err: StoreError = ConnectionError::InvalidDescriptor {
            message: "empty host".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn test_operations_cover_store_calls() {
        let names: Vec<String> = [
            StoreOperation::Insert,
            StoreOperation::Replace,
            StoreOperation::Find,
            StoreOperation::Delete,
            StoreOperation::UploadBlob,
            StoreOperation::FindBlob,
            StoreOperation::DownloadBlob,
            StoreOperation::DeleteBlob,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            names,
            vec![
                "insert",
                "replace",
                "find",
                "delete",
                "upload-blob",
                "find-blob",
                "download-blob",
                "delete-blob",
            ]
        );
    }
}
