//! Error types for the probe.

#![allow(missing_docs)]

use std::fmt;

use strongbox_persistence::StoreError;
use strongbox_persistence::core::BlobId;
use thiserror::Error;

use crate::probe::{ProbeState, StepOutcome};

/// Why a probe step failed.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The synthetic image could not be encoded or decoded.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The record was not found right after it was written.
    #[error("record '{name}' was not found")]
    RecordMissing { name: String },

    /// The record read back differs from the one written last.
    #[error("record '{name}' read back does not match the replacement")]
    RecordMismatch { name: String },

    /// No blob with the test name was found right after upload.
    #[error("blob '{filename}' was not found after upload")]
    BlobMissing { filename: String },

    /// The filename lookup returned a different blob than the one uploaded.
    #[error("blob '{filename}' resolved to {found}, expected the upload {expected}")]
    BlobIdMismatch {
        filename: String,
        expected: BlobId,
        found: BlobId,
    },

    /// The downloaded blob decodes to different pixels than were uploaded.
    #[error("blob '{filename}' does not decode to the uploaded image")]
    BlobMismatch { filename: String },
}

/// Errors encoding or decoding the synthetic image.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The PNG encoder failed.
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),

    /// The bytes are not a readable PNG.
    #[error("failed to decode PNG: {0}")]
    Decode(#[from] png::DecodingError),

    /// The PNG decoded, but not as 8-bit RGBA.
    #[error("unsupported PNG layout: {color_type:?} at {bit_depth:?}")]
    UnsupportedLayout {
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },

    /// Width or height is zero, or the pixel buffer does not match them.
    #[error("invalid image dimensions {width}x{height} for {len} bytes")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

/// A probe run that stopped in [`ProbeState::Failed`].
#[derive(Debug)]
pub struct ProbeFailure {
    /// The step that was running when the failure happened.
    pub failed_state: ProbeState,

    /// Steps that completed before the failure, in order.
    pub completed: Vec<StepOutcome>,

    /// The error that stopped the run.
    pub error: ProbeError,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe failed while {}: {}", self.failed_state, self.error)
    }
}

impl std::error::Error for ProbeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use strongbox_persistence::error::BlobError;

    use super::*;

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::RecordMismatch {
            name: "test".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "record 'test' read back does not match the replacement"
        );
    }

    #[test]
    fn test_store_errors_pass_through_verbatim() {
        let err: ProbeError = StoreError::from(BlobError::NotFound {
            id: "abc".to_string(),
        })
        .into();
        assert_eq!(err.to_string(), "blob not found: abc");
    }

    #[test]
    fn test_failure_names_state() {
        let failure = ProbeFailure {
            failed_state: ProbeState::Replacing,
            completed: Vec::new(),
            error: ProbeError::BlobMissing {
                filename: "test".to_string(),
            },
        };
        assert_eq!(
            failure.to_string(),
            "probe failed while replacing: blob 'test' was not found after upload"
        );
    }
}
