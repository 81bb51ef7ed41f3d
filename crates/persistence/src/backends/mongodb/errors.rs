//! Classification of driver errors into the store error taxonomy.

use ::mongodb::error::{
    CommandError, Error as DriverError, ErrorKind, GridFsErrorKind, WriteError, WriteFailure,
};

use crate::error::{
    BackendError, BlobError, ConnectionError, RecordError, StoreError, StoreOperation,
};

pub(super) const BACKEND_NAME: &str = "mongodb";

const DUPLICATE_KEY_CODE: i32 = 11000;
const AUTHENTICATION_FAILED_CODE: i32 = 18;

/// Maps an error raised while opening or pinging a session.
pub(super) fn connect_error(err: DriverError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::InvalidArgument { message, .. } => ConnectionError::InvalidDescriptor {
            message: message.clone(),
        }
        .into(),
        ErrorKind::Authentication { message, .. } => ConnectionError::AuthenticationFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: message.clone(),
        }
        .into(),
        ErrorKind::Command(CommandError { code, message, .. })
            if *code == AUTHENTICATION_FAILED_CODE =>
        {
            ConnectionError::AuthenticationFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: message.clone(),
            }
            .into()
        }
        _ => ConnectionError::Unreachable {
            backend_name: BACKEND_NAME.to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
        .into(),
    }
}

/// Maps an error raised by an insert, turning uniqueness violations into
/// [`RecordError::DuplicateKey`].
pub(super) fn insert_error(name: &str, err: DriverError) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) = err.kind.as_ref()
    {
        if *code == DUPLICATE_KEY_CODE {
            return RecordError::DuplicateKey {
                name: name.to_string(),
            }
            .into();
        }
    }
    operation_error(StoreOperation::Insert, err)
}

/// Maps an error raised by a GridFS call that addresses a blob by id.
pub(super) fn blob_error(operation: StoreOperation, id: &str, err: DriverError) -> StoreError {
    if is_file_not_found(&err) {
        return BlobError::NotFound { id: id.to_string() }.into();
    }
    operation_error(operation, err)
}

pub(super) fn is_file_not_found(err: &DriverError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::GridFs(GridFsErrorKind::FileNotFound { .. })
    )
}

/// Maps any other driver error raised during `operation`.
pub(super) fn operation_error(operation: StoreOperation, err: DriverError) -> StoreError {
    let timed_out = match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } => true,
        ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
        _ => false,
    };

    if timed_out {
        return BackendError::Timeout {
            backend_name: BACKEND_NAME.to_string(),
            operation,
        }
        .into();
    }

    BackendError::Transport {
        backend_name: BACKEND_NAME.to_string(),
        operation,
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
    .into()
}

/// Maps an I/O error raised while streaming blob contents.
pub(super) fn stream_error(operation: StoreOperation, err: std::io::Error) -> StoreError {
    if err.kind() == std::io::ErrorKind::TimedOut {
        return BackendError::Timeout {
            backend_name: BACKEND_NAME.to_string(),
            operation,
        }
        .into();
    }

    BackendError::Transport {
        backend_name: BACKEND_NAME.to_string(),
        operation,
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
    .into()
}
