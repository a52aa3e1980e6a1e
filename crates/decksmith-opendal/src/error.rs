//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend cannot perform the operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            ErrorKind::Unsupported => Self::Unsupported(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

impl From<StorageError> for decksmith_core::Error {
    fn from(err: StorageError) -> Self {
        let base = match &err {
            StorageError::Init(_) => decksmith_core::Error::configuration(),
            _ => decksmith_core::Error::storage(),
        };
        base.with_message(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[test]
    fn converts_into_core_kinds() {
        let err: decksmith_core::Error = StorageError::init("bad root").into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: decksmith_core::Error = StorageError::unsupported("presign").into();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
