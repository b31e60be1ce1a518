//! Error types for the content lifecycle layer.

use folio_semantics::ScanError;
use folio_types::StorageError;
use thiserror::Error;

/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors surfaced by the content façade, the temporary file facade and the
/// reconciliation engine.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content not found: {id}")]
    ContentNotFound { id: String },

    #[error("File not found: {path} (content {id})")]
    FileNotFound { id: String, path: String },

    #[error("Temporary file not found: {name}")]
    TemporaryFileNotFound { name: String },

    #[error("Cannot generate a unique filename for {name}")]
    FilenameExhausted { name: String },

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    /// Whether the error means the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::ContentNotFound { .. }
                | ContentError::FileNotFound { .. }
                | ContentError::TemporaryFileNotFound { .. }
        )
    }
}

impl From<StorageError> for ContentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ContentNotFound(id) => ContentError::ContentNotFound { id },
            StorageError::FileNotFound { content_id, path } => {
                ContentError::FileNotFound { id: content_id, path }
            }
            StorageError::TemporaryFileNotFound(name) => ContentError::TemporaryFileNotFound { name },
            other => ContentError::Storage(other),
        }
    }
}
