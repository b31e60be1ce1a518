//! Error types shared by storage backends.

use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by permanent and temporary storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("File not found: {path} (content {content_id})")]
    FileNotFound { content_id: String, path: String },

    #[error("Temporary file not found: {0}")]
    TemporaryFileNotFound(String),

    #[error("Access denied to {path} for user {user}")]
    AccessDenied { path: String, user: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StorageError {
    /// Whether the error means the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::ContentNotFound(_)
            | StorageError::FileNotFound { .. }
            | StorageError::TemporaryFileNotFound(_) => true,
            StorageError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
