use folio_types::LibraryName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Semantics not found for library {0}")]
    SemanticsNotFound(LibraryName),

    #[error("Invalid semantics: {0}")]
    InvalidSemantics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
