//! Shared types for the Folio content system.
//!
//! The capability traits for permanent and temporary storage live here so
//! that the storage adapters (`folio-storage`) and the lifecycle engine
//! (`folio-content`) can depend on them without depending on each other.

pub mod content;
pub mod error;
pub mod storage;
pub mod temporary;

pub use content::{ContentId, ContentMetadata, LibraryName, LibraryNameError};
pub use error::{Result, StorageError};
pub use storage::{ContentStorage, FileStream, TemporaryFileStorage, UNIQUE_SUFFIX_LENGTH};
pub use temporary::{FileStats, TemporaryFile};
