//! Storage capability traits.
//!
//! The lifecycle engine consumes two independently owned storage systems:
//!
//! ```text
//! ContentStorage (trait)          - Permanent content objects and their files
//!     └── FileContentStorage      - Local filesystem layout
//!     └── MemoryContentStorage    - In-memory store for testing
//!
//! TemporaryFileStorage (trait)    - Ephemeral, per-owner, expiring uploads
//!     └── DirectoryTemporaryStorage
//!     └── MemoryTemporaryStorage
//! ```
//!
//! Implementations live in `folio-storage`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::io::AsyncRead;

use crate::content::{ContentId, ContentMetadata};
use crate::temporary::{FileStats, TemporaryFile};
use crate::Result;

/// Bytes a generated `-<token>` suffix adds to a sanitized filename.
///
/// Backends with a length limit reserve this much room in
/// `sanitize_filename`.
pub const UNIQUE_SUFFIX_LENGTH: usize = 9;

/// Byte stream handed between storage backends.
pub type FileStream = Box<dyn AsyncRead + Send + Unpin>;

/// Permanent storage for content objects and their attached files.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    // ── Content Operations ──────────────────────────────────────────────

    /// Create or overwrite a content object.
    ///
    /// When `id` is `None` the backend assigns a fresh identifier.
    async fn add_content(
        &self,
        metadata: &ContentMetadata,
        params: &Value,
        owner: &str,
        id: Option<&ContentId>,
    ) -> Result<ContentId>;

    /// Check whether a content object exists.
    async fn content_exists(&self, id: &ContentId) -> Result<bool>;

    /// Delete a content object together with all of its files.
    async fn delete_content(&self, id: &ContentId, owner: &str) -> Result<()>;

    /// Get the parameter tree of a content object.
    async fn get_parameters(&self, id: &ContentId, owner: &str) -> Result<Value>;

    /// Get the metadata record of a content object.
    async fn get_metadata(&self, id: &ContentId, owner: &str) -> Result<ContentMetadata>;

    /// List the identifiers of all stored content objects.
    async fn list_content(&self) -> Result<Vec<ContentId>>;

    // ── File Operations ─────────────────────────────────────────────────

    /// Store a file under `name` in the content object's namespace.
    async fn add_file(
        &self,
        id: &ContentId,
        name: &str,
        stream: FileStream,
        owner: &str,
    ) -> Result<()>;

    /// Delete a file. Missing files are reported as `FileNotFound`.
    async fn delete_file(&self, id: &ContentId, name: &str) -> Result<()>;

    /// Check whether a file exists in the content object's namespace.
    async fn file_exists(&self, id: &ContentId, name: &str) -> Result<bool>;

    /// Open a file for reading.
    async fn get_file_stream(&self, id: &ContentId, name: &str, owner: &str)
    -> Result<FileStream>;

    /// Size and creation time of a file.
    async fn get_file_stats(&self, id: &ContentId, name: &str, owner: &str) -> Result<FileStats>;

    /// List all files attached to a content object (relative paths).
    async fn list_files(&self, id: &ContentId, owner: &str) -> Result<Vec<String>>;

    /// Backend-specific filename cleanup applied before a unique suffix is
    /// added. Defaults to the identity.
    fn sanitize_filename(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Ephemeral storage for uploads not yet attached to saved content.
///
/// Ownership is enforced here: reads and deletes by a user other than the
/// owner fail with `AccessDenied` or `TemporaryFileNotFound`.
#[async_trait]
pub trait TemporaryFileStorage: Send + Sync {
    /// Store a file that expires at `expires_at`.
    async fn save_file(
        &self,
        name: &str,
        stream: FileStream,
        owner: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TemporaryFile>;

    /// Check whether `owner` can see a file with this name.
    async fn file_exists(&self, name: &str, owner: &str) -> Result<bool>;

    /// Open a file for reading.
    async fn get_file_stream(&self, name: &str, owner: &str) -> Result<FileStream>;

    /// Size and creation time of a file.
    async fn get_file_stats(&self, name: &str, owner: &str) -> Result<FileStats>;

    /// Delete a file owned by `owner`.
    async fn delete_file(&self, name: &str, owner: &str) -> Result<()>;

    /// List tracked files, optionally restricted to one owner.
    async fn list_files(&self, owner: Option<&str>) -> Result<Vec<TemporaryFile>>;

    /// Backend-specific filename cleanup applied before a unique suffix is
    /// added. Defaults to the identity.
    fn sanitize_filename(&self, name: &str) -> String {
        name.to_string()
    }
}
