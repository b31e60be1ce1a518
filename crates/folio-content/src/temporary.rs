//! Facade over ephemeral upload storage.
//!
//! Uploads land here before the content they belong to is saved. Each file
//! expires `lifetime` after upload; [`TemporaryFileManager::cleanup`] removes
//! expired files and is meant to be run periodically by whatever scheduler
//! the embedder uses.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use folio_config::TemporaryFilesConfig;
use folio_types::{FileStats, FileStream, TemporaryFileStorage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::filename::generate_unique_filename;

/// Result of an expiration sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResult {
    /// Number of tracked files inspected.
    pub files_checked: usize,
    /// Number of expired files removed.
    pub files_deleted: usize,
    /// Number of expired files whose deletion failed.
    pub files_failed: usize,
    /// `owner/filename` of every removed file.
    pub deleted_files: Vec<String>,
}

/// Adds, reads and expires uploads in temporary storage.
#[derive(Clone)]
pub struct TemporaryFileManager {
    storage: Arc<dyn TemporaryFileStorage>,
    lifetime: Duration,
}

impl std::fmt::Debug for TemporaryFileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryFileManager")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TemporaryFileManager {
    pub fn new(storage: Arc<dyn TemporaryFileStorage>, lifetime: Duration) -> Self {
        Self { storage, lifetime }
    }

    pub fn from_config(storage: Arc<dyn TemporaryFileStorage>, config: &TemporaryFilesConfig) -> Self {
        Self::new(storage, config.lifetime())
    }

    pub fn storage(&self) -> &Arc<dyn TemporaryFileStorage> {
        &self.storage
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Store an upload under a fresh name derived from `name`.
    ///
    /// Uniqueness is checked against the files visible to `owner`.
    /// Returns the assigned name.
    pub async fn add_file(&self, name: &str, stream: FileStream, owner: &str) -> Result<String> {
        let storage = &self.storage;
        let assigned = generate_unique_filename(
            name,
            |n| storage.sanitize_filename(n),
            |candidate| async move { storage.file_exists(&candidate, owner).await },
        )
        .await?;

        let lifetime = chrono::Duration::from_std(self.lifetime).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);

        let file = storage.save_file(&assigned, stream, owner, expires_at).await?;
        debug!(
            file = %file.filename,
            owner = %owner,
            expires_at = %file.expires_at,
            "Stored temporary file"
        );
        Ok(file.filename)
    }

    pub async fn get_file_stream(&self, name: &str, owner: &str) -> Result<FileStream> {
        Ok(self.storage.get_file_stream(name, owner).await?)
    }

    pub async fn file_exists(&self, name: &str, owner: &str) -> Result<bool> {
        Ok(self.storage.file_exists(name, owner).await?)
    }

    pub async fn delete_file(&self, name: &str, owner: &str) -> Result<()> {
        Ok(self.storage.delete_file(name, owner).await?)
    }

    pub async fn get_file_stats(&self, name: &str, owner: &str) -> Result<FileStats> {
        Ok(self.storage.get_file_stats(name, owner).await?)
    }

    /// Delete every tracked file whose expiry lies in the past.
    ///
    /// Failed deletions are logged and counted; the sweep continues.
    pub async fn cleanup(&self) -> Result<CleanupResult> {
        let now = Utc::now();
        let files = self.storage.list_files(None).await?;
        let mut result = CleanupResult {
            files_checked: files.len(),
            ..Default::default()
        };

        for file in files.into_iter().filter(|f| f.is_expired_at(now)) {
            match self
                .storage
                .delete_file(&file.filename, &file.owned_by_user_id)
                .await
            {
                Ok(()) => {
                    debug!(file = %file.filename, owner = %file.owned_by_user_id, "Deleted expired temporary file");
                    result.files_deleted += 1;
                    result
                        .deleted_files
                        .push(format!("{}/{}", file.owned_by_user_id, file.filename));
                }
                Err(e) => {
                    warn!(
                        file = %file.filename,
                        owner = %file.owned_by_user_id,
                        error = %e,
                        "Failed to delete expired temporary file"
                    );
                    result.files_failed += 1;
                }
            }
        }

        info!(
            checked = result.files_checked,
            deleted = result.files_deleted,
            failed = result.files_failed,
            "Temporary file cleanup complete"
        );
        Ok(result)
    }
}
