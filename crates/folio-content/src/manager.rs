//! Content façade over permanent storage.

use std::sync::Arc;

use folio_types::{ContentId, ContentMetadata, ContentStorage, FileStats, FileStream};
use serde_json::Value;
use tracing::info;

use crate::Result;

/// Pass-through access to saved content objects and their files.
///
/// Storage not-found errors come back as `ContentError::ContentNotFound`
/// or `ContentError::FileNotFound`.
#[derive(Clone)]
pub struct ContentManager {
    storage: Arc<dyn ContentStorage>,
}

impl std::fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentManager").finish_non_exhaustive()
    }
}

impl ContentManager {
    pub fn new(storage: Arc<dyn ContentStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn ContentStorage> {
        &self.storage
    }

    // ── Content ─────────────────────────────────────────────────────────

    /// Write metadata and parameters, creating the object when `id` is `None`.
    pub async fn add_or_update_content(
        &self,
        metadata: &ContentMetadata,
        params: &Value,
        owner: &str,
        id: Option<&ContentId>,
    ) -> Result<ContentId> {
        let id = self.storage.add_content(metadata, params, owner, id).await?;
        info!(content_id = %id, title = %metadata.title, "Committed content");
        Ok(id)
    }

    pub async fn content_exists(&self, id: &ContentId) -> Result<bool> {
        Ok(self.storage.content_exists(id).await?)
    }

    pub async fn get_parameters(&self, id: &ContentId, owner: &str) -> Result<Value> {
        Ok(self.storage.get_parameters(id, owner).await?)
    }

    pub async fn get_metadata(&self, id: &ContentId, owner: &str) -> Result<ContentMetadata> {
        Ok(self.storage.get_metadata(id, owner).await?)
    }

    pub async fn delete_content(&self, id: &ContentId, owner: &str) -> Result<()> {
        self.storage.delete_content(id, owner).await?;
        info!(content_id = %id, "Deleted content");
        Ok(())
    }

    pub async fn list_content(&self) -> Result<Vec<ContentId>> {
        Ok(self.storage.list_content().await?)
    }

    // ── Files ───────────────────────────────────────────────────────────

    pub async fn add_content_file(
        &self,
        id: &ContentId,
        name: &str,
        stream: FileStream,
        owner: &str,
    ) -> Result<()> {
        Ok(self.storage.add_file(id, name, stream, owner).await?)
    }

    pub async fn content_file_exists(&self, id: &ContentId, name: &str) -> Result<bool> {
        Ok(self.storage.file_exists(id, name).await?)
    }

    pub async fn delete_content_file(&self, id: &ContentId, name: &str) -> Result<()> {
        Ok(self.storage.delete_file(id, name).await?)
    }

    pub async fn get_content_file_stream(
        &self,
        id: &ContentId,
        name: &str,
        owner: &str,
    ) -> Result<FileStream> {
        Ok(self.storage.get_file_stream(id, name, owner).await?)
    }

    pub async fn get_content_file_stats(
        &self,
        id: &ContentId,
        name: &str,
        owner: &str,
    ) -> Result<FileStats> {
        Ok(self.storage.get_file_stats(id, name, owner).await?)
    }

    pub async fn list_content_files(&self, id: &ContentId, owner: &str) -> Result<Vec<String>> {
        Ok(self.storage.list_files(id, owner).await?)
    }

    /// Apply the backend's filename rules.
    pub fn sanitize_filename(&self, name: &str) -> String {
        self.storage.sanitize_filename(name)
    }
}
