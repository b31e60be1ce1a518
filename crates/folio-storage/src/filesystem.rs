//! Local filesystem storage adapters.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_types::{
    ContentId, ContentMetadata, ContentStorage, FileStats, FileStream, Result, StorageError,
    TemporaryFile, TemporaryFileStorage, UNIQUE_SUFFIX_LENGTH,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::paths::{sanitize_filename, validate_relative_path, validate_segment};

/// Metadata file of a content object.
const METADATA_FILE: &str = "h5p.json";

/// Parameters file of a content object.
const PARAMETERS_FILE: &str = "content.json";

/// Directory holding a content object's attached files.
const FILES_DIR: &str = "content";

/// Longest relative path given to a content file.
const MAX_CONTENT_PATH_LENGTH: usize = 255;

/// Suffix of the sidecar file describing a temporary upload.
const TEMPORARY_METADATA_SUFFIX: &str = ".metadata";

async fn exists(path: &Path) -> Result<bool> {
    Ok(fs::try_exists(path).await?)
}

async fn file_stats(path: &Path) -> Result<FileStats> {
    let metadata = fs::metadata(path).await?;
    let birthtime = metadata.created().or_else(|_| metadata.modified())?;
    Ok(FileStats {
        size: metadata.len(),
        birthtime: DateTime::<Utc>::from(birthtime),
    })
}

async fn write_stream(path: &Path, mut stream: FileStream) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = fs::File::create(path).await?;
    tokio::io::copy(&mut stream, &mut file).await?;
    Ok(())
}

/// List regular files below `root` as `/`-separated relative paths, sorted.
async fn list_relative_files(root: PathBuf) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&root).min_depth(1) {
            let entry = entry.map_err(|e| {
                std::io::Error::other(format!("walking {}: {}", root.display(), e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&root) {
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                files.push(parts.join("/"));
            }
        }
        files.sort();
        Ok(files)
    })
    .await
    .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}

// ─────────────────────────────────────────────────────────────────────────────
// Permanent content storage
// ─────────────────────────────────────────────────────────────────────────────

/// Permanent content storage in a local directory.
#[derive(Debug, Clone)]
pub struct FileContentStorage {
    root: PathBuf,
}

impl FileContentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn content_dir(&self, id: &ContentId) -> Result<PathBuf> {
        Ok(self.root.join(validate_segment(id.as_str())?))
    }

    fn file_path(&self, id: &ContentId, name: &str) -> Result<PathBuf> {
        Ok(self
            .content_dir(id)?
            .join(FILES_DIR)
            .join(validate_relative_path(name)?))
    }

    async fn require_content(&self, id: &ContentId) -> Result<PathBuf> {
        let dir = self.content_dir(id)?;
        if !exists(&dir.join(METADATA_FILE)).await? {
            return Err(StorageError::ContentNotFound(id.to_string()));
        }
        Ok(dir)
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(&self, id: &ContentId, file: &str) -> Result<T> {
        let dir = self.require_content(id).await?;
        let bytes = fs::read(dir.join(file)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ContentStorage for FileContentStorage {
    async fn add_content(
        &self,
        metadata: &ContentMetadata,
        params: &Value,
        _owner: &str,
        id: Option<&ContentId>,
    ) -> Result<ContentId> {
        let id = id
            .cloned()
            .unwrap_or_else(|| ContentId::new(uuid::Uuid::new_v4().simple().to_string()));
        let dir = self.content_dir(&id)?;
        fs::create_dir_all(&dir).await?;

        fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(metadata)?).await?;
        fs::write(dir.join(PARAMETERS_FILE), serde_json::to_vec(params)?).await?;

        debug!(content_id = %id, path = %dir.display(), "Wrote content object");
        Ok(id)
    }

    async fn content_exists(&self, id: &ContentId) -> Result<bool> {
        exists(&self.content_dir(id)?.join(METADATA_FILE)).await
    }

    async fn delete_content(&self, id: &ContentId, _owner: &str) -> Result<()> {
        let dir = self.require_content(id).await?;
        fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    async fn get_parameters(&self, id: &ContentId, _owner: &str) -> Result<Value> {
        self.read_json(id, PARAMETERS_FILE).await
    }

    async fn get_metadata(&self, id: &ContentId, _owner: &str) -> Result<ContentMetadata> {
        self.read_json(id, METADATA_FILE).await
    }

    async fn list_content(&self) -> Result<Vec<ContentId>> {
        if !exists(&self.root).await? {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if exists(&entry.path().join(METADATA_FILE)).await? {
                ids.push(ContentId::new(entry.file_name().to_string_lossy()));
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn add_file(
        &self,
        id: &ContentId,
        name: &str,
        stream: FileStream,
        _owner: &str,
    ) -> Result<()> {
        self.require_content(id).await?;
        let path = self.file_path(id, name)?;
        write_stream(&path, stream).await
    }

    async fn delete_file(&self, id: &ContentId, name: &str) -> Result<()> {
        let path = self.file_path(id, name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn file_exists(&self, id: &ContentId, name: &str) -> Result<bool> {
        exists(&self.file_path(id, name)?).await
    }

    async fn get_file_stream(
        &self,
        id: &ContentId,
        name: &str,
        _owner: &str,
    ) -> Result<FileStream> {
        let path = self.file_path(id, name)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_file_stats(&self, id: &ContentId, name: &str, _owner: &str) -> Result<FileStats> {
        let path = self.file_path(id, name)?;
        if !exists(&path).await? {
            return Err(StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            });
        }
        file_stats(&path).await
    }

    async fn list_files(&self, id: &ContentId, _owner: &str) -> Result<Vec<String>> {
        let dir = self.require_content(id).await?.join(FILES_DIR);
        if !exists(&dir).await? {
            return Ok(Vec::new());
        }
        list_relative_files(dir).await
    }

    fn sanitize_filename(&self, name: &str) -> String {
        sanitize_filename(name, MAX_CONTENT_PATH_LENGTH - UNIQUE_SUFFIX_LENGTH)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Temporary file storage
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemporaryFileSidecar {
    owned_by_user_id: String,
    expires_at: DateTime<Utc>,
}

/// Temporary uploads in a local directory, one subdirectory per owner.
#[derive(Debug, Clone)]
pub struct DirectoryTemporaryStorage {
    root: PathBuf,
    max_filename_length: usize,
}

impl DirectoryTemporaryStorage {
    pub fn new(root: impl Into<PathBuf>, max_filename_length: usize) -> Self {
        Self {
            root: root.into(),
            max_filename_length,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, name: &str, owner: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(validate_segment(owner)?)
            .join(validate_relative_path(name)?))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(TEMPORARY_METADATA_SUFFIX);
        PathBuf::from(name)
    }

    fn not_found(name: &str) -> StorageError {
        StorageError::TemporaryFileNotFound(name.to_string())
    }

    async fn list_owner(&self, owner: &str) -> Result<Vec<TemporaryFile>> {
        let dir = self.root.join(validate_segment(owner)?);
        if !exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for name in list_relative_files(dir.clone()).await? {
            let Some(filename) = name.strip_suffix(TEMPORARY_METADATA_SUFFIX) else {
                continue;
            };
            let sidecar = match fs::read(dir.join(&name)).await {
                Ok(bytes) => serde_json::from_slice::<TemporaryFileSidecar>(&bytes),
                Err(e) => {
                    warn!(owner = %owner, file = %name, error = %e, "Unreadable temporary file metadata");
                    continue;
                }
            };
            match sidecar {
                Ok(sidecar) => files.push(TemporaryFile::new(
                    filename,
                    sidecar.owned_by_user_id,
                    sidecar.expires_at,
                )),
                Err(e) => {
                    warn!(owner = %owner, file = %name, error = %e, "Corrupt temporary file metadata");
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl TemporaryFileStorage for DirectoryTemporaryStorage {
    async fn save_file(
        &self,
        name: &str,
        stream: FileStream,
        owner: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TemporaryFile> {
        let path = self.file_path(name, owner)?;
        write_stream(&path, stream).await?;

        let sidecar = TemporaryFileSidecar {
            owned_by_user_id: owner.to_string(),
            expires_at,
        };
        fs::write(Self::sidecar_path(&path), serde_json::to_vec(&sidecar)?).await?;

        Ok(TemporaryFile::new(name, owner, expires_at))
    }

    async fn file_exists(&self, name: &str, owner: &str) -> Result<bool> {
        exists(&self.file_path(name, owner)?).await
    }

    async fn get_file_stream(&self, name: &str, owner: &str) -> Result<FileStream> {
        let path = self.file_path(name, owner)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Self::not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_file_stats(&self, name: &str, owner: &str) -> Result<FileStats> {
        let path = self.file_path(name, owner)?;
        if !exists(&path).await? {
            return Err(Self::not_found(name));
        }
        file_stats(&path).await
    }

    async fn delete_file(&self, name: &str, owner: &str) -> Result<()> {
        let path = self.file_path(name, owner)?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Self::not_found(name)),
            Err(e) => return Err(e.into()),
        }
        if let Err(e) = fs::remove_file(Self::sidecar_path(&path)).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(file = %name, error = %e, "Failed to remove temporary file metadata");
        }
        Ok(())
    }

    async fn list_files(&self, owner: Option<&str>) -> Result<Vec<TemporaryFile>> {
        if let Some(owner) = owner {
            return self.list_owner(owner).await;
        }
        if !exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let owner = entry.file_name().to_string_lossy().into_owned();
            files.extend(self.list_owner(&owner).await?);
        }
        Ok(files)
    }

    fn sanitize_filename(&self, name: &str) -> String {
        sanitize_filename(
            name,
            self.max_filename_length.saturating_sub(UNIQUE_SUFFIX_LENGTH),
        )
    }
}
