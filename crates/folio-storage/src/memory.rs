//! In-memory storage adapters.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_types::{
    ContentId, ContentMetadata, ContentStorage, FileStats, FileStream, Result, StorageError,
    TemporaryFile, TemporaryFileStorage,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    birthtime: DateTime<Utc>,
}

impl StoredFile {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            birthtime: Utc::now(),
        }
    }

    fn stats(&self) -> FileStats {
        FileStats {
            size: self.bytes.len() as u64,
            birthtime: self.birthtime,
        }
    }

    fn stream(&self) -> FileStream {
        Box::new(Cursor::new(self.bytes.clone()))
    }
}

async fn read_all(mut stream: FileStream) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[derive(Debug, Clone)]
struct StoredContent {
    metadata: ContentMetadata,
    params: Value,
    files: BTreeMap<String, StoredFile>,
}

/// In-memory permanent content storage.
#[derive(Debug, Default)]
pub struct MemoryContentStorage {
    contents: Mutex<HashMap<ContentId, StoredContent>>,
}

impl MemoryContentStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes of a stored file, for inspection.
    pub fn file_bytes(&self, id: &ContentId, name: &str) -> Option<Vec<u8>> {
        self.contents
            .lock()
            .get(id)
            .and_then(|c| c.files.get(name))
            .map(|f| f.bytes.clone())
    }

    /// Number of stored content objects.
    pub fn len(&self) -> usize {
        self.contents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.lock().is_empty()
    }
}

#[async_trait]
impl ContentStorage for MemoryContentStorage {
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

        let mut contents = self.contents.lock();
        match contents.get_mut(&id) {
            Some(existing) => {
                existing.metadata = metadata.clone();
                existing.params = params.clone();
            }
            None => {
                contents.insert(
                    id.clone(),
                    StoredContent {
                        metadata: metadata.clone(),
                        params: params.clone(),
                        files: BTreeMap::new(),
                    },
                );
            }
        }
        Ok(id)
    }

    async fn content_exists(&self, id: &ContentId) -> Result<bool> {
        Ok(self.contents.lock().contains_key(id))
    }

    async fn delete_content(&self, id: &ContentId, _owner: &str) -> Result<()> {
        self.contents
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))
    }

    async fn get_parameters(&self, id: &ContentId, _owner: &str) -> Result<Value> {
        self.contents
            .lock()
            .get(id)
            .map(|c| c.params.clone())
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))
    }

    async fn get_metadata(&self, id: &ContentId, _owner: &str) -> Result<ContentMetadata> {
        self.contents
            .lock()
            .get(id)
            .map(|c| c.metadata.clone())
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))
    }

    async fn list_content(&self) -> Result<Vec<ContentId>> {
        let mut ids: Vec<_> = self.contents.lock().keys().cloned().collect();
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
        if !self.contents.lock().contains_key(id) {
            return Err(StorageError::ContentNotFound(id.to_string()));
        }
        let bytes = read_all(stream).await?;

        let mut contents = self.contents.lock();
        let content = contents
            .get_mut(id)
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))?;
        content.files.insert(name.to_string(), StoredFile::new(bytes));
        Ok(())
    }

    async fn delete_file(&self, id: &ContentId, name: &str) -> Result<()> {
        let mut contents = self.contents.lock();
        let content = contents
            .get_mut(id)
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))?;
        content
            .files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            })
    }

    async fn file_exists(&self, id: &ContentId, name: &str) -> Result<bool> {
        Ok(self
            .contents
            .lock()
            .get(id)
            .is_some_and(|c| c.files.contains_key(name)))
    }

    async fn get_file_stream(
        &self,
        id: &ContentId,
        name: &str,
        _owner: &str,
    ) -> Result<FileStream> {
        self.contents
            .lock()
            .get(id)
            .and_then(|c| c.files.get(name))
            .map(StoredFile::stream)
            .ok_or_else(|| StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            })
    }

    async fn get_file_stats(&self, id: &ContentId, name: &str, _owner: &str) -> Result<FileStats> {
        self.contents
            .lock()
            .get(id)
            .and_then(|c| c.files.get(name))
            .map(StoredFile::stats)
            .ok_or_else(|| StorageError::FileNotFound {
                content_id: id.to_string(),
                path: name.to_string(),
            })
    }

    async fn list_files(&self, id: &ContentId, _owner: &str) -> Result<Vec<String>> {
        self.contents
            .lock()
            .get(id)
            .map(|c| c.files.keys().cloned().collect())
            .ok_or_else(|| StorageError::ContentNotFound(id.to_string()))
    }
}

#[derive(Debug, Clone)]
struct StoredTemporaryFile {
    file: StoredFile,
    expires_at: DateTime<Utc>,
}

/// In-memory temporary file storage, namespaced per owner.
#[derive(Debug, Default)]
pub struct MemoryTemporaryStorage {
    /// Keyed by (owner, filename).
    files: Mutex<BTreeMap<(String, String), StoredTemporaryFile>>,
}

impl MemoryTemporaryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes of a stored file, for inspection.
    pub fn file_bytes(&self, name: &str, owner: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .get(&(owner.to_string(), name.to_string()))
            .map(|f| f.file.bytes.clone())
    }

    fn not_found(name: &str) -> StorageError {
        StorageError::TemporaryFileNotFound(name.to_string())
    }
}

#[async_trait]
impl TemporaryFileStorage for MemoryTemporaryStorage {
    async fn save_file(
        &self,
        name: &str,
        stream: FileStream,
        owner: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TemporaryFile> {
        let bytes = read_all(stream).await?;
        self.files.lock().insert(
            (owner.to_string(), name.to_string()),
            StoredTemporaryFile {
                file: StoredFile::new(bytes),
                expires_at,
            },
        );
        Ok(TemporaryFile::new(name, owner, expires_at))
    }

    async fn file_exists(&self, name: &str, owner: &str) -> Result<bool> {
        Ok(self
            .files
            .lock()
            .contains_key(&(owner.to_string(), name.to_string())))
    }

    async fn get_file_stream(&self, name: &str, owner: &str) -> Result<FileStream> {
        self.files
            .lock()
            .get(&(owner.to_string(), name.to_string()))
            .map(|f| f.file.stream())
            .ok_or_else(|| Self::not_found(name))
    }

    async fn get_file_stats(&self, name: &str, owner: &str) -> Result<FileStats> {
        self.files
            .lock()
            .get(&(owner.to_string(), name.to_string()))
            .map(|f| f.file.stats())
            .ok_or_else(|| Self::not_found(name))
    }

    async fn delete_file(&self, name: &str, owner: &str) -> Result<()> {
        self.files
            .lock()
            .remove(&(owner.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(name))
    }

    async fn list_files(&self, owner: Option<&str>) -> Result<Vec<TemporaryFile>> {
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|((file_owner, _), _)| owner.is_none_or(|o| o == file_owner))
            .map(|((file_owner, name), f)| TemporaryFile::new(name, file_owner, f.expires_at))
            .collect())
    }
}
