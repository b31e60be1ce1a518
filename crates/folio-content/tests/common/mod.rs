//! Shared fixture for reconciliation tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use folio_content::{ContentManager, ContentStorer, SaveReport, TemporaryFileManager};
use folio_semantics::{MemorySemanticsProvider, ReferenceScanner, Semantics};
use folio_storage::{MemoryContentStorage, MemoryTemporaryStorage};
use folio_types::{
    ContentId, ContentMetadata, ContentStorage, FileStream, LibraryName, TemporaryFileStorage,
};
use serde_json::{Value, json};

/// Owner used by every test.
pub const OWNER: &str = "U";

pub fn gallery() -> LibraryName {
    LibraryName::new("H5P.Gallery", 1, 0)
}

pub fn image_library() -> LibraryName {
    LibraryName::new("H5P.Image", 1, 1)
}

pub fn metadata() -> ContentMetadata {
    ContentMetadata::new("Gallery", &gallery())
}

pub fn stream(bytes: &[u8]) -> FileStream {
    Box::new(Cursor::new(bytes.to_vec()))
}

fn semantics() -> MemorySemanticsProvider {
    let gallery_semantics = Semantics::from_json(&json!([
        {"name": "title", "type": "text"},
        {"name": "image", "type": "image", "optional": true},
        {"name": "images", "type": "list", "optional": true, "field": {
            "name": "item", "type": "image"
        }},
        {"name": "video", "type": "video", "optional": true},
        {"name": "embedded", "type": "library", "optional": true, "options": ["H5P.Image 1.1"]}
    ]))
    .expect("gallery semantics");
    let image_semantics = Semantics::from_json(&json!([
        {"name": "file", "type": "image"},
        {"name": "alt", "type": "text"}
    ]))
    .expect("image semantics");

    MemorySemanticsProvider::new()
        .with_library(gallery(), gallery_semantics)
        .with_library(image_library(), image_semantics)
}

/// Engine wired to in-memory storage, with handles to both stores.
pub struct Fixture<C = MemoryContentStorage, T = MemoryTemporaryStorage> {
    pub content: Arc<C>,
    pub temporary: Arc<T>,
    pub storer: ContentStorer,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_storage(
            Arc::new(MemoryContentStorage::new()),
            Arc::new(MemoryTemporaryStorage::new()),
        )
    }
}

impl<C, T> Fixture<C, T>
where
    C: ContentStorage + 'static,
    T: TemporaryFileStorage + 'static,
{
    pub fn with_storage(content: Arc<C>, temporary: Arc<T>) -> Self {
        let storer = ContentStorer::new(
            ContentManager::new(content.clone()),
            TemporaryFileManager::new(temporary.clone(), Duration::from_secs(3600)),
            ReferenceScanner::new(Arc::new(semantics())),
        );
        Self {
            content,
            temporary,
            storer,
        }
    }

    /// Put a file into temporary storage under exactly `name`.
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.temporary
            .save_file(name, stream(bytes), OWNER, Utc::now() + chrono::Duration::hours(1))
            .await?;
        Ok(())
    }

    pub async fn save(&self, id: Option<&ContentId>, params: Value) -> Result<SaveReport> {
        Ok(self
            .storer
            .add_or_update_content(id, params, &metadata(), &gallery(), OWNER)
            .await?)
    }

    pub async fn committed(&self, id: &ContentId) -> Result<Value> {
        Ok(self.content.get_parameters(id, OWNER).await?)
    }

    pub async fn has_file(&self, id: &ContentId, name: &str) -> Result<bool> {
        Ok(self.content.file_exists(id, name).await?)
    }

    pub async fn has_upload(&self, name: &str) -> Result<bool> {
        Ok(self.temporary.file_exists(name, OWNER).await?)
    }
}

/// Count string values in `value` that still carry a `#tmp` marker.
pub fn marker_count(value: &Value) -> usize {
    match value {
        Value::String(s) if s.contains("#tmp") => 1,
        Value::Array(items) => items.iter().map(marker_count).sum(),
        Value::Object(map) => map.values().map(marker_count).sum(),
        _ => 0,
    }
}
