//! CLI command handlers.

pub mod cleanup;
pub mod config;
pub mod copy;
pub mod delete;
pub mod list;
pub mod save;
pub mod scan;
pub mod upload;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use folio_config::{ConfigSource, FolioConfig};
use folio_content::{ContentManager, ContentStorer, TemporaryFileManager};
use folio_semantics::{DirectorySemanticsProvider, ReferenceScanner};
use folio_storage::{DirectoryTemporaryStorage, FileContentStorage};
use serde::de::DeserializeOwned;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration.
    pub config: FolioConfig,
    /// Config layers that were checked, lowest precedence first.
    pub config_sources: Vec<ConfigSource>,
    /// Config directory given on the command line or through the environment.
    pub config_dir: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Façade over the configured temporary upload directory.
    pub fn temporary(&self) -> TemporaryFileManager {
        let storage = self.config.storage();
        let settings = self.config.temporary_files();
        TemporaryFileManager::from_config(
            Arc::new(DirectoryTemporaryStorage::new(
                storage.temporary_path,
                settings.max_filename_length,
            )),
            &settings,
        )
    }

    /// Façade over the configured content directory.
    pub fn content(&self) -> ContentManager {
        ContentManager::new(Arc::new(FileContentStorage::new(
            self.config.storage().content_path,
        )))
    }

    /// Scanner reading semantics from the configured library directory.
    pub fn scanner(&self) -> ReferenceScanner {
        ReferenceScanner::new(Arc::new(DirectorySemanticsProvider::new(
            self.config.storage().libraries_path,
        )))
    }

    /// Reconciliation engine wired to filesystem storage.
    pub fn storer(&self) -> ContentStorer {
        ContentStorer::with_config(
            self.content(),
            self.temporary(),
            self.scanner(),
            &self.config.reconciliation(),
        )
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}
