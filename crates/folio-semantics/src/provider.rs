//! Sources of library semantics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_types::LibraryName;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::Semantics;
use crate::Result;

/// Name of the semantics file inside a library directory.
pub const SEMANTICS_FILE: &str = "semantics.json";

/// Resolves a library name to its parsed semantics.
#[async_trait]
pub trait SemanticsProvider: Send + Sync {
    /// Get the semantics of `library`, or `None` if it is not installed.
    async fn get_semantics(&self, library: &LibraryName) -> Result<Option<Semantics>>;
}

/// In-memory semantics registry.
#[derive(Debug, Default)]
pub struct MemorySemanticsProvider {
    libraries: RwLock<HashMap<LibraryName, Semantics>>,
}

impl MemorySemanticsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the semantics of a library.
    pub fn insert(&self, library: LibraryName, semantics: Semantics) {
        self.libraries.write().insert(library, semantics);
    }

    pub fn with_library(self, library: LibraryName, semantics: Semantics) -> Self {
        self.insert(library, semantics);
        self
    }
}

#[async_trait]
impl SemanticsProvider for MemorySemanticsProvider {
    async fn get_semantics(&self, library: &LibraryName) -> Result<Option<Semantics>> {
        Ok(self.libraries.read().get(library).cloned())
    }
}

/// Reads semantics from installed library directories.
///
/// Layout: `<root>/<MachineName>-<major>.<minor>/semantics.json`.
#[derive(Debug, Clone)]
pub struct DirectorySemanticsProvider {
    root: PathBuf,
}

impl DirectorySemanticsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn semantics_path(&self, library: &LibraryName) -> PathBuf {
        self.root
            .join(library.to_directory_name())
            .join(SEMANTICS_FILE)
    }
}

#[async_trait]
impl SemanticsProvider for DirectorySemanticsProvider {
    async fn get_semantics(&self, library: &LibraryName) -> Result<Option<Semantics>> {
        let path = self.semantics_path(library);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Semantics::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(library = %library, path = %path.display(), "Library semantics not installed");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
