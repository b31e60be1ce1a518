//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [storage]            # where content, uploads and libraries live
//! [temporary_files]    # upload lifetime and filename limits
//! [reconciliation]     # save-time reference handling
//! [logging]            # file logging
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub storage: Option<StorageConfig>,
    pub temporary_files: Option<TemporaryFilesConfig>,
    pub reconciliation: Option<ReconciliationConfig>,
    pub logging: Option<LoggingConfig>,
}

impl FolioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: FolioConfig) {
        if other.storage.is_some() {
            self.storage = other.storage;
        }
        if other.temporary_files.is_some() {
            self.temporary_files = other.temporary_files;
        }
        if other.reconciliation.is_some() {
            self.reconciliation = other.reconciliation;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective storage settings.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    /// Effective temporary file settings.
    pub fn temporary_files(&self) -> TemporaryFilesConfig {
        self.temporary_files.clone().unwrap_or_default()
    }

    /// Effective reconciliation settings.
    pub fn reconciliation(&self) -> ReconciliationConfig {
        self.reconciliation.clone().unwrap_or_default()
    }

    /// Effective logging settings.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Copy with every section present, holding its effective settings.
    pub fn resolved(&self) -> Self {
        Self {
            storage: Some(self.storage()),
            temporary_files: Some(self.temporary_files()),
            reconciliation: Some(self.reconciliation()),
            logging: Some(self.logging()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Filesystem locations of the storage backends.
///
/// ```toml
/// [storage]
/// content_path = "/var/lib/folio/content"
/// temporary_path = "/var/lib/folio/tmp"
/// libraries_path = "/var/lib/folio/libraries"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of permanent content storage.
    pub content_path: PathBuf,
    /// Root of ephemeral upload storage.
    pub temporary_path: PathBuf,
    /// Root of installed library semantics.
    pub libraries_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .map(|d| d.join("folio"))
            .unwrap_or_else(|| PathBuf::from(".folio"));
        Self {
            content_path: base.join("content"),
            temporary_path: base.join("tmp"),
            libraries_path: base.join("libraries"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Temporary Files Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for ephemeral uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporaryFilesConfig {
    /// Seconds an upload stays available before the cleanup sweep removes it.
    pub lifetime_secs: u64,
    /// Maximum length of a sanitized temporary filename.
    pub max_filename_length: usize,
}

impl Default for TemporaryFilesConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: 24 * 60 * 60,
            max_filename_length: 100,
        }
    }
}

impl TemporaryFilesConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for save-time reference reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Mime types marking a reference as an externally hosted video.
    /// Compared case-insensitively.
    pub hosted_video_mime_types: Vec<String>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            hosted_video_mime_types: vec!["video/YouTube".to_string()],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether to write a rolling JSON log file.
    pub file_logging: bool,
    /// Directory for log files (defaults to `<config dir>/logs`).
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_logging: true,
            log_dir: None,
        }
    }
}
