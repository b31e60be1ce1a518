//! Content object identity and metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a content object.
///
/// Identifiers are assigned by the permanent storage backend on first save
/// unless the caller supplies one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A versioned library (content type) name, e.g. `H5P.Image 1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryName {
    pub machine_name: String,
    pub major_version: u32,
    pub minor_version: u32,
}

/// Error returned when a library name string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid library name: {0}")]
pub struct LibraryNameError(pub String);

impl LibraryName {
    pub fn new(machine_name: impl Into<String>, major_version: u32, minor_version: u32) -> Self {
        Self {
            machine_name: machine_name.into(),
            major_version,
            minor_version,
        }
    }

    /// Directory-style name, e.g. `H5P.Image-1.1`.
    pub fn to_directory_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

impl FromStr for LibraryName {
    type Err = LibraryNameError;

    /// Accepts both `Machine.Name 1.2` and `Machine.Name-1.2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (machine_name, version) = s
            .rsplit_once(' ')
            .or_else(|| s.rsplit_once('-'))
            .ok_or_else(|| LibraryNameError(s.to_string()))?;
        let (major, minor) = version
            .split_once('.')
            .ok_or_else(|| LibraryNameError(s.to_string()))?;
        let major_version = major
            .parse()
            .map_err(|_| LibraryNameError(s.to_string()))?;
        let minor_version = minor
            .parse()
            .map_err(|_| LibraryNameError(s.to_string()))?;
        if machine_name.is_empty() {
            return Err(LibraryNameError(s.to_string()));
        }
        Ok(Self::new(machine_name, major_version, minor_version))
    }
}

/// Metadata record of a content object.
///
/// Only the fields the lifecycle layer reads are modelled; everything else a
/// content type declares is preserved verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub title: String,

    /// Machine name of the main library.
    pub main_library: String,

    #[serde(default)]
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embed_types: Vec<String>,

    #[serde(default)]
    pub preloaded_dependencies: Vec<LibraryName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editor_dependencies: Vec<LibraryName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_dependencies: Vec<LibraryName>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentMetadata {
    pub fn new(title: impl Into<String>, main_library: &LibraryName) -> Self {
        Self {
            title: title.into(),
            main_library: main_library.machine_name.clone(),
            language: "und".to_string(),
            preloaded_dependencies: vec![main_library.clone()],
            ..Default::default()
        }
    }

    /// Resolve the versioned main library from the preloaded dependencies.
    pub fn main_library_name(&self) -> Option<&LibraryName> {
        self.preloaded_dependencies
            .iter()
            .find(|dep| dep.machine_name == self.main_library)
    }
}
