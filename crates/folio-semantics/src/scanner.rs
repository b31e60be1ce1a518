//! Schema-driven discovery of file references in a parameter tree.
//!
//! Traversal happens in synchronous passes over already-parsed semantics.
//! When a pass meets an embedded library whose semantics have not been
//! resolved yet, the library is recorded and fetched from the provider
//! before the next pass; the pass that finds nothing left to fetch produces
//! the result. Libraries the provider does not know are skipped.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use folio_types::LibraryName;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::{AssetKind, FieldKind, Semantics, SemanticsNode};
use crate::provider::SemanticsProvider;
use crate::{Result, ScanError};

/// Suffix marking a path that still resolves in temporary storage.
pub const TEMPORARY_MARKER: &str = "#tmp";

/// A file path found in a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Path as stored in the tree, including any `#tmp` marker.
    pub file_path: String,
    pub mime_type: Option<String>,
    pub temporary: bool,
    pub kind: AssetKind,
    /// JSON Pointer to the object holding the `path` property.
    pub location: String,
}

impl FileReference {
    /// The path with the temporary marker removed.
    pub fn stripped_path(&self) -> &str {
        self.file_path
            .strip_suffix(TEMPORARY_MARKER)
            .unwrap_or(&self.file_path)
    }

    /// JSON Pointer to the `path` string itself.
    pub fn path_pointer(&self) -> String {
        format!("{}/path", self.location)
    }
}

/// An embedded library whose parameters could not be walked because its
/// semantics are not installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLibrary {
    pub library: LibraryName,
    /// JSON Pointer to the library's `params` object.
    pub location: String,
}

/// Everything a scan found, including the subtrees it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub references: Vec<FileReference>,
    pub skipped: Vec<SkippedLibrary>,
}

/// Escape a single JSON Pointer reference token (RFC 6901).
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

type SemanticsCache = HashMap<LibraryName, Option<Arc<Semantics>>>;

/// Finds every file reference reachable from a parameter tree.
#[derive(Clone)]
pub struct ReferenceScanner {
    provider: Arc<dyn SemanticsProvider>,
}

impl std::fmt::Debug for ReferenceScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceScanner").finish_non_exhaustive()
    }
}

impl ReferenceScanner {
    pub fn new(provider: Arc<dyn SemanticsProvider>) -> Self {
        Self { provider }
    }

    /// Scan `params` whose shape is described by `main_library`.
    ///
    /// References are returned in document order. Duplicate paths at
    /// different locations are all reported.
    ///
    /// # Errors
    ///
    /// - `ScanError::SemanticsNotFound` if the main library is not installed.
    /// - Provider errors while loading the main library's semantics.
    pub async fn scan(
        &self,
        params: &Value,
        main_library: &LibraryName,
    ) -> Result<Vec<FileReference>> {
        Ok(self.scan_detailed(params, main_library).await?.references)
    }

    /// Like [`scan`](Self::scan), also reporting embedded libraries whose
    /// parameters were skipped, in document order.
    pub async fn scan_detailed(
        &self,
        params: &Value,
        main_library: &LibraryName,
    ) -> Result<ScanReport> {
        let main = self
            .provider
            .get_semantics(main_library)
            .await?
            .ok_or_else(|| ScanError::SemanticsNotFound(main_library.clone()))?;
        let mut cache = SemanticsCache::new();

        loop {
            let mut pass = Pass {
                cache: &cache,
                references: Vec::new(),
                skipped: Vec::new(),
                unresolved: BTreeSet::new(),
            };
            pass.walk_fields(&main.fields, params, "");
            let Pass {
                references,
                skipped,
                unresolved,
                ..
            } = pass;

            if unresolved.is_empty() {
                debug!(
                    library = %main_library,
                    references = references.len(),
                    skipped = skipped.len(),
                    "Scanned parameters for file references"
                );
                return Ok(ScanReport {
                    references,
                    skipped,
                });
            }

            for library in unresolved {
                let semantics = match self.provider.get_semantics(&library).await {
                    Ok(semantics) => semantics,
                    Err(e) => {
                        warn!(library = %library, error = %e, "Failed to load library semantics, skipping");
                        None
                    }
                };
                if semantics.is_none() {
                    debug!(library = %library, "No semantics for embedded library, skipping its parameters");
                }
                cache.insert(library, semantics.map(Arc::new));
            }
        }
    }
}

struct Pass<'a> {
    cache: &'a SemanticsCache,
    references: Vec<FileReference>,
    skipped: Vec<SkippedLibrary>,
    /// Ordered so provider lookups happen deterministically.
    unresolved: BTreeSet<LibraryName>,
}

impl Pass<'_> {
    fn walk_fields(&mut self, fields: &[SemanticsNode], params: &Value, pointer: &str) {
        let Some(object) = params.as_object() else {
            return;
        };
        for field in fields {
            if let Some(value) = object.get(&field.name) {
                let child = format!("{}/{}", pointer, escape_pointer_token(&field.name));
                self.walk_node(field, value, &child);
            }
        }
    }

    fn walk_node(&mut self, node: &SemanticsNode, value: &Value, pointer: &str) {
        match &node.kind {
            FieldKind::Group(fields) => {
                // Single-field groups may be stored without the wrapping object.
                let flattened = fields.len() == 1
                    && !value
                        .as_object()
                        .is_some_and(|o| o.contains_key(&fields[0].name));
                if flattened {
                    self.walk_node(&fields[0], value, pointer);
                } else {
                    self.walk_fields(fields, value, pointer);
                }
            }
            FieldKind::List(item) => {
                if let Some(items) = value.as_array() {
                    for (index, element) in items.iter().enumerate() {
                        self.walk_node(item, element, &format!("{pointer}/{index}"));
                    }
                }
            }
            FieldKind::Library(_) => self.walk_library(value, pointer),
            FieldKind::Asset(kind) => match value {
                Value::Object(object) => self.push_reference(*kind, object, pointer),
                Value::Array(items) => {
                    for (index, element) in items.iter().enumerate() {
                        if let Some(object) = element.as_object() {
                            self.push_reference(*kind, object, &format!("{pointer}/{index}"));
                        }
                    }
                }
                _ => {}
            },
            FieldKind::Scalar => {}
        }
    }

    fn walk_library(&mut self, value: &Value, pointer: &str) {
        let Some(object) = value.as_object() else {
            return;
        };
        let Some(library) = object.get("library").and_then(Value::as_str) else {
            return;
        };
        let Ok(name) = library.parse::<LibraryName>() else {
            debug!(library = %library, location = %pointer, "Unparsable library reference, skipping");
            return;
        };

        let Some(params) = object.get("params") else {
            return;
        };
        let location = format!("{pointer}/params");
        match self.cache.get(&name) {
            None => {
                self.unresolved.insert(name);
            }
            Some(None) => self.skipped.push(SkippedLibrary {
                library: name,
                location,
            }),
            Some(Some(semantics)) => self.walk_fields(&semantics.fields, params, &location),
        }
    }

    fn push_reference(&mut self, kind: AssetKind, object: &Map<String, Value>, pointer: &str) {
        // Blanked references carry an empty path and name no file.
        let Some(path) = object
            .get("path")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
        else {
            return;
        };
        let mime_type = object
            .get("mime")
            .or_else(|| object.get("mimeType"))
            .and_then(Value::as_str)
            .map(String::from);

        self.references.push(FileReference {
            file_path: path.to_string(),
            mime_type,
            temporary: path.ends_with(TEMPORARY_MARKER),
            kind,
            location: pointer.to_string(),
        });
    }
}
