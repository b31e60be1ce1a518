//! Save-time reconciliation of file references.
//!
//! [`ContentStorer::add_or_update_content`] commits a parameter tree and then
//! brings storage in line with the file paths it declares:
//!
//! ```text
//!  1. scan previously committed params (updates only)  → old references
//!  2. scan new params                                  → new references
//!  3. strip `#tmp` markers, queue uploads not committed before
//!  4. commit                                           → content id
//!  5. copy queued uploads temporary → permanent
//!  6. copy pasted `../<id>/<path>` files into this content
//!  7. re-commit if steps 5-6 rewrote or blanked paths
//!  8. delete files no longer referenced (updates only)
//! ```
//!
//! Steps 4 and 7 are required and their errors propagate. Steps 5, 6 and 8
//! are best-effort: a failure turns into a [`FileOutcome`] and a warning,
//! never into a failed save. Nothing here is transactional; an interrupted
//! save can leave orphan files behind, which is accepted.
//!
//! Tree edits never alias the scan result. Each step collects
//! [`PathPatch`]es addressed by JSON Pointer and applies them to the owned
//! tree in one go.

use std::collections::HashSet;
use std::sync::LazyLock;

use folio_config::ReconciliationConfig;
use folio_semantics::{
    FileReference, ReferenceScanner, ScanReport, TEMPORARY_MARKER, escape_pointer_token,
};
use folio_types::{ContentId, ContentMetadata, LibraryName};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::filename::generate_unique_filename;
use crate::manager::ContentManager;
use crate::temporary::TemporaryFileManager;
use crate::{ContentError, Result};

/// A reference into another content object: `../<id>/<path>` or
/// `../content/<id>/<path>`.
static PASTE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\./(?:content/)?([^/]+)/(.+)$").expect("paste pattern is valid")
});

/// A protocol-less URL such as `youtu.be/abc123`.
static BARE_DOMAIN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^./]+?\.[^./]+/.+$").expect("url pattern is valid")
});

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// What happened to one file during a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Upload copied from temporary to permanent storage.
    Copied,
    /// File copied from another content object under a new name.
    Pasted { new_path: String },
    /// Copy failed; the reference's path was replaced with an empty string.
    Blanked { reason: String },
    /// Copy failed but the path looks like an external URL and was kept.
    Skipped { reason: String },
    /// File no longer referenced and removed from permanent storage.
    OrphanDeleted,
    /// File no longer referenced but could not be removed.
    OrphanDeleteFailed { reason: String },
}

/// Outcome for a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path as it appeared in the tree, without the temporary marker.
    pub path: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    fn new(path: impl Into<String>, outcome: FileOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }
}

/// Result of [`ContentStorer::add_or_update_content`].
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub content_id: ContentId,
    /// The parameters as finally committed.
    pub params: Value,
    /// Whether the save updated an existing object.
    pub updated: bool,
    pub outcomes: Vec<FileReport>,
}

impl SaveReport {
    /// Outcome recorded for `path`, if any.
    pub fn outcome(&self, path: &str) -> Option<&FileOutcome> {
        self.outcomes
            .iter()
            .find(|report| report.path == path)
            .map(|report| &report.outcome)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Patches
// ─────────────────────────────────────────────────────────────────────────────

/// Replacement of one `path` string in a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPatch {
    /// JSON Pointer to the string to replace.
    pub pointer: String,
    pub value: String,
}

impl PathPatch {
    pub fn new(pointer: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            value: value.into(),
        }
    }
}

/// Apply `patches` in order. Pointers that no longer resolve are logged and
/// skipped. Returns the number of patches applied.
pub fn apply_patches(params: &mut Value, patches: impl IntoIterator<Item = PathPatch>) -> usize {
    let mut applied = 0;
    for patch in patches {
        match params.pointer_mut(&patch.pointer) {
            Some(slot) => {
                *slot = Value::String(patch.value);
                applied += 1;
            }
            None => warn!(pointer = %patch.pointer, "Patch target missing from parameters"),
        }
    }
    applied
}

/// Collect strip patches for every marked `path` string under `value`, which
/// sits at `pointer` in the tree.
fn collect_marker_patches(value: &Value, pointer: &str, patches: &mut Vec<PathPatch>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                let child_pointer = format!("{pointer}/{}", escape_pointer_token(key));
                if key == "path"
                    && let Some(stripped) = child
                        .as_str()
                        .and_then(|path| path.strip_suffix(TEMPORARY_MARKER))
                {
                    patches.push(PathPatch::new(child_pointer, stripped));
                } else {
                    collect_marker_patches(child, &child_pointer, patches);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_marker_patches(item, &format!("{pointer}/{index}"), patches);
            }
        }
        _ => {}
    }
}

/// Split a paste reference into its source content id and path.
pub fn parse_paste_reference(path: &str) -> Option<(ContentId, String)> {
    let captures = PASTE_REFERENCE.captures(path)?;
    Some((ContentId::new(&captures[1]), captures[2].to_string()))
}

/// An upload waiting to be copied, with every tree location naming it.
#[derive(Debug)]
struct PendingCopy {
    path: String,
    mime_type: Option<String>,
    pointers: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ContentStorer
// ─────────────────────────────────────────────────────────────────────────────

/// Saves content and reconciles its files across temporary and permanent
/// storage.
#[derive(Debug, Clone)]
pub struct ContentStorer {
    content: ContentManager,
    temporary: TemporaryFileManager,
    scanner: ReferenceScanner,
    hosted_video_mime_types: Vec<String>,
}

impl ContentStorer {
    pub fn new(
        content: ContentManager,
        temporary: TemporaryFileManager,
        scanner: ReferenceScanner,
    ) -> Self {
        Self::with_config(content, temporary, scanner, &ReconciliationConfig::default())
    }

    pub fn with_config(
        content: ContentManager,
        temporary: TemporaryFileManager,
        scanner: ReferenceScanner,
        config: &ReconciliationConfig,
    ) -> Self {
        Self {
            content,
            temporary,
            scanner,
            hosted_video_mime_types: config.hosted_video_mime_types.clone(),
        }
    }

    pub fn content(&self) -> &ContentManager {
        &self.content
    }

    pub fn temporary(&self) -> &TemporaryFileManager {
        &self.temporary
    }

    pub fn scanner(&self) -> &ReferenceScanner {
        &self.scanner
    }

    /// Whether a path should be treated as an external URL and left alone.
    pub fn looks_like_url(&self, path: &str, mime_type: Option<&str>) -> bool {
        BARE_DOMAIN_URL.is_match(path)
            || mime_type.is_some_and(|mime| {
                self.hosted_video_mime_types
                    .iter()
                    .any(|hosted| hosted.eq_ignore_ascii_case(mime))
            })
    }

    /// Commit `params` and reconcile the files they reference.
    ///
    /// Passing `content_id` makes this an update: the previously committed
    /// parameters are scanned so that unreferenced files can be deleted and
    /// consumed uploads removed from temporary storage. A fresh save leaves
    /// uploads in temporary storage until they expire, so saving the same
    /// unsaved tree twice yields two independent objects.
    ///
    /// # Errors
    ///
    /// - `ContentError::ContentNotFound` if `content_id` does not exist.
    /// - Scan errors for the main library.
    /// - Storage errors while committing.
    pub async fn add_or_update_content(
        &self,
        content_id: Option<&ContentId>,
        mut params: Value,
        metadata: &ContentMetadata,
        main_library: &LibraryName,
        owner: &str,
    ) -> Result<SaveReport> {
        let updated = content_id.is_some();

        // 1-2: references before and after the edit
        let old_refs = match content_id {
            Some(id) => {
                let committed = self.content.get_parameters(id, owner).await?;
                self.scanner.scan(&committed, main_library).await?
            }
            None => Vec::new(),
        };
        let ScanReport {
            references: new_refs,
            skipped,
        } = self.scanner.scan_detailed(&params, main_library).await?;
        let old_paths: HashSet<&str> = old_refs.iter().map(FileReference::stripped_path).collect();

        // 3: strip markers, queue uploads
        let mut strip = Vec::new();
        let mut queue: Vec<PendingCopy> = Vec::new();
        for reference in new_refs.iter().filter(|r| r.temporary) {
            let path = reference.stripped_path();
            let pointer = reference.path_pointer();
            strip.push(PathPatch::new(pointer.clone(), path));

            if old_paths.contains(path) {
                continue;
            }
            match queue.iter_mut().find(|pending| pending.path == path) {
                Some(pending) => pending.pointers.push(pointer),
                None => queue.push(PendingCopy {
                    path: path.to_string(),
                    mime_type: reference.mime_type.clone(),
                    pointers: vec![pointer],
                }),
            }
        }
        // Parameters of uninstalled libraries are opaque: strip, never copy.
        for library in &skipped {
            let Some(subtree) = params.pointer(&library.location) else {
                continue;
            };
            let before = strip.len();
            collect_marker_patches(subtree, &library.location, &mut strip);
            if strip.len() > before {
                warn!(
                    library = %library.library,
                    location = %library.location,
                    markers = strip.len() - before,
                    "Stripped temporary markers from parameters of an uninstalled library"
                );
            }
        }
        apply_patches(&mut params, strip);

        // 4: first commit
        let content_id = self
            .content
            .add_or_update_content(metadata, &params, owner, content_id)
            .await?;

        let mut outcomes = Vec::new();
        let mut patches = Vec::new();
        let mut dirty = false;

        // 5: uploads
        for pending in &queue {
            let outcome = match self.copy_from_temporary(&content_id, &pending.path, owner).await {
                Ok(()) => {
                    if updated
                        && let Err(e) = self.temporary.delete_file(&pending.path, owner).await
                    {
                        warn!(file = %pending.path, error = %e, "Failed to remove consumed temporary file");
                    }
                    debug!(content_id = %content_id, file = %pending.path, "Copied temporary file");
                    FileOutcome::Copied
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(content_id = %content_id, file = %pending.path, error = %reason, "Temporary file could not be copied");
                    if self.looks_like_url(&pending.path, pending.mime_type.as_deref()) {
                        FileOutcome::Skipped { reason }
                    } else {
                        patches.extend(pending.pointers.iter().map(|p| PathPatch::new(p.clone(), "")));
                        dirty = true;
                        FileOutcome::Blanked { reason }
                    }
                }
            };
            outcomes.push(FileReport::new(pending.path.clone(), outcome));
        }

        // 6: pastes from other content
        for reference in new_refs.iter().filter(|r| !r.temporary) {
            let Some((source_id, source_path)) = parse_paste_reference(&reference.file_path) else {
                continue;
            };
            dirty = true;
            let outcome = match self
                .paste_file(&source_id, &source_path, &content_id, owner)
                .await
            {
                Ok(new_path) => {
                    debug!(
                        content_id = %content_id,
                        source = %reference.file_path,
                        file = %new_path,
                        "Pasted file from other content"
                    );
                    patches.push(PathPatch::new(reference.path_pointer(), new_path.clone()));
                    FileOutcome::Pasted { new_path }
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(content_id = %content_id, source = %reference.file_path, error = %reason, "Pasted file could not be copied");
                    if self.looks_like_url(&reference.file_path, reference.mime_type.as_deref()) {
                        FileOutcome::Skipped { reason }
                    } else {
                        patches.push(PathPatch::new(reference.path_pointer(), ""));
                        FileOutcome::Blanked { reason }
                    }
                }
            };
            outcomes.push(FileReport::new(reference.file_path.clone(), outcome));
        }

        // 7: second commit
        if dirty {
            apply_patches(&mut params, patches);
            self.content
                .add_or_update_content(metadata, &params, owner, Some(&content_id))
                .await?;
        }

        // 8: orphans
        if updated {
            let new_paths: HashSet<&str> =
                new_refs.iter().map(FileReference::stripped_path).collect();
            let mut seen = HashSet::new();
            for reference in old_refs.iter().filter(|r| !r.temporary) {
                let path = reference.file_path.as_str();
                if new_paths.contains(path)
                    || !seen.insert(path)
                    || self.looks_like_url(path, reference.mime_type.as_deref())
                {
                    continue;
                }
                let outcome = match self.content.delete_content_file(&content_id, path).await {
                    Ok(()) => {
                        debug!(content_id = %content_id, file = %path, "Deleted orphan file");
                        FileOutcome::OrphanDeleted
                    }
                    Err(e) => {
                        warn!(content_id = %content_id, file = %path, error = %e, "Failed to delete orphan file");
                        FileOutcome::OrphanDeleteFailed {
                            reason: e.to_string(),
                        }
                    }
                };
                outcomes.push(FileReport::new(path, outcome));
            }
        }

        info!(
            content_id = %content_id,
            updated,
            references = new_refs.len(),
            files = outcomes.len(),
            recommitted = dirty,
            "Saved content"
        );
        Ok(SaveReport {
            content_id,
            params,
            updated,
            outcomes,
        })
    }

    async fn copy_from_temporary(&self, id: &ContentId, path: &str, owner: &str) -> Result<()> {
        if !self.temporary.file_exists(path, owner).await? {
            return Err(ContentError::TemporaryFileNotFound {
                name: path.to_string(),
            });
        }
        let stream = self.temporary.get_file_stream(path, owner).await?;
        self.content.add_content_file(id, path, stream, owner).await
    }

    /// Copy `source_path` of `source` into `target` under a fresh name.
    async fn paste_file(
        &self,
        source: &ContentId,
        source_path: &str,
        target: &ContentId,
        owner: &str,
    ) -> Result<String> {
        if !self.content.content_file_exists(source, source_path).await? {
            return Err(ContentError::FileNotFound {
                id: source.to_string(),
                path: source_path.to_string(),
            });
        }

        let content = &self.content;
        let new_path = generate_unique_filename(
            source_path,
            |name| content.sanitize_filename(name),
            |candidate| async move { content.content_file_exists(target, &candidate).await },
        )
        .await?;

        let stream = content.get_content_file_stream(source, source_path, owner).await?;
        content.add_content_file(target, &new_path, stream, owner).await?;
        Ok(new_path)
    }

    /// Delete a content object and every file attached to it.
    pub async fn delete_content(&self, id: &ContentId, owner: &str) -> Result<()> {
        self.content.delete_content(id, owner).await
    }

    /// Duplicate a content object, files included, under a new id.
    pub async fn copy_content(&self, id: &ContentId, owner: &str) -> Result<ContentId> {
        let metadata = self.content.get_metadata(id, owner).await?;
        let params = self.content.get_parameters(id, owner).await?;
        let files = self.content.list_content_files(id, owner).await?;

        let copy = self
            .content
            .add_or_update_content(&metadata, &params, owner, None)
            .await?;
        for file in &files {
            let stream = self.content.get_content_file_stream(id, file, owner).await?;
            self.content.add_content_file(&copy, file, stream, owner).await?;
        }

        info!(source = %id, content_id = %copy, files = files.len(), "Copied content");
        Ok(copy)
    }
}
