//! Path validation and filename sanitization.
//!
//! File names handed to the storage adapters are relative, `/`-separated
//! paths such as `images/photo-ab12cd34.jpg`. Anything that could escape the
//! owning directory is rejected before touching the filesystem.

use std::path::{Component, Path, PathBuf};

use folio_types::{Result, StorageError};

/// Validate a relative, `/`-separated storage path and convert it to a
/// filesystem path.
///
/// Rejects empty paths, absolute paths, `.`/`..` segments, backslashes and
/// NUL bytes.
pub fn validate_relative_path(name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains('\0') || name.contains('\\') {
        return Err(StorageError::InvalidPath(name.to_string()));
    }

    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            _ => return Err(StorageError::InvalidPath(name.to_string())),
        }
    }
    if out.as_os_str().is_empty() || name.split('/').any(|s| s.is_empty() || s == ".") {
        return Err(StorageError::InvalidPath(name.to_string()));
    }
    Ok(out)
}

/// Validate a single path segment (content id or owner id).
pub(crate) fn validate_segment(segment: &str) -> Result<&str> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidPath(segment.to_string()));
    }
    Ok(segment)
}

/// Make a filename safe for filesystem storage.
///
/// Every segment keeps only ASCII alphanumerics, `.`, `_` and `-` (other
/// characters become `_`); empty, `.` and `..` segments are dropped. The
/// final segment's stem is shortened so the whole path fits in `max_length`
/// characters while keeping the extension.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    let segments: Vec<String> = name
        .split('/')
        .map(|segment| {
            segment
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .collect();

    let Some((last, dirs)) = segments.split_last() else {
        return "file".to_string();
    };

    let prefix: String = dirs.iter().map(|d| format!("{d}/")).collect();
    let (stem, extension) = match last.rfind('.') {
        Some(idx) if idx > 0 => (&last[..idx], &last[idx..]),
        _ => (last.as_str(), ""),
    };

    let budget = max_length.saturating_sub(prefix.len() + extension.len());
    let stem: String = stem.chars().take(budget.max(1)).collect();
    format!("{prefix}{stem}{extension}")
}
