//! Collision-free filename generation.
//!
//! Generated names carry a short random token before the extension:
//!
//! ```text
//! images/photo.jpg  →  images/photo-3f9a0c1d.jpg
//! ```
//!
//! A token left by an earlier run is stripped first, so feeding a generated
//! name back in never stacks suffixes.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{ContentError, Result};

/// Candidates tried before giving up.
pub const MAX_ATTEMPTS: usize = 5;

/// Length of the random token appended to the stem.
pub const TOKEN_LENGTH: usize = 8;

static TOKEN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-[A-Za-z0-9]{8}$").expect("token suffix pattern is valid"));

/// Split a path into `(directory prefix including '/', stem, extension)`.
fn split_name(name: &str) -> (&str, &str, &str) {
    let (dir, base) = match name.rfind('/') {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    };
    match base.rfind('.') {
        Some(idx) if idx > 0 => (dir, &base[..idx], &base[idx..]),
        _ => (dir, base, ""),
    }
}

/// Remove a previously appended `-<token>` from the stem of `name`.
pub fn strip_token_suffix(name: &str) -> String {
    let (dir, stem, extension) = split_name(name);
    match TOKEN_SUFFIX.captures(stem).and_then(|c| c.get(1)) {
        Some(base) => format!("{dir}{}{extension}", base.as_str()),
        None => name.to_string(),
    }
}

fn random_token() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(TOKEN_LENGTH);
    token
}

/// Generate a name derived from `desired` that `exists` reports as free.
///
/// `sanitize` applies backend rules to the name before the token is added;
/// `exists` is called once per candidate.
///
/// # Errors
///
/// - `ContentError::FilenameExhausted` after [`MAX_ATTEMPTS`] collisions.
/// - Any error returned by `exists`.
pub async fn generate_unique_filename<S, F, Fut, E>(
    desired: &str,
    sanitize: S,
    mut exists: F,
) -> Result<String>
where
    S: Fn(&str) -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = std::result::Result<bool, E>>,
    ContentError: From<E>,
{
    let clean = sanitize(&strip_token_suffix(desired));
    let (dir, stem, extension) = split_name(&clean);

    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = format!("{dir}{stem}-{}{extension}", random_token());
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        debug!(candidate = %candidate, attempt, "Filename candidate already taken");
    }

    Err(ContentError::FilenameExhausted {
        name: desired.to_string(),
    })
}
