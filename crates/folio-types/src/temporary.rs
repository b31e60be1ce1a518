//! Temporary (ephemeral) file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file uploaded to ephemeral storage that is not yet attached to a
/// saved content object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryFile {
    pub filename: String,
    pub owned_by_user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl TemporaryFile {
    pub fn new(
        filename: impl Into<String>,
        owned_by_user_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: filename.into(),
            owned_by_user_id: owned_by_user_id.into(),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Size and creation time of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub size: u64,
    pub birthtime: DateTime<Utc>,
}
