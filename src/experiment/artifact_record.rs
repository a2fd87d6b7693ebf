//! Artifact reference - pointer to a model binary held by a model repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RunId;

/// Reference to a model artifact uploaded for a run.
///
/// The storage `key` has the form `<run_id>/<version>/<file_name>`. The
/// version combines the upload timestamp with a random suffix, so repeated
/// uploads of the same file never collide.
///
/// ## Content Hash Format
///
/// `content_hash` follows the format `algorithm:hex_digest`, e.g.
/// `blake3:af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactReference {
    run_id: RunId,
    key: String,
    version: String,
    file_name: String,
    size_bytes: u64,
    content_hash: String,
    created_at: DateTime<Utc>,
}

impl ArtifactReference {
    /// Create a reference for a fresh upload of `file_name` for `run_id`.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the owning run
    /// * `file_name` - Base name of the uploaded file (e.g. "model.zip")
    /// * `size_bytes` - Size of the artifact in bytes
    /// * `content_hash` - Content hash in `algorithm:hex` form
    #[must_use]
    pub fn new(
        run_id: RunId,
        file_name: impl Into<String>,
        size_bytes: u64,
        content_hash: impl Into<String>,
    ) -> Self {
        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let version = format!("{}-{}", created_at.format("%Y%m%dT%H%M%S%3fZ"), &suffix[..8]);
        let file_name = file_name.into();

        Self {
            run_id,
            key: format!("{run_id}/{version}/{file_name}"),
            version,
            file_name,
            size_bytes,
            content_hash: content_hash.into(),
            created_at,
        }
    }

    /// Get the run ID.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Get the backend storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the version marker.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the content hash.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Get the upload timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Hash artifact bytes into the `blake3:<hex>` reference format.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_key_layout() {
        let run_id = RunId::generate();
        let artifact = ArtifactReference::new(run_id, "model.zip", 1000, content_hash(b"abc"));

        assert_eq!(artifact.run_id(), run_id);
        assert!(artifact.key().starts_with(&run_id.to_string()));
        assert!(artifact.key().ends_with("/model.zip"));
        assert!(artifact.key().contains(artifact.version()));
    }

    #[test]
    fn test_repeated_uploads_get_distinct_versions() {
        let run_id = RunId::generate();
        let a = ArtifactReference::new(run_id, "model.zip", 1, content_hash(b"x"));
        let b = ArtifactReference::new(run_id, "model.zip", 1, content_hash(b"x"));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_content_hash_format() {
        assert!(content_hash(b"").starts_with("blake3:"));
        assert_eq!(content_hash(b"model"), content_hash(b"model"));
    }
}
