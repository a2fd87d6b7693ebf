//! Model repository contract
//!
//! Model binaries live outside the metadata store. A [`ModelRepository`]
//! owns the bytes and hands back an [`ArtifactReference`] that resolves to
//! exactly the bytes that were uploaded.
//!
//! Backends:
//! - [`LocalModelRepository`]: a directory on the local filesystem
//! - [`ObjectStoreModelRepository`]: any [`BlobStore`](crate::blob::BlobStore)
//!
//! Every upload gets a fresh version in its key, so uploading the same
//! file twice yields two independent references.

mod local;
mod object;

pub use local::LocalModelRepository;
pub use object::ObjectStoreModelRepository;

use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::experiment::{content_hash, ArtifactReference, RunId};
use crate::{Error, Result};

/// Persistence contract for model artifact bytes.
pub trait ModelRepository: Send + Sync {
    /// Read the file at `source` and store it for `run_id`.
    ///
    /// Transport or authorization failures are returned as-is; there is no
    /// internal retry.
    fn upload_model(
        &self,
        run_id: RunId,
        source: &Path,
    ) -> impl Future<Output = Result<ArtifactReference>> + Send;

    /// Materialise the referenced artifact as a local file and return its path.
    fn download_model(
        &self,
        artifact: &ArtifactReference,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

impl<R: ModelRepository + ?Sized> ModelRepository for Arc<R> {
    fn upload_model(
        &self,
        run_id: RunId,
        source: &Path,
    ) -> impl Future<Output = Result<ArtifactReference>> + Send {
        (**self).upload_model(run_id, source)
    }

    fn download_model(
        &self,
        artifact: &ArtifactReference,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        (**self).download_model(artifact)
    }
}

/// Artifact bytes read from a local file, with the reference they will get.
pub(crate) struct PendingUpload {
    pub(crate) reference: ArtifactReference,
    pub(crate) bytes: Vec<u8>,
}

/// Read `source` and prepare a versioned reference for it.
pub(crate) async fn prepare_upload(run_id: RunId, source: &Path) -> Result<PendingUpload> {
    let file_name = source
        .file_name()
        .and_then(OsStr::to_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            Error::Validation(format!(
                "model path '{}' has no usable file name",
                source.display()
            ))
        })?;

    let bytes = tokio::fs::read(source).await?;
    let size_bytes = u64::try_from(bytes.len())
        .map_err(|_| Error::StorageError("artifact larger than u64::MAX bytes".to_string()))?;
    let reference = ArtifactReference::new(run_id, file_name, size_bytes, content_hash(&bytes));

    Ok(PendingUpload { reference, bytes })
}

/// Check downloaded bytes against the reference's content hash.
pub(crate) fn verify_content(artifact: &ArtifactReference, bytes: &[u8]) -> Result<()> {
    let actual = content_hash(bytes);
    if actual == artifact.content_hash() {
        Ok(())
    } else {
        Err(Error::StorageError(format!(
            "content hash mismatch for '{}': expected {}, got {actual}",
            artifact.key(),
            artifact.content_hash()
        )))
    }
}

/// Map a `/`-separated artifact key onto a path below `root`.
///
/// Rejects empty, `.` and `..` segments so a stored reference can never
/// escape the root.
pub(crate) fn key_to_path(root: &Path, key: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(Error::Validation(format!("invalid artifact key '{key}'")));
        }
        path.push(segment);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_path_nests_segments() {
        let path = key_to_path(Path::new("/models"), "run/v1/model.zip").unwrap();
        assert_eq!(path, PathBuf::from("/models/run/v1/model.zip"));
    }

    #[test]
    fn test_key_to_path_rejects_traversal() {
        assert!(key_to_path(Path::new("/models"), "run/../../etc/passwd").is_err());
        assert!(key_to_path(Path::new("/models"), "run//model.zip").is_err());
    }

    #[test]
    fn test_verify_content_detects_tampering() {
        let artifact = ArtifactReference::new(RunId::generate(), "m.bin", 3, content_hash(b"abc"));
        assert!(verify_content(&artifact, b"abc").is_ok());
        assert!(verify_content(&artifact, b"abd").is_err());
    }

    #[tokio::test]
    async fn test_prepare_upload_missing_file_is_not_found() {
        let err = prepare_upload(RunId::generate(), Path::new("/definitely/missing/model.zip"))
            .await
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }
}
