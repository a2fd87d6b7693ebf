//! Object-store model repository.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{key_to_path, prepare_upload, verify_content, ModelRepository};
use crate::blob::BlobStore;
use crate::experiment::{ArtifactReference, RunId};
use crate::{Error, Result};

/// Stores artifacts in any [`BlobStore`] under the reference key.
///
/// Downloads are written below `download_dir` using the same key layout.
#[derive(Debug)]
pub struct ObjectStoreModelRepository<B: BlobStore> {
    blobs: B,
    download_dir: PathBuf,
}

impl<B: BlobStore> ObjectStoreModelRepository<B> {
    /// Create a repository over `blobs`, materialising downloads in `download_dir`.
    #[must_use]
    pub fn new(blobs: B, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            blobs,
            download_dir: download_dir.into(),
        }
    }

    /// The underlying object store.
    #[must_use]
    pub const fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Directory that receives downloaded artifacts.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl<B: BlobStore> ModelRepository for ObjectStoreModelRepository<B> {
    async fn upload_model(&self, run_id: RunId, source: &Path) -> Result<ArtifactReference> {
        let upload = prepare_upload(run_id, source).await?;
        self.blobs.put(upload.reference.key(), upload.bytes).await?;

        debug!(%run_id, key = upload.reference.key(), size = upload.reference.size_bytes(), "uploaded model artifact");
        Ok(upload.reference)
    }

    async fn download_model(&self, artifact: &ArtifactReference) -> Result<PathBuf> {
        let target = key_to_path(&self.download_dir, artifact.key())?;
        let bytes = self
            .blobs
            .get(artifact.key())
            .await?
            .ok_or_else(|| Error::not_found("artifact", artifact.key()))?;
        verify_content(artifact, &bytes)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;

    #[tokio::test]
    async fn test_object_upload_twice_keeps_both() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.onnx");
        tokio::fs::write(&source, b"v1").await.unwrap();

        let repository =
            ObjectStoreModelRepository::new(MemoryBlobStore::new(), dir.path().join("downloads"));
        let run_id = RunId::generate();

        let first = repository.upload_model(run_id, &source).await.unwrap();
        let second = repository.upload_model(run_id, &source).await.unwrap();

        assert_ne!(first.key(), second.key());
        assert_eq!(repository.blobs().len(), 2);
    }

    #[tokio::test]
    async fn test_object_download_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.onnx");
        tokio::fs::write(&source, b"original").await.unwrap();

        let repository =
            ObjectStoreModelRepository::new(MemoryBlobStore::new(), dir.path().join("downloads"));
        let reference = repository
            .upload_model(RunId::generate(), &source)
            .await
            .unwrap();

        repository
            .blobs()
            .put(reference.key(), b"tampered".to_vec())
            .await
            .unwrap();

        let err = repository.download_model(&reference).await.unwrap_err();
        assert!(err.to_string().contains("content hash mismatch"));
    }
}
