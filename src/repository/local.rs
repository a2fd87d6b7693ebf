//! Local filesystem model repository.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{key_to_path, prepare_upload, verify_content, ModelRepository};
use crate::experiment::{ArtifactReference, RunId};
use crate::{Error, Result};

/// Stores artifacts below a root directory as `<root>/<run_id>/<version>/<file_name>`.
///
/// Downloads return the stored file's path directly; the file is already local.
#[derive(Debug, Clone)]
pub struct LocalModelRepository {
    root: PathBuf,
}

impl LocalModelRepository {
    /// Create a repository rooted at `root`. Directories are created on first upload.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModelRepository for LocalModelRepository {
    async fn upload_model(&self, run_id: RunId, source: &Path) -> Result<ArtifactReference> {
        let upload = prepare_upload(run_id, source).await?;
        let target = key_to_path(&self.root, upload.reference.key())?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &upload.bytes).await?;

        debug!(%run_id, key = upload.reference.key(), size = upload.reference.size_bytes(), "stored model artifact");
        Ok(upload.reference)
    }

    async fn download_model(&self, artifact: &ArtifactReference) -> Result<PathBuf> {
        let path = key_to_path(&self.root, artifact.key())?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found("artifact", artifact.key()));
            }
            Err(e) => return Err(e.into()),
        };
        verify_content(artifact, &bytes)?;
        Ok(path)
    }
}
