//! Model artifact upload and download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::experiment::{ArtifactReference, RunId};
use crate::repository::ModelRepository;
use crate::store::MetadataStore;
use crate::{Error, Result};

/// Moves model binaries through a [`ModelRepository`] and records every
/// upload on the run.
#[derive(Debug)]
pub struct ModelCatalog<S, R> {
    store: Arc<S>,
    repository: Arc<R>,
}

impl<S, R> Clone for ModelCatalog<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<S: MetadataStore, R: ModelRepository> ModelCatalog<S, R> {
    /// Create a catalog over a shared store and repository.
    #[must_use]
    pub const fn new(store: Arc<S>, repository: Arc<R>) -> Self {
        Self { store, repository }
    }

    /// Upload the model file at `path` for a run.
    ///
    /// The run must exist before any bytes are sent. On success the
    /// reference is also appended to the run's artifacts.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID or empty path, `NotFound` for an unknown
    /// run; repository and store errors are returned unchanged.
    pub async fn upload(&self, run_id: RunId, path: impl AsRef<Path>) -> Result<ArtifactReference> {
        let run_id = run_id.ensure_valid()?;
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Validation("model path must not be empty".into()));
        }
        if self.store.get_run(run_id).await?.is_none() {
            return Err(Error::not_found("run", run_id));
        }

        let reference = self.repository.upload_model(run_id, path).await?;
        self.store.log_artifact(run_id, &reference).await?;

        debug!(%run_id, key = reference.key(), "recorded model artifact");
        Ok(reference)
    }

    /// Fetch the referenced artifact to a local path.
    ///
    /// # Errors
    ///
    /// `NotFound` if the repository no longer has the bytes; a storage
    /// error if the bytes do not match the recorded hash.
    pub async fn download(&self, reference: &ArtifactReference) -> Result<PathBuf> {
        self.repository.download_model(reference).await
    }

    /// Artifact references recorded for a run, in upload order.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_artifacts(&self, run_id: RunId) -> Result<Vec<ArtifactReference>> {
        self.store.get_artifacts(run_id.ensure_valid()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::LocalModelRepository;
    use crate::store::MemoryMetadataStore;

    #[tokio::test]
    async fn test_upload_records_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.zip");
        tokio::fs::write(&source, b"weights").await.unwrap();

        let store = Arc::new(MemoryMetadataStore::new());
        let experiment_id = store.create_experiment("e").await.unwrap();
        let run_id = store.create_run(experiment_id).await.unwrap();
        let model = ModelCatalog::new(
            store,
            Arc::new(LocalModelRepository::new(dir.path().join("repo"))),
        );

        let reference = model.upload(run_id, &source).await.unwrap();
        assert_eq!(model.get_artifacts(run_id).await.unwrap(), vec![reference.clone()]);

        let downloaded = model.download(&reference).await.unwrap();
        assert_eq!(tokio::fs::read(downloaded).await.unwrap(), b"weights");
    }

    #[tokio::test]
    async fn test_upload_unknown_run_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.zip");
        tokio::fs::write(&source, b"weights").await.unwrap();
        let root = dir.path().join("repo");

        let model = ModelCatalog::new(
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(LocalModelRepository::new(&root)),
        );

        let err = model.upload(RunId::generate(), &source).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!root.exists());
    }
}
