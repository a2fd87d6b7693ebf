//! Runtime backend dispatch
//!
//! [`AnyMetadataStore`] and [`AnyModelRepository`] wrap the concrete
//! backends chosen by a [`TrackingConfig`](crate::config::TrackingConfig),
//! so a single `Context` type serves every configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::blob::MemoryBlobStore;
use crate::config::{ArtifactBackend, MetadataBackend};
use crate::experiment::{
    ArtifactReference, ConfusionMatrix, DataSchema, Experiment, ExperimentId, HyperParameter,
    Metric, Run, RunId,
};
use crate::repository::{LocalModelRepository, ModelRepository, ObjectStoreModelRepository};
#[cfg(feature = "sqlite")]
use crate::store::SqliteMetadataStore;
use crate::store::{MemoryMetadataStore, MetadataStore};
use crate::Result;

macro_rules! dispatch_store {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Self::Memory($store) => $call,
            #[cfg(feature = "sqlite")]
            Self::Sqlite($store) => $call,
        }
    };
}

/// A metadata store selected at runtime.
#[derive(Debug)]
pub enum AnyMetadataStore {
    /// In-process maps
    Memory(MemoryMetadataStore),
    /// Embedded SQLite
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteMetadataStore),
}

impl AnyMetadataStore {
    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQLite file cannot be opened, or a
    /// validation error if SQLite is requested but not compiled in.
    pub fn open(backend: &MetadataBackend) -> Result<Self> {
        match backend {
            MetadataBackend::Memory => {
                info!("using in-memory metadata store");
                Ok(Self::Memory(MemoryMetadataStore::new()))
            }
            #[cfg(feature = "sqlite")]
            MetadataBackend::Sqlite { path } => {
                info!(path = %path.display(), "opening SQLite metadata store");
                Ok(Self::Sqlite(SqliteMetadataStore::open(path)?))
            }
            #[cfg(not(feature = "sqlite"))]
            MetadataBackend::Sqlite { .. } => Err(crate::Error::Validation(
                "SQLite metadata backend requires the `sqlite` feature".into(),
            )),
        }
    }
}

impl MetadataStore for AnyMetadataStore {
    async fn create_experiment(&self, name: &str) -> Result<ExperimentId> {
        dispatch_store!(self, s => s.create_experiment(name).await)
    }

    async fn get_experiment(&self, name: &str) -> Result<Option<Experiment>> {
        dispatch_store!(self, s => s.get_experiment(name).await)
    }

    async fn get_experiment_by_id(&self, experiment_id: ExperimentId) -> Result<Option<Experiment>> {
        dispatch_store!(self, s => s.get_experiment_by_id(experiment_id).await)
    }

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        dispatch_store!(self, s => s.list_experiments().await)
    }

    async fn create_run(&self, experiment_id: ExperimentId) -> Result<RunId> {
        dispatch_store!(self, s => s.create_run(experiment_id).await)
    }

    async fn get_run(&self, run_id: RunId) -> Result<Option<Run>> {
        dispatch_store!(self, s => s.get_run(run_id).await)
    }

    async fn get_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>> {
        dispatch_store!(self, s => s.get_runs(experiment_id).await)
    }

    async fn set_training_time(&self, run_id: RunId, training_time: Duration) -> Result<()> {
        dispatch_store!(self, s => s.set_training_time(run_id, training_time).await)
    }

    async fn log_metric(&self, run_id: RunId, name: &str, value: f64) -> Result<()> {
        dispatch_store!(self, s => s.log_metric(run_id, name, value).await)
    }

    async fn get_metrics(&self, run_id: RunId) -> Result<Vec<Metric>> {
        dispatch_store!(self, s => s.get_metrics(run_id).await)
    }

    async fn log_hyperparameters(&self, run_id: RunId, parameters: &[(String, String)]) -> Result<()> {
        dispatch_store!(self, s => s.log_hyperparameters(run_id, parameters).await)
    }

    async fn get_hyperparameters(&self, run_id: RunId) -> Result<Vec<HyperParameter>> {
        dispatch_store!(self, s => s.get_hyperparameters(run_id).await)
    }

    async fn log_confusion_matrix(&self, run_id: RunId, matrix: &ConfusionMatrix) -> Result<()> {
        dispatch_store!(self, s => s.log_confusion_matrix(run_id, matrix).await)
    }

    async fn get_confusion_matrix(&self, run_id: RunId) -> Result<Option<ConfusionMatrix>> {
        dispatch_store!(self, s => s.get_confusion_matrix(run_id).await)
    }

    async fn log_data_schema(&self, run_id: RunId, schema: &DataSchema) -> Result<()> {
        dispatch_store!(self, s => s.log_data_schema(run_id, schema).await)
    }

    async fn get_data_schema(&self, run_id: RunId) -> Result<Option<DataSchema>> {
        dispatch_store!(self, s => s.get_data_schema(run_id).await)
    }

    async fn log_artifact(&self, run_id: RunId, artifact: &ArtifactReference) -> Result<()> {
        dispatch_store!(self, s => s.log_artifact(run_id, artifact).await)
    }

    async fn get_artifacts(&self, run_id: RunId) -> Result<Vec<ArtifactReference>> {
        dispatch_store!(self, s => s.get_artifacts(run_id).await)
    }
}

/// A model repository selected at runtime.
#[derive(Debug)]
pub enum AnyModelRepository {
    /// Local directory
    Local(LocalModelRepository),
    /// In-process object store
    Memory(ObjectStoreModelRepository<MemoryBlobStore>),
}

impl AnyModelRepository {
    /// Build the configured backend. No I/O happens until the first upload.
    #[must_use]
    pub fn open(backend: &ArtifactBackend) -> Self {
        match backend {
            ArtifactBackend::Local { root } => {
                info!(root = %root.display(), "using local model repository");
                Self::Local(LocalModelRepository::new(root))
            }
            ArtifactBackend::Memory { download_dir } => {
                info!(download_dir = %download_dir.display(), "using in-memory model repository");
                Self::Memory(ObjectStoreModelRepository::new(
                    MemoryBlobStore::new(),
                    download_dir,
                ))
            }
        }
    }
}

impl ModelRepository for AnyModelRepository {
    async fn upload_model(&self, run_id: RunId, source: &Path) -> Result<ArtifactReference> {
        match self {
            Self::Local(r) => r.upload_model(run_id, source).await,
            Self::Memory(r) => r.upload_model(run_id, source).await,
        }
    }

    async fn download_model(&self, artifact: &ArtifactReference) -> Result<PathBuf> {
        match self {
            Self::Local(r) => r.download_model(artifact).await,
            Self::Memory(r) => r.download_model(artifact).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = AnyMetadataStore::open(&MetadataBackend::Memory).unwrap();
        assert!(matches!(store, AnyMetadataStore::Memory(_)));

        let experiment_id = store.create_experiment("dispatch").await.unwrap();
        let run_id = store.create_run(experiment_id).await.unwrap();
        assert_eq!(store.get_runs(experiment_id).await.unwrap()[0].id(), run_id);
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_open_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MetadataBackend::Sqlite {
            path: dir.path().join("nested").join("metadata.db"),
        };
        let store = AnyMetadataStore::open(&backend).unwrap();
        assert!(matches!(store, AnyMetadataStore::Sqlite(_)));

        store.create_experiment("persisted").await.unwrap();
        assert!(dir.path().join("nested").join("metadata.db").exists());
    }

    #[tokio::test]
    async fn test_memory_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.bin");
        tokio::fs::write(&source, b"bytes").await.unwrap();

        let repository = AnyModelRepository::open(&ArtifactBackend::Memory {
            download_dir: dir.path().join("downloads"),
        });
        let reference = repository.upload_model(RunId::generate(), &source).await.unwrap();
        let path = repository.download_model(&reference).await.unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"bytes");
    }
}
