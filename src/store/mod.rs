//! Metadata store contract for experiment tracking
//!
//! Every entity except artifact bytes is persisted through [`MetadataStore`].
//! Backends:
//! - [`MemoryMetadataStore`]: lock-free in-process maps (tests, short-lived jobs)
//! - [`SqliteMetadataStore`]: embedded relational store (feature `sqlite`)
//!
//! # Example
//!
//! ```rust
//! use trueno_mlops::store::{MemoryMetadataStore, MetadataStore};
//!
//! # async fn example() -> trueno_mlops::Result<()> {
//! let store = MemoryMetadataStore::new();
//!
//! let experiment_id = store.create_experiment("titanic").await?;
//! assert_eq!(store.create_experiment("titanic").await?, experiment_id);
//!
//! let run_id = store.create_run(experiment_id).await?;
//! store.log_metric(run_id, "F1Score", 0.78).await?;
//! assert_eq!(store.get_metrics(run_id).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryMetadataStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMetadataStore;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::experiment::{
    ArtifactReference, ConfusionMatrix, DataSchema, Experiment, ExperimentId, HyperParameter,
    Metric, Run, RunId,
};
use crate::Result;

/// Persistence contract for experiments, runs and everything logged on a run.
///
/// Operations are independent: there is no ordering across calls beyond
/// what the caller imposes by awaiting. Run-scoped writes fail with
/// [`Error::NotFound`](crate::Error::NotFound) for an unknown run; reads
/// of absent data return `None` or an empty `Vec`.
pub trait MetadataStore: Send + Sync {
    /// Get-or-create an experiment by name.
    ///
    /// Concurrent callers using the same name observe the same ID; the
    /// backend's uniqueness guarantee, not in-process locking, decides.
    fn create_experiment(&self, name: &str) -> impl Future<Output = Result<ExperimentId>> + Send;

    /// Look up an experiment by name.
    fn get_experiment(&self, name: &str) -> impl Future<Output = Result<Option<Experiment>>> + Send;

    /// Look up an experiment by ID.
    fn get_experiment_by_id(
        &self,
        experiment_id: ExperimentId,
    ) -> impl Future<Output = Result<Option<Experiment>>> + Send;

    /// All experiments, oldest first.
    fn list_experiments(&self) -> impl Future<Output = Result<Vec<Experiment>>> + Send;

    /// Create a run under an existing experiment.
    fn create_run(&self, experiment_id: ExperimentId) -> impl Future<Output = Result<RunId>> + Send;

    /// Look up a run by ID.
    fn get_run(&self, run_id: RunId) -> impl Future<Output = Result<Option<Run>>> + Send;

    /// All runs of an experiment, oldest first.
    fn get_runs(&self, experiment_id: ExperimentId) -> impl Future<Output = Result<Vec<Run>>> + Send;

    /// Set (or overwrite) a run's training time.
    fn set_training_time(
        &self,
        run_id: RunId,
        training_time: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Append a metric to a run.
    fn log_metric(
        &self,
        run_id: RunId,
        name: &str,
        value: f64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Metrics of a run in logging order.
    fn get_metrics(&self, run_id: RunId) -> impl Future<Output = Result<Vec<Metric>>> + Send;

    /// Append one hyperparameter record per `(name, value)` pair.
    fn log_hyperparameters(
        &self,
        run_id: RunId,
        parameters: &[(String, String)],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Hyperparameters of a run in logging order.
    fn get_hyperparameters(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Vec<HyperParameter>>> + Send;

    /// Store a run's confusion matrix, replacing any previous one.
    fn log_confusion_matrix(
        &self,
        run_id: RunId,
        matrix: &ConfusionMatrix,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A run's confusion matrix, if one was logged.
    fn get_confusion_matrix(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Option<ConfusionMatrix>>> + Send;

    /// Store a run's data schema, replacing any previous one.
    fn log_data_schema(
        &self,
        run_id: RunId,
        schema: &DataSchema,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A run's data schema, if one was logged.
    fn get_data_schema(&self, run_id: RunId) -> impl Future<Output = Result<Option<DataSchema>>> + Send;

    /// Append an artifact reference to a run.
    fn log_artifact(
        &self,
        run_id: RunId,
        artifact: &ArtifactReference,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Artifact references of a run in upload order.
    fn get_artifacts(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Vec<ArtifactReference>>> + Send;
}

impl<S: MetadataStore + ?Sized> MetadataStore for Arc<S> {
    fn create_experiment(&self, name: &str) -> impl Future<Output = Result<ExperimentId>> + Send {
        (**self).create_experiment(name)
    }

    fn get_experiment(&self, name: &str) -> impl Future<Output = Result<Option<Experiment>>> + Send {
        (**self).get_experiment(name)
    }

    fn get_experiment_by_id(
        &self,
        experiment_id: ExperimentId,
    ) -> impl Future<Output = Result<Option<Experiment>>> + Send {
        (**self).get_experiment_by_id(experiment_id)
    }

    fn list_experiments(&self) -> impl Future<Output = Result<Vec<Experiment>>> + Send {
        (**self).list_experiments()
    }

    fn create_run(&self, experiment_id: ExperimentId) -> impl Future<Output = Result<RunId>> + Send {
        (**self).create_run(experiment_id)
    }

    fn get_run(&self, run_id: RunId) -> impl Future<Output = Result<Option<Run>>> + Send {
        (**self).get_run(run_id)
    }

    fn get_runs(&self, experiment_id: ExperimentId) -> impl Future<Output = Result<Vec<Run>>> + Send {
        (**self).get_runs(experiment_id)
    }

    fn set_training_time(
        &self,
        run_id: RunId,
        training_time: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).set_training_time(run_id, training_time)
    }

    fn log_metric(
        &self,
        run_id: RunId,
        name: &str,
        value: f64,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).log_metric(run_id, name, value)
    }

    fn get_metrics(&self, run_id: RunId) -> impl Future<Output = Result<Vec<Metric>>> + Send {
        (**self).get_metrics(run_id)
    }

    fn log_hyperparameters(
        &self,
        run_id: RunId,
        parameters: &[(String, String)],
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).log_hyperparameters(run_id, parameters)
    }

    fn get_hyperparameters(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Vec<HyperParameter>>> + Send {
        (**self).get_hyperparameters(run_id)
    }

    fn log_confusion_matrix(
        &self,
        run_id: RunId,
        matrix: &ConfusionMatrix,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).log_confusion_matrix(run_id, matrix)
    }

    fn get_confusion_matrix(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Option<ConfusionMatrix>>> + Send {
        (**self).get_confusion_matrix(run_id)
    }

    fn log_data_schema(
        &self,
        run_id: RunId,
        schema: &DataSchema,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).log_data_schema(run_id, schema)
    }

    fn get_data_schema(&self, run_id: RunId) -> impl Future<Output = Result<Option<DataSchema>>> + Send {
        (**self).get_data_schema(run_id)
    }

    fn log_artifact(
        &self,
        run_id: RunId,
        artifact: &ArtifactReference,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).log_artifact(run_id, artifact)
    }

    fn get_artifacts(
        &self,
        run_id: RunId,
    ) -> impl Future<Output = Result<Vec<ArtifactReference>>> + Send {
        (**self).get_artifacts(run_id)
    }
}
