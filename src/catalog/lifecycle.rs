//! Experiment and run lifecycle.

use std::sync::Arc;
use std::time::Duration;

use super::require_name;
use crate::experiment::{Experiment, ExperimentId, Run, RunId};
use crate::store::MetadataStore;
use crate::Result;

/// Creates experiments and runs and records training time.
#[derive(Debug)]
pub struct LifeCycleCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for LifeCycleCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MetadataStore> LifeCycleCatalog<S> {
    /// Create a catalog over a shared store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Get-or-create an experiment by name (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name; store errors otherwise.
    pub async fn create_experiment(&self, name: &str) -> Result<ExperimentId> {
        let name = require_name("experiment name", name)?;
        self.store.create_experiment(name).await
    }

    /// Create a run under an existing experiment.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID, `NotFound` for an unknown experiment.
    pub async fn create_run(&self, experiment_id: ExperimentId) -> Result<RunId> {
        self.store.create_run(experiment_id.ensure_valid()?).await
    }

    /// Get-or-create the named experiment, then create a run under it.
    ///
    /// The two steps are not atomic. If the call is dropped between them
    /// the experiment exists without the run; calling again is safe.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name; store errors otherwise.
    pub async fn create_run_for_experiment(&self, experiment_name: &str) -> Result<RunId> {
        let experiment_id = self.create_experiment(experiment_name).await?;
        self.create_run(experiment_id).await
    }

    /// Set (or overwrite) a run's training time.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID, `NotFound` for an unknown run.
    pub async fn set_training_time(&self, run_id: RunId, training_time: Duration) -> Result<()> {
        self.store
            .set_training_time(run_id.ensure_valid()?, training_time)
            .await
    }

    /// Look up an experiment by name.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name; store errors otherwise.
    pub async fn get_experiment(&self, name: &str) -> Result<Option<Experiment>> {
        let name = require_name("experiment name", name)?;
        self.store.get_experiment(name).await
    }

    /// Look up a run.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_run(&self, run_id: RunId) -> Result<Option<Run>> {
        self.store.get_run(run_id.ensure_valid()?).await
    }

    /// Runs of an experiment, oldest first.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>> {
        self.store.get_runs(experiment_id.ensure_valid()?).await
    }

    /// All experiments, oldest first.
    ///
    /// # Errors
    ///
    /// Store errors.
    pub async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        self.store.list_experiments().await
    }
}
