//! In-memory metadata store using `DashMap`.
//!
//! Data is lost on process restart. Use `SqliteMetadataStore` to persist
//! tracking data across processes.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::MetadataStore;
use crate::experiment::{
    ArtifactReference, ConfusionMatrix, DataSchema, Experiment, ExperimentId, HyperParameter,
    Metric, Run, RunId,
};
use crate::{Error, Result};

/// In-memory metadata store backed by lock-free concurrent hashmaps.
///
/// ## Uniqueness
///
/// Experiments are keyed by name. `create_experiment` goes through the
/// `DashMap` entry API, which holds the shard lock for the name while the
/// experiment (and its ID index entry) is inserted, so concurrent callers
/// with the same name always resolve to one experiment.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    experiments: DashMap<String, Experiment>,
    experiment_names: DashMap<ExperimentId, String>,
    runs: DashMap<RunId, Run>,
    metrics: DashMap<RunId, Vec<Metric>>,
    hyperparameters: DashMap<RunId, Vec<HyperParameter>>,
    confusion_matrices: DashMap<RunId, ConfusionMatrix>,
    data_schemas: DashMap<RunId, DataSchema>,
    artifacts: DashMap<RunId, Vec<ArtifactReference>>,
}

impl MemoryMetadataStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of experiments.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Number of runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Number of metric records across all runs.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.iter().map(|entry| entry.value().len()).sum()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty() && self.runs.is_empty()
    }

    fn ensure_run(&self, run_id: RunId) -> Result<()> {
        if self.runs.contains_key(&run_id) {
            Ok(())
        } else {
            Err(Error::not_found("run", run_id))
        }
    }
}

impl MetadataStore for MemoryMetadataStore {
    async fn create_experiment(&self, name: &str) -> Result<ExperimentId> {
        let id = match self.experiments.entry(name.to_string()) {
            Entry::Occupied(existing) => existing.get().id(),
            Entry::Vacant(slot) => {
                let experiment = Experiment::new(name);
                let id = experiment.id();
                // Index first: once the name is visible, the ID must resolve.
                self.experiment_names.insert(id, name.to_string());
                slot.insert(experiment);
                debug!(experiment = name, %id, "created experiment");
                id
            }
        };
        Ok(id)
    }

    async fn get_experiment(&self, name: &str) -> Result<Option<Experiment>> {
        Ok(self.experiments.get(name).map(|e| e.value().clone()))
    }

    async fn get_experiment_by_id(&self, experiment_id: ExperimentId) -> Result<Option<Experiment>> {
        let Some(name) = self
            .experiment_names
            .get(&experiment_id)
            .map(|n| n.value().clone())
        else {
            return Ok(None);
        };
        Ok(self.experiments.get(&name).map(|e| e.value().clone()))
    }

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let mut experiments: Vec<Experiment> =
            self.experiments.iter().map(|e| e.value().clone()).collect();
        experiments.sort_by_key(Experiment::created_at);
        Ok(experiments)
    }

    async fn create_run(&self, experiment_id: ExperimentId) -> Result<RunId> {
        if !self.experiment_names.contains_key(&experiment_id) {
            return Err(Error::not_found("experiment", experiment_id));
        }

        let run = Run::new(experiment_id);
        let run_id = run.id();
        self.runs.insert(run_id, run);
        debug!(%experiment_id, %run_id, "created run");
        Ok(run_id)
    }

    async fn get_run(&self, run_id: RunId) -> Result<Option<Run>> {
        Ok(self.runs.get(&run_id).map(|r| r.value().clone()))
    }

    async fn get_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self
            .runs
            .iter()
            .filter(|r| r.value().experiment_id() == experiment_id)
            .map(|r| r.value().clone())
            .collect();
        runs.sort_by_key(Run::created_at);
        Ok(runs)
    }

    async fn set_training_time(&self, run_id: RunId, training_time: Duration) -> Result<()> {
        let mut run = self
            .runs
            .get_mut(&run_id)
            .ok_or_else(|| Error::not_found("run", run_id))?;
        run.set_training_time(training_time);
        Ok(())
    }

    async fn log_metric(&self, run_id: RunId, name: &str, value: f64) -> Result<()> {
        self.ensure_run(run_id)?;
        self.metrics
            .entry(run_id)
            .or_default()
            .push(Metric::new(run_id, name, value));
        Ok(())
    }

    async fn get_metrics(&self, run_id: RunId) -> Result<Vec<Metric>> {
        Ok(self
            .metrics
            .get(&run_id)
            .map(|m| m.value().clone())
            .unwrap_or_default())
    }

    async fn log_hyperparameters(&self, run_id: RunId, parameters: &[(String, String)]) -> Result<()> {
        self.ensure_run(run_id)?;
        self.hyperparameters.entry(run_id).or_default().extend(
            parameters
                .iter()
                .map(|(name, value)| HyperParameter::new(run_id, name, value)),
        );
        Ok(())
    }

    async fn get_hyperparameters(&self, run_id: RunId) -> Result<Vec<HyperParameter>> {
        Ok(self
            .hyperparameters
            .get(&run_id)
            .map(|h| h.value().clone())
            .unwrap_or_default())
    }

    async fn log_confusion_matrix(&self, run_id: RunId, matrix: &ConfusionMatrix) -> Result<()> {
        self.ensure_run(run_id)?;
        self.confusion_matrices.insert(run_id, matrix.clone());
        Ok(())
    }

    async fn get_confusion_matrix(&self, run_id: RunId) -> Result<Option<ConfusionMatrix>> {
        Ok(self.confusion_matrices.get(&run_id).map(|m| m.value().clone()))
    }

    async fn log_data_schema(&self, run_id: RunId, schema: &DataSchema) -> Result<()> {
        self.ensure_run(run_id)?;
        self.data_schemas.insert(run_id, schema.clone());
        Ok(())
    }

    async fn get_data_schema(&self, run_id: RunId) -> Result<Option<DataSchema>> {
        Ok(self.data_schemas.get(&run_id).map(|s| s.value().clone()))
    }

    async fn log_artifact(&self, run_id: RunId, artifact: &ArtifactReference) -> Result<()> {
        self.ensure_run(run_id)?;
        self.artifacts
            .entry(run_id)
            .or_default()
            .push(artifact.clone());
        Ok(())
    }

    async fn get_artifacts(&self, run_id: RunId) -> Result<Vec<ArtifactReference>> {
        Ok(self
            .artifacts
            .get(&run_id)
            .map(|a| a.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_experiment_is_idempotent() {
        let store = MemoryMetadataStore::new();

        let first = store.create_experiment("test").await.unwrap();
        let second = store.create_experiment("test").await.unwrap();
        let other = store.create_experiment("other").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.experiment_count(), 2);
    }

    #[tokio::test]
    async fn test_create_run_unknown_experiment() {
        let store = MemoryMetadataStore::new();
        let err = store.create_run(ExperimentId::generate()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_log_metric_unknown_run() {
        let store = MemoryMetadataStore::new();
        let err = store
            .log_metric(RunId::generate(), "loss", 0.1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_metrics_keep_duplicates_in_order() {
        let store = MemoryMetadataStore::new();
        let experiment_id = store.create_experiment("test").await.unwrap();
        let run_id = store.create_run(experiment_id).await.unwrap();

        store.log_metric(run_id, "loss", 0.9).await.unwrap();
        store.log_metric(run_id, "loss", 0.5).await.unwrap();
        store.log_metric(run_id, "loss", 0.2).await.unwrap();

        let values: Vec<f64> = store
            .get_metrics(run_id)
            .await
            .unwrap()
            .iter()
            .map(Metric::value)
            .collect();
        assert_eq!(values, vec![0.9, 0.5, 0.2]);
        assert_eq!(store.metric_count(), 3);
    }

    #[tokio::test]
    async fn test_get_experiment_by_id() {
        let store = MemoryMetadataStore::new();
        let id = store.create_experiment("lookup").await.unwrap();

        let experiment = store.get_experiment_by_id(id).await.unwrap().unwrap();
        assert_eq!(experiment.name(), "lookup");
        assert!(store
            .get_experiment_by_id(ExperimentId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_create_experiment_same_name() {
        let store = Arc::new(MemoryMetadataStore::new());
        let mut handles = vec![];

        for _ in 0..64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let id = store.create_experiment("shared").await.unwrap();
                // The returned ID must already be usable.
                store.create_run(id).await.unwrap();
                id
            }));
        }

        let mut ids = vec![];
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.experiment_count(), 1);
        assert_eq!(store.run_count(), 64);
    }

    #[test]
    fn test_memory_store_default() {
        let store = MemoryMetadataStore::default();
        assert!(store.is_empty());
    }
}
