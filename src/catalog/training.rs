//! Hyperparameter logging.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::require_name;
use crate::experiment::{HyperParameter, RunId};
use crate::fields::Fields;
use crate::store::MetadataStore;
use crate::Result;

/// Records the configuration a run was trained with.
#[derive(Debug)]
pub struct TrainingCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for TrainingCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MetadataStore> TrainingCatalog<S> {
    /// Create a catalog over a shared store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Log the numeric fields of `parameters` as hyperparameters.
    ///
    /// Float and integer fields are rendered to text; text and boolean
    /// fields are skipped. Names are trimmed. Returns the number of records
    /// written.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID or a blank selected name, in which case
    /// nothing is written; `NotFound` for an unknown run.
    pub async fn log_hyperparameters(&self, run_id: RunId, parameters: &Fields) -> Result<usize> {
        let run_id = run_id.ensure_valid()?;
        let selected = parameters
            .parameter_values()
            .into_iter()
            .map(|(name, value)| -> Result<(String, String)> {
                Ok((require_name("hyperparameter name", name)?.to_string(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        self.store.log_hyperparameters(run_id, &selected).await?;
        debug!(%run_id, count = selected.len(), "logged hyperparameters");
        Ok(selected.len())
    }

    /// Log hyperparameters from any serializable trainer options struct.
    ///
    /// # Errors
    ///
    /// `Validation` if `source` is not a struct/map or the ID is nil;
    /// store errors otherwise.
    pub async fn log_hyperparameters_from<T: Serialize + ?Sized>(
        &self,
        run_id: RunId,
        source: &T,
    ) -> Result<usize> {
        let fields = Fields::from_serialize(source)?;
        self.log_hyperparameters(run_id, &fields).await
    }

    /// Hyperparameters of a run, in logging order.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_hyperparameters(&self, run_id: RunId) -> Result<Vec<HyperParameter>> {
        self.store.get_hyperparameters(run_id.ensure_valid()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMetadataStore;

    #[tokio::test]
    async fn test_log_hyperparameters_skips_text() {
        let store = Arc::new(MemoryMetadataStore::new());
        let experiment_id = store.create_experiment("e").await.unwrap();
        let run_id = store.create_run(experiment_id).await.unwrap();
        let training = TrainingCatalog::new(Arc::clone(&store));

        let fields = Fields::new()
            .with("LearningRate", 0.1)
            .with("IterationCount", 50)
            .with("Label", "positive");

        assert_eq!(training.log_hyperparameters(run_id, &fields).await.unwrap(), 2);

        let logged = training.get_hyperparameters(run_id).await.unwrap();
        let names: Vec<&str> = logged.iter().map(HyperParameter::name).collect();
        assert!(names.contains(&"LearningRate"));
        assert!(names.contains(&"IterationCount"));
        assert!(!names.contains(&"Label"));
    }

    #[tokio::test]
    async fn test_log_hyperparameters_blank_name_rejected() {
        let store = Arc::new(MemoryMetadataStore::new());
        let experiment_id = store.create_experiment("e").await.unwrap();
        let run_id = store.create_run(experiment_id).await.unwrap();
        let training = TrainingCatalog::new(Arc::clone(&store));

        let fields = Fields::new().with("LearningRate", 0.1).with(" ", 7);

        let err = training.log_hyperparameters(run_id, &fields).await.unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert!(training.get_hyperparameters(run_id).await.unwrap().is_empty());

        let trimmed = Fields::new().with(" Epochs ", 7);
        training.log_hyperparameters(run_id, &trimmed).await.unwrap();
        let logged = training.get_hyperparameters(run_id).await.unwrap();
        assert_eq!(logged[0].name(), "Epochs");
    }
}
