//! Metric and confusion matrix logging.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::require_name;
use crate::experiment::{ConfusionMatrix, Metric, RunId};
use crate::fields::Fields;
use crate::store::MetadataStore;
use crate::{Error, Result};

/// Records how well a run's model performed.
#[derive(Debug)]
pub struct EvaluationCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for EvaluationCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MetadataStore> EvaluationCatalog<S> {
    /// Create a catalog over a shared store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append one metric. Duplicate names are kept.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID, a blank name or a non-finite value;
    /// `NotFound` for an unknown run.
    pub async fn log_metric(&self, run_id: RunId, name: &str, value: f64) -> Result<()> {
        let run_id = run_id.ensure_valid()?;
        let name = require_name("metric name", name)?;
        if !value.is_finite() {
            return Err(Error::Validation(format!(
                "metric '{name}' must be finite, got {value}"
            )));
        }
        self.store.log_metric(run_id, name, value).await
    }

    /// Log every finite float field of `metrics` as its own metric.
    ///
    /// Non-float fields are skipped and names are trimmed. Returns the
    /// number of metrics written.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID or a blank selected name, checked before
    /// anything is written; `NotFound` for an unknown run, even when no
    /// field qualifies. Metrics written before a failing store call stay
    /// logged.
    pub async fn log_metrics(&self, run_id: RunId, metrics: &Fields) -> Result<usize> {
        let run_id = run_id.ensure_valid()?;
        let selected = metrics
            .metric_values()
            .into_iter()
            .map(|(name, value)| -> Result<(&str, f64)> {
                Ok((require_name("metric name", name)?, value))
            })
            .collect::<Result<Vec<_>>>()?;

        if self.store.get_run(run_id).await?.is_none() {
            return Err(Error::not_found("run", run_id));
        }

        for (name, value) in &selected {
            self.store.log_metric(run_id, name, *value).await?;
        }

        debug!(%run_id, count = selected.len(), "logged metrics");
        Ok(selected.len())
    }

    /// Log metrics from any serializable evaluation result struct.
    ///
    /// # Errors
    ///
    /// `Validation` if `source` is not a struct/map or the ID is nil;
    /// store errors otherwise.
    pub async fn log_metrics_from<T: Serialize + ?Sized>(
        &self,
        run_id: RunId,
        source: &T,
    ) -> Result<usize> {
        let fields = Fields::from_serialize(source)?;
        self.log_metrics(run_id, &fields).await
    }

    /// Store the run's confusion matrix, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID, `NotFound` for an unknown run.
    pub async fn log_confusion_matrix(&self, run_id: RunId, matrix: &ConfusionMatrix) -> Result<()> {
        self.store
            .log_confusion_matrix(run_id.ensure_valid()?, matrix)
            .await
    }

    /// Metrics of a run, in logging order.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_metrics(&self, run_id: RunId) -> Result<Vec<Metric>> {
        self.store.get_metrics(run_id.ensure_valid()?).await
    }

    /// The run's confusion matrix, if one was logged.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_confusion_matrix(&self, run_id: RunId) -> Result<Option<ConfusionMatrix>> {
        self.store.get_confusion_matrix(run_id.ensure_valid()?).await
    }
}
