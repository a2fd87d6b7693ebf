//! Run - one training/evaluation attempt within an experiment

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExperimentId, RunId};

/// A single execution of a training attempt, scoped to one experiment.
///
/// `created_at` is fixed when the run is created. `training_time` stays
/// `None` until it is explicitly set; later sets overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    id: RunId,
    experiment_id: ExperimentId,
    created_at: DateTime<Utc>,
    training_time: Option<Duration>,
}

impl Run {
    /// Create a new run for the given experiment, stamped with the current time.
    #[must_use]
    pub fn new(experiment_id: ExperimentId) -> Self {
        Self {
            id: RunId::generate(),
            experiment_id,
            created_at: Utc::now(),
            training_time: None,
        }
    }

    /// Create a builder for rehydrating a stored run.
    #[must_use]
    pub fn builder(id: RunId, experiment_id: ExperimentId) -> RunBuilder {
        RunBuilder::new(id, experiment_id)
    }

    /// Get the run ID.
    #[must_use]
    pub const fn id(&self) -> RunId {
        self.id
    }

    /// Get the parent experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the recorded training time, if one was set.
    #[must_use]
    pub const fn training_time(&self) -> Option<Duration> {
        self.training_time
    }

    /// Record (or overwrite) the training time.
    pub fn set_training_time(&mut self, training_time: Duration) {
        self.training_time = Some(training_time);
    }
}

/// Builder for `Run`.
#[derive(Debug)]
pub struct RunBuilder {
    id: RunId,
    experiment_id: ExperimentId,
    created_at: DateTime<Utc>,
    training_time: Option<Duration>,
}

impl RunBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: RunId, experiment_id: ExperimentId) -> Self {
        Self {
            id,
            experiment_id,
            created_at: Utc::now(),
            training_time: None,
        }
    }

    /// Set the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the training time.
    #[must_use]
    pub const fn training_time(mut self, training_time: Option<Duration>) -> Self {
        self.training_time = training_time;
        self
    }

    /// Build the `Run`.
    #[must_use]
    pub fn build(self) -> Run {
        Run {
            id: self.id,
            experiment_id: self.experiment_id,
            created_at: self.created_at,
            training_time: self.training_time,
        }
    }
}
