//! Experiment - root entity for experiment tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExperimentId;

/// A named grouping of training runs.
///
/// This is the root entity in the tracking schema. Names are unique
/// within a metadata store; creating an experiment whose name already
/// exists returns the existing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experiment {
    id: ExperimentId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Experiment {
    /// Create a new experiment with a fresh ID and the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ExperimentId::generate(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a builder for rehydrating a stored experiment.
    #[must_use]
    pub fn builder(id: ExperimentId, name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub const fn id(&self) -> ExperimentId {
        self.id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: ExperimentId,
    name: String,
    created_at: DateTime<Utc>,
}

impl ExperimentBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: ExperimentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `Experiment`.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_experiment_new() {
        let experiment = Experiment::new("titanic");
        assert_eq!(experiment.name(), "titanic");
        assert!(!experiment.id().is_nil());
    }

    #[test]
    fn test_experiment_builder_keeps_identity() {
        let id = ExperimentId::generate();
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let experiment = Experiment::builder(id, "sentiment").created_at(ts).build();

        assert_eq!(experiment.id(), id);
        assert_eq!(experiment.created_at(), ts);
    }
}
