//! Metric and HyperParameter records logged against a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RunId;

/// A named floating-point measurement logged against a run.
///
/// Metrics are append-only: logging the same name twice keeps both
/// records, in logging order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    run_id: RunId,
    name: String,
    value: f64,
    logged_at: DateTime<Utc>,
}

impl Metric {
    /// Create a new metric stamped with the current time.
    #[must_use]
    pub fn new(run_id: RunId, name: impl Into<String>, value: f64) -> Self {
        Self {
            run_id,
            name: name.into(),
            value,
            logged_at: Utc::now(),
        }
    }

    /// Create a builder for constructing a metric with an explicit timestamp.
    #[must_use]
    pub fn builder(run_id: RunId, name: impl Into<String>, value: f64) -> MetricBuilder {
        MetricBuilder::new(run_id, name, value)
    }

    /// Get the run ID.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Get the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the time the metric was logged.
    #[must_use]
    pub const fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }
}

/// Builder for `Metric`.
#[derive(Debug)]
pub struct MetricBuilder {
    run_id: RunId,
    name: String,
    value: f64,
    logged_at: DateTime<Utc>,
}

impl MetricBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: RunId, name: impl Into<String>, value: f64) -> Self {
        Self {
            run_id,
            name: name.into(),
            value,
            logged_at: Utc::now(),
        }
    }

    /// Set a custom logging timestamp.
    #[must_use]
    pub const fn logged_at(mut self, logged_at: DateTime<Utc>) -> Self {
        self.logged_at = logged_at;
        self
    }

    /// Build the `Metric`.
    #[must_use]
    pub fn build(self) -> Metric {
        Metric {
            run_id: self.run_id,
            name: self.name,
            value: self.value,
            logged_at: self.logged_at,
        }
    }
}

/// A named configuration value logged against a run, stored as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HyperParameter {
    run_id: RunId,
    name: String,
    value: String,
}

impl HyperParameter {
    /// Create a new hyperparameter record.
    #[must_use]
    pub fn new(run_id: RunId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            run_id,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get the run ID.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Get the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parameter value as text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
