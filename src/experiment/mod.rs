//! Experiment tracking entity model
//!
//! Plain data records with no persistence behaviour of their own.
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Run (N)
//!                     │
//!                     ├──< Metric (N)            [append-only]
//!                     ├──< HyperParameter (N)    [append-only]
//!                     ├─── ConfusionMatrix (0..1) [upsert]
//!                     ├─── DataSchema (0..1)      [upsert]
//!                     └──< ArtifactReference (N)  [append-only]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_mlops::experiment::{Experiment, Metric, Run};
//!
//! let experiment = Experiment::new("Titanic Survival Predictor");
//! let run = Run::new(experiment.id());
//! let metric = Metric::new(run.id(), "Accuracy", 0.81);
//!
//! assert_eq!(run.experiment_id(), experiment.id());
//! assert_eq!(metric.run_id(), run.id());
//! ```

mod artifact_record;
mod confusion_matrix;
mod data_schema;
mod experiment_record;
mod ids;
mod metric_record;
mod run_record;

pub use artifact_record::{content_hash, ArtifactReference};
pub use confusion_matrix::ConfusionMatrix;
pub use data_schema::{logical_type_name, DataColumn, DataSchema, TabularData};
pub use experiment_record::{Experiment, ExperimentBuilder};
pub use ids::{ExperimentId, RunId};
pub use metric_record::{HyperParameter, Metric, MetricBuilder};
pub use run_record::{Run, RunBuilder};
