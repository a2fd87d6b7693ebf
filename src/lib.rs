//! # Trueno-MLOps: Experiment Tracking for ML Training Pipelines
//!
//! **Version**: 0.1.0
//!
//! Trueno-MLOps records what happened during model training: which
//! experiment a run belongs to, the hyperparameters it used, the shape of
//! its training data, its evaluation metrics and confusion matrix, how long
//! it trained, and where its model binary lives.
//!
//! ## Layout
//!
//! - [`store`]: persistence contract for metadata, with in-memory and SQLite backends
//! - [`repository`]: persistence contract for model bytes, with local and object-store backends
//! - [`catalog`]: per-concern façades that validate input and delegate
//! - [`Context`]: the catalogs bundled over one store and one repository
//!
//! ## Example Usage
//!
//! ```rust
//! use trueno_mlops::fields::Fields;
//! use trueno_mlops::{Context, TrackingConfig};
//!
//! # async fn example() -> trueno_mlops::Result<()> {
//! let downloads = std::env::temp_dir().join("trueno-mlops-doc");
//! let context = Context::open(&TrackingConfig::in_memory(downloads))?;
//!
//! let run_id = context
//!     .lifecycle()
//!     .create_run_for_experiment("Titanic Survival Predictor")
//!     .await?;
//!
//! let evaluation = Fields::new().with("Accuracy", 0.81).with("F1Score", 0.74);
//! context.evaluation().log_metrics(run_id, &evaluation).await?;
//!
//! assert_eq!(context.evaluation().get_metrics(run_id).await?.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod backend;
pub mod blob;
pub mod catalog;
pub mod config;
pub mod error;
pub mod experiment;
pub mod fields;
pub mod logging;
pub mod repository;
pub mod store;

use std::sync::Arc;

pub use config::TrackingConfig;
pub use error::{Error, ErrorKind, Result};

use backend::{AnyMetadataStore, AnyModelRepository};
use catalog::{DataCatalog, EvaluationCatalog, LifeCycleCatalog, ModelCatalog, TrainingCatalog};
use repository::ModelRepository;
use store::MetadataStore;

/// Entry point bundling every catalog over one metadata store and one
/// model repository.
#[derive(Debug)]
pub struct Context<S, R> {
    lifecycle: LifeCycleCatalog<S>,
    training: TrainingCatalog<S>,
    evaluation: EvaluationCatalog<S>,
    data: DataCatalog<S>,
    model: ModelCatalog<S, R>,
}

impl<S, R> Clone for Context<S, R> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            training: self.training.clone(),
            evaluation: self.evaluation.clone(),
            data: self.data.clone(),
            model: self.model.clone(),
        }
    }
}

impl<S: MetadataStore, R: ModelRepository> Context<S, R> {
    /// Create a context owning `store` and `repository`.
    #[must_use]
    pub fn new(store: S, repository: R) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(repository))
    }

    /// Create a context over an already shared store and repository.
    #[must_use]
    pub fn from_shared(store: Arc<S>, repository: Arc<R>) -> Self {
        Self {
            lifecycle: LifeCycleCatalog::new(Arc::clone(&store)),
            training: TrainingCatalog::new(Arc::clone(&store)),
            evaluation: EvaluationCatalog::new(Arc::clone(&store)),
            data: DataCatalog::new(Arc::clone(&store)),
            model: ModelCatalog::new(store, repository),
        }
    }

    /// Experiments, runs and training time.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifeCycleCatalog<S> {
        &self.lifecycle
    }

    /// Hyperparameters.
    #[must_use]
    pub const fn training(&self) -> &TrainingCatalog<S> {
        &self.training
    }

    /// Metrics and confusion matrices.
    #[must_use]
    pub const fn evaluation(&self) -> &EvaluationCatalog<S> {
        &self.evaluation
    }

    /// Data schemas.
    #[must_use]
    pub const fn data(&self) -> &DataCatalog<S> {
        &self.data
    }

    /// Model artifacts.
    #[must_use]
    pub const fn model(&self) -> &ModelCatalog<S, R> {
        &self.model
    }
}

impl Context<AnyMetadataStore, AnyModelRepository> {
    /// Open the backends named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata store cannot be opened.
    pub fn open(config: &TrackingConfig) -> Result<Self> {
        let store = AnyMetadataStore::open(&config.metadata)?;
        let repository = AnyModelRepository::open(&config.artifacts);
        Ok(Self::new(store, repository))
    }

    /// Open the backends named by the `TRUENO_MLOPS_CONFIG` file, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the
    /// metadata store cannot be opened.
    pub fn from_env() -> Result<Self> {
        Self::open(&TrackingConfig::from_env()?)
    }
}
