//! Data schema logging.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::experiment::{DataSchema, RunId, TabularData};
use crate::store::MetadataStore;
use crate::{Error, Result};

/// Records the shape of the data a run was trained on.
///
/// Only the column names and logical types are kept, never the rows.
#[derive(Debug)]
pub struct DataCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for DataCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MetadataStore> DataCatalog<S> {
    /// Create a catalog over a shared store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Derive a schema from `data` and store it for the run, replacing any
    /// previous one. Returns the stored schema.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID, `NotFound` for an unknown run.
    pub async fn log_data<T: TabularData + ?Sized>(&self, run_id: RunId, data: &T) -> Result<DataSchema> {
        let run_id = run_id.ensure_valid()?;
        let schema = DataSchema::from_tabular(data);

        self.store.log_data_schema(run_id, &schema).await?;
        debug!(%run_id, columns = schema.column_count(), "logged data schema");
        Ok(schema)
    }

    /// Read the schema from a Parquet file footer and store it for the run.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; I/O or Parquet errors if the file cannot
    /// be read; `NotFound` for an unknown run.
    pub async fn log_parquet(&self, run_id: RunId, path: impl AsRef<Path>) -> Result<DataSchema> {
        let run_id = run_id.ensure_valid()?;
        let path = path.as_ref().to_path_buf();

        let schema = tokio::task::spawn_blocking(move || DataSchema::from_parquet(path))
            .await
            .map_err(|e| Error::StorageError(format!("Parquet read task failed: {e}")))??;

        self.store.log_data_schema(run_id, &schema).await?;
        debug!(%run_id, columns = schema.column_count(), "logged data schema from parquet");
        Ok(schema)
    }

    /// The run's data schema, if one was logged.
    ///
    /// # Errors
    ///
    /// `Validation` for a nil ID; store errors otherwise.
    pub async fn get_data(&self, run_id: RunId) -> Result<Option<DataSchema>> {
        self.store.get_data_schema(run_id.ensure_valid()?).await
    }
}
