//! Data schema - column-level description of a dataset used by a run

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A single named, typed column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataColumn {
    name: String,
    data_type: String,
}

impl DataColumn {
    /// Create a column description from a name and a logical type label.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type label (e.g. `Boolean`, `String`, `Float32`).
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }
}

/// Column layout of a dataset logged against a run (one per run).
///
/// `column_count` is always derived from `columns`; a serialized count is
/// ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "SerializedSchema")]
pub struct DataSchema {
    column_count: usize,
    columns: Vec<DataColumn>,
}

#[derive(Deserialize)]
struct SerializedSchema {
    columns: Vec<DataColumn>,
}

impl From<SerializedSchema> for DataSchema {
    fn from(serialized: SerializedSchema) -> Self {
        Self::new(serialized.columns)
    }
}

impl DataSchema {
    /// Create a schema from an ordered list of columns.
    #[must_use]
    pub fn new(columns: Vec<DataColumn>) -> Self {
        Self {
            column_count: columns.len(),
            columns,
        }
    }

    /// Derive a schema from any tabular data description.
    #[must_use]
    pub fn from_tabular<T: TabularData + ?Sized>(data: &T) -> Self {
        Self::new(data.columns())
    }

    /// Derive a schema from the footer of a Parquet file.
    ///
    /// Only the file metadata is read, not the row groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid Parquet.
    pub fn from_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = std::fs::File::open(path.as_ref())?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        Ok(Self::from_tabular(builder.schema().as_ref()))
    }

    /// Number of columns.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.column_count
    }

    /// Columns in dataset order.
    #[must_use]
    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }
}

/// An external tabular data handle that can describe its columns.
///
/// Implemented for Arrow schemas and record batches; other data frame
/// libraries can implement it in a few lines.
pub trait TabularData {
    /// Column names and logical type labels, in column order.
    fn columns(&self) -> Vec<DataColumn>;
}

impl TabularData for Schema {
    fn columns(&self) -> Vec<DataColumn> {
        self.fields()
            .iter()
            .map(|field| DataColumn::new(field.name(), logical_type_name(field.data_type())))
            .collect()
    }
}

impl TabularData for Arc<Schema> {
    fn columns(&self) -> Vec<DataColumn> {
        self.as_ref().columns()
    }
}

impl TabularData for RecordBatch {
    fn columns(&self) -> Vec<DataColumn> {
        self.schema().columns()
    }
}

impl TabularData for [DataColumn] {
    fn columns(&self) -> Vec<DataColumn> {
        self.to_vec()
    }
}

impl TabularData for Vec<DataColumn> {
    fn columns(&self) -> Vec<DataColumn> {
        self.clone()
    }
}

/// Map an Arrow type onto the label stored in a [`DataColumn`].
///
/// All string encodings collapse to `String`; everything else keeps
/// Arrow's own name.
#[must_use]
pub fn logical_type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Boolean => "Boolean".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "String".to_string(),
        other => other.to_string(),
    }
}
