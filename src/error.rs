//! Error types for Trueno-MLOps
//!
//! Three outcomes matter to callers: the referenced entity is missing
//! (`NotFound`), the caller passed an empty or malformed argument
//! (`Validation`), or the backing store failed (everything else).
//! Backend failures are wrapped as-is and never retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced experiment, run or artifact does not exist
    NotFound,
    /// Empty or invalid identifier / name supplied by the caller
    Validation,
    /// Underlying store or repository failure
    Storage,
}

/// Trueno-MLOps error types
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("experiment", "run", "artifact")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Caller supplied an empty or invalid argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store / repository failure not covered by a wrapped error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Build a `NotFound` error for the given entity kind.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classify this error onto the tracking error taxonomy.
    ///
    /// An IO error with kind `NotFound` (missing artifact file) maps to
    /// [`ErrorKind::NotFound`]; all other wrapped backend failures are
    /// [`ErrorKind::Storage`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Storage,
        }
    }

    /// True when the error reports a missing entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
