//! Catalog façades over the metadata store and model repository
//!
//! Each catalog groups one concern:
//!
//! | Catalog | Concern |
//! |---|---|
//! | [`LifeCycleCatalog`] | experiments, runs, training time |
//! | [`TrainingCatalog`] | hyperparameters |
//! | [`EvaluationCatalog`] | metrics, confusion matrices |
//! | [`DataCatalog`] | logged data schemas |
//! | [`ModelCatalog`] | model artifacts |
//!
//! Catalogs hold no state of their own. They reject empty identifiers and
//! names before any I/O, then delegate; store and repository errors are
//! returned unchanged.

mod data;
mod evaluation;
mod lifecycle;
mod model;
mod training;

pub use data::DataCatalog;
pub use evaluation::EvaluationCatalog;
pub use lifecycle::LifeCycleCatalog;
pub use model::ModelCatalog;
pub use training::TrainingCatalog;

use crate::{Error, Result};

/// Reject blank names; returns the name with surrounding whitespace removed.
fn require_name<'a>(what: &str, name: &'a str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name_trims() {
        assert_eq!(require_name("experiment name", "  titanic ").unwrap(), "titanic");
    }

    #[test]
    fn test_require_name_rejects_blank() {
        let err = require_name("metric name", " \t").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: metric name must not be empty");
    }
}
