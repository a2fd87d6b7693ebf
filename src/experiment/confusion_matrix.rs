//! Confusion matrix - classification evaluation summary for a run

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-class precision/recall plus the count matrix of a classifier.
///
/// Rows of `counts` are actual classes, columns are predicted classes.
/// A run holds at most one confusion matrix; logging a second replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfusionMatrix {
    per_class_precision: Vec<f64>,
    per_class_recall: Vec<f64>,
    counts: Vec<Vec<f64>>,
    number_of_classes: usize,
}

impl ConfusionMatrix {
    /// Create a confusion matrix.
    ///
    /// The number of classes is the number of rows in `counts`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the precision or recall vectors do
    /// not hold one entry per class.
    pub fn new(
        per_class_precision: Vec<f64>,
        per_class_recall: Vec<f64>,
        counts: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let number_of_classes = counts.len();
        if per_class_precision.len() != number_of_classes {
            return Err(Error::Validation(format!(
                "expected {number_of_classes} precision values, got {}",
                per_class_precision.len()
            )));
        }
        if per_class_recall.len() != number_of_classes {
            return Err(Error::Validation(format!(
                "expected {number_of_classes} recall values, got {}",
                per_class_recall.len()
            )));
        }

        Ok(Self {
            per_class_precision,
            per_class_recall,
            counts,
            number_of_classes,
        })
    }

    /// Precision for each class, in class order.
    #[must_use]
    pub fn per_class_precision(&self) -> &[f64] {
        &self.per_class_precision
    }

    /// Recall for each class, in class order.
    #[must_use]
    pub fn per_class_recall(&self) -> &[f64] {
        &self.per_class_recall
    }

    /// The count matrix (rows = actual, columns = predicted).
    #[must_use]
    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    /// Number of classes.
    #[must_use]
    pub const fn number_of_classes(&self) -> usize {
        self.number_of_classes
    }

    /// Count for an (actual, predicted) class pair.
    #[must_use]
    pub fn count(&self, actual: usize, predicted: usize) -> Option<f64> {
        self.counts.get(actual)?.get(predicted).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary() -> ConfusionMatrix {
        ConfusionMatrix::new(
            vec![0.99, 0.44],
            vec![0.77, 0.88],
            vec![vec![9.0, 1.0], vec![4.0, 33.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_confusion_matrix_shape() {
        let matrix = binary();
        assert_eq!(matrix.number_of_classes(), 2);
        assert_eq!(matrix.count(1, 1), Some(33.0));
        assert_eq!(matrix.count(2, 0), None);
    }

    #[test]
    fn test_confusion_matrix_rejects_mismatched_precision() {
        let err = ConfusionMatrix::new(vec![0.5], vec![0.5, 0.5], vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_confusion_matrix_serde() {
        let matrix = binary();
        let json = serde_json::to_string(&matrix).unwrap();
        let back: ConfusionMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, matrix);
    }
}
