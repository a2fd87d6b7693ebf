//! Named scalar fields for metric and hyperparameter logging
//!
//! Training frameworks report results in their own struct types. Rather
//! than coupling to those types, callers hand the tracking catalogs a
//! [`Fields`] map: either built explicitly, or derived from any
//! `serde::Serialize` value with [`Fields::from_serialize`].
//!
//! ## Selection Rules
//!
//! - Metrics keep only [`FieldValue::Float`] entries (finite values).
//! - Hyperparameters keep [`FieldValue::Float`] and [`FieldValue::Integer`]
//!   entries, rendered to text.
//! - Everything else is skipped silently.
//!
//! ```rust
//! use trueno_mlops::fields::Fields;
//!
//! let fields = Fields::new()
//!     .with("LearningRate", 0.1)
//!     .with("IterationCount", 50)
//!     .with("Label", "positive");
//!
//! assert_eq!(fields.metric_values().len(), 1);
//! assert_eq!(fields.parameter_values().len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// A scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Floating-point number
    Float(f64),
    /// Integer number
    Integer(i64),
    /// Text
    Text(String),
    /// Boolean flag
    Bool(bool),
}

impl FieldValue {
    /// Value as a metric, if this is a finite float.
    #[must_use]
    pub fn as_metric(&self) -> Option<f64> {
        match self {
            Self::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Value as hyperparameter text, if this is numeric.
    #[must_use]
    pub fn as_parameter(&self) -> Option<String> {
        match self {
            Self::Float(v) => Some(v.to_string()),
            Self::Integer(v) => Some(v.to_string()),
            Self::Text(_) | Self::Bool(_) => None,
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_f64() => n.as_f64().map(Self::Float),
            Value::Number(n) => n.as_i64().map(Self::Integer),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Name → scalar map handed to the training and evaluation catalogs.
///
/// Iteration order is by name; callers must not rely on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: BTreeMap<String, FieldValue>,
}

impl Fields {
    /// Create an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Collect the top-level scalar members of any serializable value.
    ///
    /// Nested objects, arrays, nulls and integers outside the `i64` range
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the value does not serialize to a
    /// map (e.g. a bare number or a sequence), or a serialization error.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map
                .iter()
                .filter_map(|(name, v)| FieldValue::from_json(v).map(|fv| (name.clone(), fv)))
                .collect()),
            other => Err(Error::Validation(format!(
                "field source must serialize to a map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fields selected as metrics.
    #[must_use]
    pub fn metric_values(&self) -> Vec<(&str, f64)> {
        self.iter()
            .filter_map(|(name, v)| v.as_metric().map(|m| (name, m)))
            .collect()
    }

    /// Fields selected as hyperparameters, rendered to text.
    #[must_use]
    pub fn parameter_values(&self) -> Vec<(&str, String)> {
        self.iter()
            .filter_map(|(name, v)| v.as_parameter().map(|p| (name, p)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[allow(non_snake_case)]
    struct TrainerOptions {
        LearningRate: f64,
        IterationCount: u32,
        Label: String,
        Shuffle: bool,
        Weights: Vec<f64>,
    }

    fn options() -> TrainerOptions {
        TrainerOptions {
            LearningRate: 0.1,
            IterationCount: 50,
            Label: "positive".to_string(),
            Shuffle: true,
            Weights: vec![1.0, 2.0],
        }
    }

    #[test]
    fn test_from_serialize_keeps_scalars() {
        let fields = Fields::from_serialize(&options()).unwrap();

        assert_eq!(fields.len(), 4);
        assert_eq!(fields.get("LearningRate"), Some(&FieldValue::Float(0.1)));
        assert_eq!(fields.get("IterationCount"), Some(&FieldValue::Integer(50)));
        assert!(fields.get("Weights").is_none());
    }

    #[test]
    fn test_metric_selection_floats_only() {
        let fields = Fields::from_serialize(&options()).unwrap();
        assert_eq!(fields.metric_values(), vec![("LearningRate", 0.1)]);
    }

    #[test]
    fn test_parameter_selection_numeric_only() {
        let fields = Fields::from_serialize(&options()).unwrap();
        let params = fields.parameter_values();

        assert_eq!(params.len(), 2);
        assert!(params.contains(&("LearningRate", "0.1".to_string())));
        assert!(params.contains(&("IterationCount", "50".to_string())));
    }

    #[test]
    fn test_whole_float_stays_float() {
        #[derive(Serialize)]
        struct M {
            loss: f64,
        }
        let fields = Fields::from_serialize(&M { loss: 1.0 }).unwrap();
        assert_eq!(fields.metric_values(), vec![("loss", 1.0)]);
    }

    #[test]
    fn test_non_finite_metric_skipped() {
        let fields = Fields::new().with("nan", f64::NAN).with("inf", f64::INFINITY);
        assert!(fields.metric_values().is_empty());
    }

    #[test]
    fn test_from_serialize_rejects_non_map() {
        let err = Fields::from_serialize(&42).unwrap_err();
        assert!(err.to_string().contains("got number"));
    }

    #[test]
    fn test_from_iterator() {
        let fields: Fields = [("a", 1.5), ("b", 2.5)].into_iter().collect();
        assert_eq!(fields.len(), 2);
    }
}
