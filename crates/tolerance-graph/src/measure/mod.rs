//! Named graph measures and their parameters.
//!
//! # Overview
//!
//! A simulation asks for measures by name, each with an optional set of
//! keyword parameters, and gets back a [`MeasureValue`] per measure after
//! every removal batch. Names resolve through a
//! [`MeasureRegistry`](registry::MeasureRegistry); the built-in catalogue
//! lives in [`structure`] (counts, density, degrees, components) and
//! [`paths`] (diameter, average path length).
//!
//! # Disconnected and empty graphs
//!
//! Every built-in measure has a defined answer for graphs that removal has
//! emptied or split apart. Where no sensible number exists the measure
//! returns [`MeasureValue::Undefined`] rather than an error, so a long
//! removal run keeps going and the gap shows up in the result table.

pub mod paths;
pub mod registry;
pub mod structure;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::DegreeMode;

// ---------------------------------------------------------------------------
// MeasureValue
// ---------------------------------------------------------------------------

/// The result of evaluating a graph-level measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    /// A count (vertices, edges, hops).
    Integer(i64),
    /// A real-valued measure.
    Scalar(f64),
    /// A small structured result, such as a degree distribution.
    Sequence(Vec<f64>),
    /// The measure has no value for the current topology.
    Undefined,
}

impl MeasureValue {
    /// Build an integer value from a count.
    #[must_use]
    pub fn count(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Undefined, Self::Integer)
    }

    /// Numeric view of scalar and integer values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Scalar(x) => Some(*x),
            Self::Sequence(_) | Self::Undefined => None,
        }
    }

    /// Whether the measure was undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Scalar(x) => write!(f, "{x}"),
            Self::Sequence(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Undefined => write!(f, "NA"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A single keyword-parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Keyword parameters passed to a measure.
///
/// Typed accessors take the measure name so a mismatch reports which
/// measure rejected which key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasureParams(BTreeMap<String, ParamValue>);

impl MeasureParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Parameter keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Boolean parameter with a default.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameter`] if the value is not a bool.
    pub fn bool_or(&self, measure: &str, key: &str, default: bool) -> Result<bool, GraphError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(type_mismatch(measure, key, "bool", other)),
        }
    }

    /// Float parameter with a default. Integers are widened.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameter`] if the value is not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn float_or(&self, measure: &str, key: &str, default: f64) -> Result<f64, GraphError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(other) => Err(type_mismatch(measure, key, "number", other)),
        }
    }

    /// Non-negative integer parameter with a default.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameter`] if the value is not a
    /// non-negative integer.
    pub fn usize_or(&self, measure: &str, key: &str, default: usize) -> Result<usize, GraphError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Int(v)) => usize::try_from(*v).map_err(|_| {
                GraphError::invalid_parameter(measure, key, format!("{v} is negative"))
            }),
            Some(other) => Err(type_mismatch(measure, key, "integer", other)),
        }
    }

    /// String parameter with a default.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameter`] if the value is not a string.
    pub fn text_or<'a>(
        &'a self,
        measure: &str,
        key: &str,
        default: &'a str,
    ) -> Result<&'a str, GraphError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Text(v)) => Ok(v.as_str()),
            Some(other) => Err(type_mismatch(measure, key, "string", other)),
        }
    }
}

/// Read the `mode` parameter as a [`DegreeMode`], defaulting to `all`.
pub(crate) fn degree_mode(measure: &str, params: &MeasureParams) -> Result<DegreeMode, GraphError> {
    params
        .text_or(measure, "mode", "all")?
        .parse()
        .map_err(|reason: String| GraphError::invalid_parameter(measure, "mode", reason))
}

fn type_mismatch(measure: &str, key: &str, expected: &str, got: &ParamValue) -> GraphError {
    GraphError::invalid_parameter(
        measure,
        key,
        format!("expected {expected}, got {}", got.kind()),
    )
}

// ---------------------------------------------------------------------------
// MeasureSpec
// ---------------------------------------------------------------------------

/// A measure request: registry name, parameters, and output column label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSpec {
    /// Registered measure name.
    pub name: String,
    /// Keyword parameters.
    #[serde(default, skip_serializing_if = "MeasureParams::is_empty")]
    pub params: MeasureParams,
    /// Column label; the name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl MeasureSpec {
    /// A request for `name` with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: MeasureParams::new(),
            label: None,
        }
    }

    /// Add a parameter, builder style.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Override the output column label.
    #[must_use]
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Column label in the result table.
    #[must_use]
    pub fn column(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl From<&str> for MeasureSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MeasureSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_apply_defaults() {
        let params = MeasureParams::new();
        assert!(params.bool_or("diameter", "directed", true).expect("default"));
        assert_eq!(params.usize_or("pagerank", "max_iterations", 100).expect("default"), 100);
        assert_eq!(params.text_or("max_degree", "mode", "all").expect("default"), "all");
    }

    #[test]
    fn float_accepts_integers() {
        let params = MeasureParams::new().with("damping", 1_i64);
        assert!((params.float_or("pagerank", "damping", 0.85).expect("int widens") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let params = MeasureParams::new().with("directed", "yes");
        let err = params
            .bool_or("diameter", "directed", true)
            .expect_err("string is not a bool");
        assert_eq!(
            err.to_string(),
            "invalid parameter `directed` for measure `diameter`: expected bool, got string"
        );
    }

    #[test]
    fn negative_usize_rejected() {
        let params = MeasureParams::new().with("max_iterations", -3_i64);
        assert!(params.usize_or("pagerank", "max_iterations", 100).is_err());
    }

    #[test]
    fn spec_column_prefers_label() {
        let spec = MeasureSpec::new("max_degree").with_param("mode", "in");
        assert_eq!(spec.column(), "max_degree");
        let spec = spec.labelled("max_in_degree");
        assert_eq!(spec.column(), "max_in_degree");
    }

    #[test]
    fn spec_deserializes_from_json() {
        let spec: MeasureSpec =
            serde_json::from_str(r#"{"name":"diameter","params":{"directed":false,"weights":true}}"#)
                .expect("valid spec");
        assert_eq!(spec.name, "diameter");
        assert_eq!(spec.params.get("directed"), Some(&ParamValue::Bool(false)));
        assert_eq!(spec.params.get("weights"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn values_display_for_tables() {
        assert_eq!(MeasureValue::Integer(7).to_string(), "7");
        assert_eq!(MeasureValue::Scalar(0.5).to_string(), "0.5");
        assert_eq!(MeasureValue::Sequence(vec![1.0, 2.0]).to_string(), "[1 2]");
        assert_eq!(MeasureValue::Undefined.to_string(), "NA");
    }

    #[test]
    fn undefined_serializes_as_null() {
        let json = serde_json::to_string(&vec![MeasureValue::Integer(3), MeasureValue::Undefined])
            .expect("serializable");
        assert_eq!(json, "[3,null]");
    }
}
