//! Name → measure dispatch.
//!
//! # Overview
//!
//! A [`MeasureRegistry`] maps string names to statically-typed callables of
//! a fixed signature. There are two tables:
//!
//! - **graph measures**: `Fn(&G, &MeasureParams) -> Result<MeasureValue>`,
//!   summarising the whole graph (diameter, density, …);
//! - **centralities**: `Fn(&G, &MeasureParams) -> Result<CentralityScores>`,
//!   scoring every vertex (degree, betweenness, …) for targeted attacks.
//!
//! Each entry carries a [`Signature`] listing the parameter keys it accepts,
//! optionally with the [`ParamKind`] each key must have. Names are validated
//! when registered; parameter keys and declared kinds are validated before
//! the callable runs, so a typo or a string where a bool belongs fails fast
//! with a named error instead of surfacing halfway through a simulation.
//!
//! ```rust
//! use tolerance_graph::{MeasureParams, MeasureRegistry, MeasureValue, Signature, StationGraph};
//!
//! let mut registry = MeasureRegistry::<StationGraph>::new();
//! registry.register_measure(
//!     Signature::new("route_count").summary("number of routes"),
//!     |g: &StationGraph, _params: &MeasureParams| Ok(MeasureValue::count(g.edge_count())),
//! )?;
//!
//! let graph = StationGraph::from_edges(true, &[("a", "b")]);
//! let value = registry.compute(&graph, "route_count", &MeasureParams::new())?;
//! assert_eq!(value, MeasureValue::Integer(1));
//! # Ok::<(), tolerance_graph::GraphError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::centrality;
use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::{MeasureParams, MeasureValue, paths, structure};

/// Per-vertex scores keyed by vertex id.
pub type CentralityScores = BTreeMap<String, f64>;

/// Boxed graph-level measure.
pub type MeasureFn<G> =
    Box<dyn Fn(&G, &MeasureParams) -> Result<MeasureValue, GraphError> + Send + Sync>;

/// Boxed per-vertex centrality.
pub type CentralityFn<G> =
    Box<dyn Fn(&G, &MeasureParams) -> Result<CentralityScores, GraphError> + Send + Sync>;

// ---------------------------------------------------------------------------
// ParamKind
// ---------------------------------------------------------------------------

/// The shape a declared parameter value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any value; the callable checks it.
    Any,
    /// `true` or `false`.
    Bool,
    /// Integer or float.
    Number,
    /// Number in `[0, 1]`.
    Fraction,
    /// Non-negative integer.
    Count,
    /// One of a fixed set of strings, compared case-insensitively.
    Choice(&'static [&'static str]),
}

impl ParamKind {
    fn check(self, measure: &str, key: &str, params: &MeasureParams) -> Result<(), GraphError> {
        match self {
            Self::Any => Ok(()),
            Self::Bool => params.bool_or(measure, key, false).map(drop),
            Self::Number => params.float_or(measure, key, 0.0).map(drop),
            Self::Count => params.usize_or(measure, key, 0).map(drop),
            Self::Fraction => {
                let value = params.float_or(measure, key, 0.0)?;
                if (0.0..=1.0).contains(&value) {
                    Ok(())
                } else {
                    Err(GraphError::invalid_parameter(
                        measure,
                        key,
                        format!("{value} is outside [0, 1]"),
                    ))
                }
            }
            Self::Choice(options) => {
                if params.get(key).is_none() {
                    return Ok(());
                }
                let value = params.text_or(measure, key, "")?;
                if options.iter().any(|o| o.eq_ignore_ascii_case(value)) {
                    Ok(())
                } else {
                    Err(GraphError::invalid_parameter(
                        measure,
                        key,
                        format!("unknown value {value:?} (expected {})", options.join(", ")),
                    ))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Name, accepted parameters and a one-line description of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    params: Vec<String>,
    kinds: BTreeMap<String, ParamKind>,
    summary: String,
}

impl Signature {
    /// A signature accepting no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            kinds: BTreeMap::new(),
            summary: String::new(),
        }
    }

    /// Declare the accepted parameter keys, leaving their values unchecked.
    #[must_use]
    pub fn params(mut self, keys: &[&str]) -> Self {
        self.params = keys.iter().map(ToString::to_string).collect();
        self.kinds.clear();
        self
    }

    /// Accept one more key whose value must be of `kind`.
    #[must_use]
    pub fn param(mut self, key: &str, kind: ParamKind) -> Self {
        if !self.params.iter().any(|p| p == key) {
            self.params.push(key.to_string());
        }
        self.kinds.insert(key.to_string(), kind);
        self
    }

    /// Attach a one-line description.
    #[must_use]
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.summary = text.into();
        self
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted parameter keys.
    #[must_use]
    pub fn accepted(&self) -> &[String] {
        &self.params
    }

    /// Declared kind of `key`; [`ParamKind::Any`] when none was given.
    #[must_use]
    pub fn kind(&self, key: &str) -> ParamKind {
        self.kinds.get(key).copied().unwrap_or(ParamKind::Any)
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.summary
    }

    fn check(&self, params: &MeasureParams) -> Result<(), GraphError> {
        for key in params.keys() {
            if !self.params.iter().any(|p| p == key) {
                let reason = if self.params.is_empty() {
                    "measure takes no parameters".to_string()
                } else {
                    format!("accepted: {}", self.params.join(", "))
                };
                return Err(GraphError::invalid_parameter(&self.name, key, reason));
            }
            self.kind(key).check(&self.name, key, params)?;
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))
    }
}

// ---------------------------------------------------------------------------
// MeasureRegistry
// ---------------------------------------------------------------------------

struct Entry<F> {
    signature: Signature,
    func: F,
}

/// Registry of named graph measures and centralities for graphs of type `G`.
pub struct MeasureRegistry<G> {
    measures: BTreeMap<String, Entry<MeasureFn<G>>>,
    centralities: BTreeMap<String, Entry<CentralityFn<G>>>,
}

impl<G> Default for MeasureRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> fmt::Debug for MeasureRegistry<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureRegistry")
            .field("measures", &self.measures.keys().collect::<Vec<_>>())
            .field("centralities", &self.centralities.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<G> MeasureRegistry<G> {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            measures: BTreeMap::new(),
            centralities: BTreeMap::new(),
        }
    }

    /// Register a graph-level measure.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidMeasureName`] for an empty name or one
    /// containing whitespace, and [`GraphError::DuplicateMeasure`] if the
    /// name is already taken.
    pub fn register_measure<F>(&mut self, signature: Signature, func: F) -> Result<(), GraphError>
    where
        F: Fn(&G, &MeasureParams) -> Result<MeasureValue, GraphError> + Send + Sync + 'static,
    {
        validate_name(&signature.name)?;
        if self.measures.contains_key(&signature.name) {
            return Err(GraphError::DuplicateMeasure(signature.name));
        }
        self.measures.insert(
            signature.name.clone(),
            Entry {
                signature,
                func: Box::new(func),
            },
        );
        Ok(())
    }

    /// Register a per-vertex centrality.
    ///
    /// # Errors
    ///
    /// Same as [`MeasureRegistry::register_measure`].
    pub fn register_centrality<F>(
        &mut self,
        signature: Signature,
        func: F,
    ) -> Result<(), GraphError>
    where
        F: Fn(&G, &MeasureParams) -> Result<CentralityScores, GraphError> + Send + Sync + 'static,
    {
        validate_name(&signature.name)?;
        if self.centralities.contains_key(&signature.name) {
            return Err(GraphError::DuplicateMeasure(signature.name));
        }
        self.centralities.insert(
            signature.name.clone(),
            Entry {
                signature,
                func: Box::new(func),
            },
        );
        Ok(())
    }

    /// Whether a graph measure with this name is registered.
    #[must_use]
    pub fn has_measure(&self, name: &str) -> bool {
        self.measures.contains_key(name)
    }

    /// Whether a centrality with this name is registered.
    #[must_use]
    pub fn has_centrality(&self, name: &str) -> bool {
        self.centralities.contains_key(name)
    }

    /// Check that `name` is a registered measure accepting every key in
    /// `params` with a value of the declared kind, without running it.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownMeasure`] or [`GraphError::InvalidParameter`].
    pub fn check_measure(&self, name: &str, params: &MeasureParams) -> Result<(), GraphError> {
        self.measures
            .get(name)
            .ok_or_else(|| GraphError::UnknownMeasure(name.to_string()))?
            .signature
            .check(params)
    }

    /// Check that `name` is a registered centrality accepting `params`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownMeasure`] or [`GraphError::InvalidParameter`].
    pub fn check_centrality(&self, name: &str, params: &MeasureParams) -> Result<(), GraphError> {
        self.centralities
            .get(name)
            .ok_or_else(|| GraphError::UnknownMeasure(name.to_string()))?
            .signature
            .check(params)
    }

    /// Evaluate the graph measure `name` on `graph`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownMeasure`], [`GraphError::InvalidParameter`], or
    /// the measure's own error.
    pub fn compute(
        &self,
        graph: &G,
        name: &str,
        params: &MeasureParams,
    ) -> Result<MeasureValue, GraphError> {
        let entry = self
            .measures
            .get(name)
            .ok_or_else(|| GraphError::UnknownMeasure(name.to_string()))?;
        entry.signature.check(params)?;
        (entry.func)(graph, params)
    }

    /// Evaluate the centrality `name` on `graph`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownMeasure`], [`GraphError::InvalidParameter`], or
    /// the centrality's own error.
    pub fn centrality(
        &self,
        graph: &G,
        name: &str,
        params: &MeasureParams,
    ) -> Result<CentralityScores, GraphError> {
        let entry = self
            .centralities
            .get(name)
            .ok_or_else(|| GraphError::UnknownMeasure(name.to_string()))?;
        entry.signature.check(params)?;
        (entry.func)(graph, params)
    }

    /// Signatures of the registered graph measures, sorted by name.
    pub fn measures(&self) -> impl Iterator<Item = &Signature> {
        self.measures.values().map(|e| &e.signature)
    }

    /// Signatures of the registered centralities, sorted by name.
    pub fn centralities(&self) -> impl Iterator<Item = &Signature> {
        self.centralities.values().map(|e| &e.signature)
    }
}

fn validate_name(name: &str) -> Result<(), GraphError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(GraphError::InvalidMeasureName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in catalogue
// ---------------------------------------------------------------------------

type Builtin<T> = fn(&StationGraph, &MeasureParams) -> Result<T, GraphError>;

const DEGREE_MODES: ParamKind = ParamKind::Choice(&["all", "total", "in", "out"]);
const COMPONENT_MODES: ParamKind = ParamKind::Choice(&["weak", "strong"]);

impl MeasureRegistry<StationGraph> {
    /// A registry pre-loaded with every built-in measure and centrality.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let installed = registry.install_builtins();
        debug_assert!(installed.is_ok(), "built-in catalogue: {installed:?}");
        registry
    }

    /// Register the built-in catalogue into this registry.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateMeasure`] if a built-in name is already taken.
    pub fn install_builtins(&mut self) -> Result<(), GraphError> {
        let measures: [(Signature, Builtin<MeasureValue>); 9] = [
            (
                Signature::new("vertex_count").summary("number of vertices"),
                structure::vertex_count,
            ),
            (
                Signature::new("edge_count").summary("number of edges"),
                structure::edge_count,
            ),
            (
                Signature::new("density")
                    .param("loops", ParamKind::Bool)
                    .summary("ratio of edges to possible edges"),
                structure::density,
            ),
            (
                Signature::new("max_degree")
                    .param("mode", DEGREE_MODES)
                    .param("loops", ParamKind::Bool)
                    .summary("largest vertex degree"),
                structure::max_degree,
            ),
            (
                Signature::new("degree_distribution")
                    .param("mode", DEGREE_MODES)
                    .param("loops", ParamKind::Bool)
                    .summary("number of vertices per degree value"),
                structure::degree_distribution,
            ),
            (
                Signature::new("component_count")
                    .param("mode", COMPONENT_MODES)
                    .summary("number of weak or strong components"),
                structure::component_count,
            ),
            (
                Signature::new("largest_component_size")
                    .param("mode", COMPONENT_MODES)
                    .param("relative", ParamKind::Bool)
                    .summary("size of the largest component"),
                structure::largest_component_size,
            ),
            (
                Signature::new("diameter")
                    .param("directed", ParamKind::Bool)
                    .param("weights", ParamKind::Bool)
                    .summary("longest finite shortest path"),
                paths::diameter,
            ),
            (
                Signature::new("average_path_length")
                    .param("directed", ParamKind::Bool)
                    .param("weights", ParamKind::Bool)
                    .summary("mean shortest path length over reachable pairs"),
                paths::average_path_length,
            ),
        ];

        let centralities: [(Signature, Builtin<CentralityScores>); 4] = [
            (
                Signature::new("degree")
                    .param("mode", DEGREE_MODES)
                    .param("loops", ParamKind::Bool)
                    .summary("vertex degree"),
                centrality::degree::degree,
            ),
            (
                Signature::new("betweenness")
                    .param("directed", ParamKind::Bool)
                    .summary("shortest paths passing through each vertex (Brandes)"),
                centrality::betweenness::betweenness,
            ),
            (
                Signature::new("closeness")
                    .param("directed", ParamKind::Bool)
                    .summary("inverse mean distance to reachable vertices"),
                centrality::closeness::closeness,
            ),
            (
                Signature::new("pagerank")
                    .param("damping", ParamKind::Fraction)
                    .param("max_iterations", ParamKind::Count)
                    .param("tolerance", ParamKind::Number)
                    .summary("stationary random-walk probability"),
                centrality::pagerank::pagerank,
            ),
        ];

        for (signature, func) in measures {
            self.register_measure(signature, func)?;
        }
        for (signature, func) in centralities {
            self.register_centrality(signature, func)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> impl Fn(&StationGraph, &MeasureParams) -> Result<MeasureValue, GraphError>
    + Send
    + Sync
    + 'static {
        move |_, _| Ok(MeasureValue::Integer(value))
    }

    #[test]
    fn builtins_are_listed_in_name_order() {
        let registry = MeasureRegistry::with_builtins();
        let names: Vec<&str> = registry.measures().map(Signature::name).collect();
        assert_eq!(
            names,
            vec![
                "average_path_length",
                "component_count",
                "degree_distribution",
                "density",
                "diameter",
                "edge_count",
                "largest_component_size",
                "max_degree",
                "vertex_count",
            ]
        );
        let centralities: Vec<&str> = registry.centralities().map(Signature::name).collect();
        assert_eq!(centralities, vec!["betweenness", "closeness", "degree", "pagerank"]);
    }

    #[test]
    fn unknown_measure_is_a_named_error() {
        let registry = MeasureRegistry::with_builtins();
        let graph = StationGraph::complete(3, true);
        let err = registry
            .compute(&graph, "radius", &MeasureParams::new())
            .expect_err("radius is not registered");
        assert!(matches!(err, GraphError::UnknownMeasure(name) if name == "radius"));
    }

    #[test]
    fn unknown_parameter_is_rejected_before_running() {
        let registry = MeasureRegistry::with_builtins();
        let params = MeasureParams::new().with("weigths", true);
        let err = registry
            .check_measure("diameter", &params)
            .expect_err("typo in key");
        assert!(matches!(err, GraphError::InvalidParameter { ref key, .. } if key == "weigths"));

        let err = registry
            .check_measure("vertex_count", &MeasureParams::new().with("mode", "all"))
            .expect_err("vertex_count takes nothing");
        assert!(err.to_string().contains("takes no parameters"));
    }

    #[test]
    fn wrong_value_kind_is_rejected_before_running() {
        let registry = MeasureRegistry::with_builtins();
        let err = registry
            .check_measure("diameter", &MeasureParams::new().with("weights", "yes"))
            .expect_err("string where a bool belongs");
        assert_eq!(
            err.to_string(),
            "invalid parameter `weights` for measure `diameter`: expected bool, got string"
        );

        assert!(matches!(
            registry.check_measure("component_count", &MeasureParams::new().with("mode", "in")),
            Err(GraphError::InvalidParameter { ref key, .. }) if key == "mode"
        ));
        registry
            .check_measure("max_degree", &MeasureParams::new().with("mode", "OUT"))
            .expect("modes compare case-insensitively");
    }

    #[test]
    fn centrality_values_are_checked_without_running() {
        let registry = MeasureRegistry::with_builtins();
        let err = registry
            .check_centrality("pagerank", &MeasureParams::new().with("damping", "high"))
            .expect_err("damping must be numeric");
        assert!(err.to_string().contains("expected number, got string"));
        assert!(
            registry
                .check_centrality("pagerank", &MeasureParams::new().with("damping", 1.5))
                .is_err()
        );
        assert!(
            registry
                .check_centrality("pagerank", &MeasureParams::new().with("max_iterations", -1_i64))
                .is_err()
        );
        registry
            .check_centrality(
                "pagerank",
                &MeasureParams::new().with("damping", 1_i64).with("tolerance", 1e-9),
            )
            .expect("integers widen to numbers");
    }

    #[test]
    fn untyped_keys_accept_any_value() {
        let sig = Signature::new("custom").params(&["anything"]);
        assert_eq!(sig.kind("anything"), ParamKind::Any);
        sig.check(&MeasureParams::new().with("anything", "text"))
            .expect("no declared kind");
        let typed = sig.param("flag", ParamKind::Bool);
        assert_eq!(typed.accepted(), ["anything", "flag"]);
        assert!(typed.check(&MeasureParams::new().with("flag", 3_i64)).is_err());
    }

    #[test]
    fn installing_builtins_twice_reports_the_duplicate() {
        let mut registry = MeasureRegistry::with_builtins();
        assert!(matches!(
            registry.install_builtins(),
            Err(GraphError::DuplicateMeasure(name)) if name == "vertex_count"
        ));
    }

    #[test]
    fn duplicate_and_invalid_names_rejected() {
        let mut registry = MeasureRegistry::<StationGraph>::new();
        registry
            .register_measure(Signature::new("answer"), constant(42))
            .expect("first registration");
        assert!(matches!(
            registry.register_measure(Signature::new("answer"), constant(1)),
            Err(GraphError::DuplicateMeasure(_))
        ));
        assert!(matches!(
            registry.register_measure(Signature::new(""), constant(1)),
            Err(GraphError::InvalidMeasureName(_))
        ));
        assert!(matches!(
            registry.register_measure(Signature::new("two words"), constant(1)),
            Err(GraphError::InvalidMeasureName(_))
        ));
    }

    #[test]
    fn custom_measure_sees_current_graph() {
        let mut registry = MeasureRegistry::<StationGraph>::new();
        registry
            .register_measure(Signature::new("routes"), |g: &StationGraph, _: &MeasureParams| {
                Ok(MeasureValue::count(g.edge_count()))
            })
            .expect("registers");
        let graph = StationGraph::complete(4, false);
        assert_eq!(
            registry.compute(&graph, "routes", &MeasureParams::new()).expect("runs"),
            MeasureValue::Integer(6)
        );
    }

    #[test]
    fn measures_and_centralities_are_separate_tables() {
        let registry = MeasureRegistry::with_builtins();
        assert!(registry.has_centrality("degree"));
        assert!(!registry.has_measure("degree"));
        assert!(matches!(
            registry.check_centrality("diameter", &MeasureParams::new()),
            Err(GraphError::UnknownMeasure(_))
        ));
    }

    #[test]
    fn signature_display() {
        let sig = Signature::new("diameter").params(&["directed", "weights"]);
        assert_eq!(sig.to_string(), "diameter(directed, weights)");
    }
}
