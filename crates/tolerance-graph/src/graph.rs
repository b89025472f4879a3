//! The station graph and the adapter surface the simulator works against.
//!
//! # Overview
//!
//! [`StationGraph`] is a [`petgraph`] stable graph whose vertices are
//! stations (keyed by a unique string id) and whose edges are routes
//! aggregated from trip records. A stable graph keeps the remaining
//! indices valid while vertices are deleted, which is the one mutation
//! robustness simulations perform.
//!
//! ## Directedness
//!
//! Edges are always stored source → target. An undirected graph keeps the
//! same storage and traversals simply ignore the direction, so a route
//! `a → b` and a route `b → a` are two parallel edges between `a` and `b`.
//!
//! ## Adapter
//!
//! [`GraphAdapter`] is the capability surface the simulator needs: count,
//! list and remove vertices, rank them by degree, and evaluate named
//! measures through a [`MeasureRegistry`]. The simulator is generic over
//! it so applications can bring their own graph type.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use petgraph::{
    Direction,
    algo::tarjan_scc,
    stable_graph::{NodeIndex, StableDiGraph},
    visit::{EdgeRef, IntoEdgeReferences},
};

use crate::error::GraphError;
use crate::measure::registry::{CentralityScores, MeasureRegistry};
use crate::measure::{MeasureParams, MeasureValue};

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Minimal mutable-graph surface required by robustness simulations.
pub trait GraphAdapter: Clone {
    /// Number of vertices currently in the graph.
    fn vertex_count(&self) -> usize;

    /// Identifiers of all current vertices, sorted ascending.
    fn vertex_ids(&self) -> Vec<String>;

    /// Remove the given vertices and every incident edge.
    ///
    /// All ids are checked before anything is removed, so a failed call
    /// leaves the graph untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] naming the first id that is not
    /// present.
    fn remove_vertices(&mut self, ids: &[String]) -> Result<(), GraphError>;

    /// Remove a single vertex and its incident edges.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if `id` is not present.
    fn remove_vertex(&mut self, id: &str) -> Result<(), GraphError> {
        self.remove_vertices(&[id.to_string()])
    }

    /// Vertices with their total degree, highest first. Equal degrees are
    /// ordered by ascending identifier.
    fn degree_ranking(&self) -> Vec<(String, usize)>;

    /// Evaluate the graph-level measure `name` on the current graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownMeasure`] if `name` is not registered,
    /// [`GraphError::InvalidParameter`] for rejected parameters, or whatever
    /// the measure itself reports.
    fn compute_measure(
        &self,
        registry: &MeasureRegistry<Self>,
        name: &str,
        params: &MeasureParams,
    ) -> Result<MeasureValue, GraphError> {
        registry.compute(self, name, params)
    }

    /// Evaluate the per-vertex centrality `name` on the current graph.
    ///
    /// # Errors
    ///
    /// Same as [`GraphAdapter::compute_measure`], resolved against the
    /// registry's centralities.
    fn compute_centrality(
        &self,
        registry: &MeasureRegistry<Self>,
        name: &str,
        params: &MeasureParams,
    ) -> Result<CentralityScores, GraphError> {
        registry.centrality(self, name, params)
    }
}

// ---------------------------------------------------------------------------
// Vertex and edge payloads
// ---------------------------------------------------------------------------

/// A station (vertex) in the trip network.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Station {
    /// Unique station identifier.
    pub id: String,
    /// Human-readable station name, if known.
    pub name: Option<String>,
    /// Latitude of the station.
    pub lat: Option<f64>,
    /// Longitude of the station.
    pub lng: Option<f64>,
}

impl Station {
    /// A station with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A route (edge) aggregating every trip between an ordered station pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Edge name, `"<start>-<end>"`.
    pub name: String,
    /// Number of trips on this route.
    pub weight: f64,
    /// Trips taken by casual riders.
    pub casual_count: u64,
    /// Trips taken by members.
    pub member_count: u64,
    /// Sum of trip durations in seconds.
    pub travel_time_secs: f64,
    /// Start timestamp of the first trip seen on the route.
    pub first_started_at: Option<NaiveDateTime>,
    /// End timestamp of the first trip seen on the route.
    pub first_ended_at: Option<NaiveDateTime>,
    /// Year the first trip started.
    pub start_year: Option<i32>,
    /// Year the first trip ended.
    pub end_year: Option<i32>,
}

impl Route {
    /// A bare route with a name and weight.
    #[must_use]
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            casual_count: 0,
            member_count: 0,
            travel_time_secs: 0.0,
            first_started_at: None,
            first_ended_at: None,
            start_year: None,
            end_year: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Degree mode
// ---------------------------------------------------------------------------

/// Which edges count towards a vertex's degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegreeMode {
    /// Incoming plus outgoing edges.
    #[default]
    All,
    /// Incoming edges only.
    In,
    /// Outgoing edges only.
    Out,
}

impl FromStr for DegreeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "total" => Ok(Self::All),
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("unknown degree mode {other:?} (expected all, in or out)")),
        }
    }
}

impl fmt::Display for DegreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

// ---------------------------------------------------------------------------
// StationGraph
// ---------------------------------------------------------------------------

/// A directed or undirected weighted station network.
#[derive(Debug, Clone)]
pub struct StationGraph {
    /// Stations and routes. Edges are stored source → target.
    graph: StableDiGraph<Station, Route>,
    /// Station id → node index.
    ///
    /// A `BTreeMap` keeps ids sorted, which gives every traversal and every
    /// ranking a deterministic order.
    index: BTreeMap<String, NodeIndex>,
    /// Whether traversals respect edge direction.
    directed: bool,
}

impl StationGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            graph: StableDiGraph::default(),
            index: BTreeMap::new(),
            directed,
        }
    }

    /// Build a graph from `(source, target)` pairs, one unit-weight route
    /// per pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use tolerance_graph::{GraphAdapter, StationGraph};
    ///
    /// let graph = StationGraph::from_edges(true, &[("a", "b"), ("a", "c")]);
    /// assert_eq!(graph.vertex_count(), 3);
    /// assert_eq!(graph.edge_count(), 2);
    /// ```
    #[must_use]
    pub fn from_edges(directed: bool, edges: &[(&str, &str)]) -> Self {
        let mut graph = Self::new(directed);
        for (source, target) in edges {
            graph.add_route(source, target, Route::new(format!("{source}-{target}"), 1.0));
        }
        graph
    }

    /// A complete graph on `n` vertices named `"0"`, `"1"`, ….
    ///
    /// Directed graphs get both `i → j` and `j → i` for every pair.
    #[must_use]
    pub fn complete(n: usize, directed: bool) -> Self {
        let mut graph = Self::new(directed);
        for i in 0..n {
            graph.add_station(Station::new(i.to_string()));
        }
        for i in 0..n {
            for j in 0..n {
                if i == j || (!directed && j < i) {
                    continue;
                }
                let (a, b) = (i.to_string(), j.to_string());
                graph.add_route(&a, &b, Route::new(format!("{a}-{b}"), 1.0));
            }
        }
        graph
    }

    /// Whether traversals respect edge direction.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Insert a station. An existing station with the same id is kept as is.
    pub fn add_station(&mut self, station: Station) -> NodeIndex {
        if let Some(idx) = self.index.get(&station.id) {
            return *idx;
        }
        let id = station.id.clone();
        let idx = self.graph.add_node(station);
        self.index.insert(id, idx);
        idx
    }

    /// Add a route between two stations, creating bare stations for
    /// endpoints that are not in the graph yet.
    pub fn add_route(&mut self, source: &str, target: &str, route: Route) {
        let s = self.add_station(Station::new(source));
        let t = self.add_station(Station::new(target));
        self.graph.add_edge(s, t, route);
    }

    /// Whether a station with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a station by id.
    #[must_use]
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.index
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// Look up the first route stored from `source` to `target`.
    #[must_use]
    pub fn route(&self, source: &str, target: &str) -> Option<&Route> {
        let s = *self.index.get(source)?;
        let t = *self.index.get(target)?;
        self.graph
            .find_edge(s, t)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Number of routes (edges).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over `(source_id, target_id, route)` for every edge.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &Route)> + '_ {
        self.graph.edge_references().filter_map(|e| {
            let source = self.graph.node_weight(e.source())?;
            let target = self.graph.node_weight(e.target())?;
            Some((source.id.as_str(), target.id.as_str(), e.weight()))
        })
    }

    /// Degree of the station `id`, or `None` if it is absent.
    ///
    /// Undirected graphs ignore `mode`. A self-loop adds two to the total
    /// degree and one to the in- or out-degree; `loops = false` ignores it.
    #[must_use]
    pub fn degree(&self, id: &str, mode: DegreeMode, loops: bool) -> Option<usize> {
        self.index
            .get(id)
            .map(|idx| self.degree_of(*idx, mode, loops))
    }

    pub(crate) fn degree_of(&self, idx: NodeIndex, mode: DegreeMode, loops: bool) -> usize {
        let count = |dir: Direction| {
            self.graph
                .edges_directed(idx, dir)
                .filter(|e| loops || e.source() != e.target())
                .count()
        };
        let mode = if self.directed { mode } else { DegreeMode::All };
        match mode {
            DegreeMode::All => count(Direction::Outgoing) + count(Direction::Incoming),
            DegreeMode::In => count(Direction::Incoming),
            DegreeMode::Out => count(Direction::Outgoing),
        }
    }

    /// Degrees of every station in ascending id order.
    #[must_use]
    pub fn degrees(&self, mode: DegreeMode, loops: bool) -> Vec<(String, usize)> {
        self.index
            .iter()
            .map(|(id, idx)| (id.clone(), self.degree_of(*idx, mode, loops)))
            .collect()
    }

    /// Weakly connected components as sorted id lists, largest first.
    #[must_use]
    pub fn weak_components(&self) -> Vec<Vec<String>> {
        let topo = self.topology();
        let mut seen = vec![false; topo.len()];
        let mut components = Vec::new();

        for start in 0..topo.len() {
            if seen[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut members = Vec::new();
            seen[start] = true;
            while let Some(v) = stack.pop() {
                members.push(topo.id(v).to_string());
                for &(w, _) in topo.neighbors(v, false) {
                    if !seen[w] {
                        seen[w] = true;
                        stack.push(w);
                    }
                }
            }
            members.sort_unstable();
            components.push(members);
        }

        sort_components(&mut components);
        components
    }

    /// Strongly connected components as sorted id lists, largest first.
    ///
    /// For an undirected graph these are the weak components.
    #[must_use]
    pub fn strong_components(&self) -> Vec<Vec<String>> {
        if !self.directed {
            return self.weak_components();
        }
        let mut components: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .map(|scc| {
                let mut members: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).map(|s| s.id.clone()))
                    .collect();
                members.sort_unstable();
                members
            })
            .collect();
        sort_components(&mut components);
        components
    }

    /// BLAKE3 hash of the sorted edge list, for telling graphs apart in
    /// reports and caches.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut edges: Vec<(&str, &str, u64)> = self
            .routes()
            .map(|(s, t, r)| (s, t, r.weight.to_bits()))
            .collect();
        edges.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        hasher.update(if self.directed { b"d" } else { b"u" });
        for id in self.index.keys() {
            hasher.update(id.as_bytes());
            hasher.update(b"\x00");
        }
        for (source, target, weight) in edges {
            hasher.update(source.as_bytes());
            hasher.update(b"\x00");
            hasher.update(target.as_bytes());
            hasher.update(b"\x00");
            hasher.update(&weight.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }

    pub(crate) const fn inner(&self) -> &StableDiGraph<Station, Route> {
        &self.graph
    }

    pub(crate) fn indexed(&self) -> impl Iterator<Item = (&str, NodeIndex)> + '_ {
        self.index.iter().map(|(id, idx)| (id.as_str(), *idx))
    }
}

fn sort_components(components: &mut [Vec<String>]) {
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
}

impl GraphAdapter for StationGraph {
    fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    fn vertex_ids(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    fn remove_vertices(&mut self, ids: &[String]) -> Result<(), GraphError> {
        // Validate the whole batch before touching the graph.
        let mut batch = Vec::with_capacity(ids.len());
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            let idx = self
                .index
                .get(id)
                .copied()
                .ok_or_else(|| GraphError::UnknownVertex(id.clone()))?;
            if seen.insert(idx) {
                batch.push((id, idx));
            }
        }

        for (id, idx) in batch {
            self.graph.remove_node(idx);
            self.index.remove(id);
        }
        Ok(())
    }

    fn degree_ranking(&self) -> Vec<(String, usize)> {
        let mut ranking = self.degrees(DegreeMode::All, true);
        // Ids come out of the index ascending, so a stable sort on degree
        // alone keeps ties in id order.
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_graph() {
        let graph = StationGraph::new(true);
        assert_eq!(graph.vertex_count(), 0);
        assert!(graph.vertex_ids().is_empty());
        assert!(graph.degree_ranking().is_empty());
    }

    #[test]
    fn vertex_ids_are_sorted() {
        let graph = StationGraph::from_edges(true, &[("c", "a"), ("b", "c")]);
        assert_eq!(graph.vertex_ids(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn add_station_keeps_first_attributes() {
        let mut graph = StationGraph::new(true);
        graph.add_station(Station {
            id: "s1".to_string(),
            name: Some("Clark St".to_string()),
            lat: Some(41.9),
            lng: Some(-87.6),
        });
        graph.add_station(Station {
            id: "s1".to_string(),
            name: Some("Other".to_string()),
            ..Station::default()
        });
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(
            graph.station("s1").and_then(|s| s.name.as_deref()),
            Some("Clark St")
        );
    }

    #[test]
    fn remove_vertices_drops_incident_edges() {
        let mut graph = StationGraph::from_edges(true, &[("a", "b"), ("b", "c"), ("c", "a")]);
        graph.remove_vertices(&ids(&["b"])).expect("b is present");
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.route("c", "a").is_some());
        assert!(!graph.contains("b"));
    }

    #[test]
    fn remove_vertices_is_atomic() {
        let mut graph = StationGraph::from_edges(true, &[("a", "b"), ("b", "c")]);
        let err = graph
            .remove_vertices(&ids(&["a", "zz", "b"]))
            .expect_err("zz is absent");
        assert!(matches!(err, GraphError::UnknownVertex(id) if id == "zz"));
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn remove_vertex_twice_fails() {
        let mut graph = StationGraph::from_edges(true, &[("a", "b")]);
        graph.remove_vertex("a").expect("first removal");
        assert!(matches!(
            graph.remove_vertex("a"),
            Err(GraphError::UnknownVertex(_))
        ));
    }

    #[test]
    fn duplicate_ids_in_a_batch_remove_once() {
        let mut graph = StationGraph::from_edges(true, &[("a", "b")]);
        graph
            .remove_vertices(&ids(&["a", "a"]))
            .expect("duplicates are tolerated");
        assert_eq!(graph.vertex_ids(), ids(&["b"]));
    }

    #[test]
    fn directed_degree_modes() {
        // a → b, a → c, c → a, a → a
        let graph = StationGraph::from_edges(
            true,
            &[("a", "b"), ("a", "c"), ("c", "a"), ("a", "a")],
        );
        assert_eq!(graph.degree("a", DegreeMode::Out, true), Some(3));
        assert_eq!(graph.degree("a", DegreeMode::In, true), Some(2));
        assert_eq!(graph.degree("a", DegreeMode::All, true), Some(5));
        assert_eq!(graph.degree("a", DegreeMode::All, false), Some(3));
        assert_eq!(graph.degree("zz", DegreeMode::All, true), None);
    }

    #[test]
    fn undirected_degree_ignores_mode() {
        let graph = StationGraph::from_edges(false, &[("a", "b"), ("c", "a")]);
        assert_eq!(graph.degree("a", DegreeMode::In, true), Some(2));
        assert_eq!(graph.degree("a", DegreeMode::Out, true), Some(2));
    }

    #[test]
    fn degree_ranking_breaks_ties_by_id() {
        // Star on a plus a disjoint pair: a=3, others tie at 1.
        let graph = StationGraph::from_edges(
            true,
            &[("a", "d"), ("a", "b"), ("a", "c"), ("f", "e")],
        );
        let ranking = graph.degree_ranking();
        let order: Vec<&str> = ranking.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(ranking[0].1, 3);
    }

    #[test]
    fn complete_graph_sizes() {
        let directed = StationGraph::complete(5, true);
        assert_eq!(directed.vertex_count(), 5);
        assert_eq!(directed.edge_count(), 20);

        let undirected = StationGraph::complete(5, false);
        assert_eq!(undirected.edge_count(), 10);
    }

    #[test]
    fn components_weak_and_strong() {
        // a ⇄ b → c, plus isolated-pair d → e
        let graph = StationGraph::from_edges(
            true,
            &[("a", "b"), ("b", "a"), ("b", "c"), ("d", "e")],
        );
        assert_eq!(
            graph.weak_components(),
            vec![ids(&["a", "b", "c"]), ids(&["d", "e"])]
        );
        assert_eq!(
            graph.strong_components(),
            vec![ids(&["a", "b"]), ids(&["c"]), ids(&["d"]), ids(&["e"])]
        );
    }

    #[test]
    fn content_hash_tracks_edges() {
        let a = StationGraph::from_edges(true, &[("a", "b"), ("b", "c")]);
        let b = StationGraph::from_edges(true, &[("b", "c"), ("a", "b")]);
        let c = StationGraph::from_edges(true, &[("a", "b")]);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn clone_is_independent() {
        let original = StationGraph::complete(4, true);
        let mut copy = original.clone();
        copy.remove_vertex("0").expect("present");
        assert_eq!(original.vertex_count(), 4);
        assert_eq!(copy.vertex_count(), 3);
    }
}
