//! Per-vertex centralities used to rank targets for attacks.
//!
//! # Overview
//!
//! Every centrality maps each current vertex id to a score where higher
//! means more central. They are registered in the
//! [`MeasureRegistry`](crate::MeasureRegistry) alongside the graph-level
//! measures but live in their own table, since they return one value per
//! vertex instead of one value per graph.
//!
//! | name          | parameters                                  |
//! |---------------|---------------------------------------------|
//! | `degree`      | `mode` (all/in/out), `loops`                |
//! | `betweenness` | `directed`                                  |
//! | `closeness`   | `directed`                                  |
//! | `pagerank`    | `damping`, `max_iterations`, `tolerance`    |
//!
//! All of them return an empty map on an empty graph.

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod pagerank;

use crate::measure::registry::CentralityScores;
use crate::topology::Topology;

/// Attach dense-index scores back to vertex ids.
fn by_id(topo: &Topology, scores: Vec<f64>) -> CentralityScores {
    topo.ids().iter().cloned().zip(scores).collect()
}
