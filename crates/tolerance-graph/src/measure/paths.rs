//! Shortest-path measures: diameter and average path length.
//!
//! Both run one single-source search per vertex on a dense topology snapshot:
//! BFS hop counts by default, Dijkstra over route weights with
//! `weights = true`. Unreachable pairs are skipped, so a disconnected graph
//! reports the figures of its reachable part.
//!
//! Parameters:
//!
//! | key        | default | meaning                                   |
//! |------------|---------|-------------------------------------------|
//! | `directed` | `true`  | follow edge direction (directed graphs)   |
//! | `weights`  | `false` | use route weights as distances            |

use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::{MeasureParams, MeasureValue};
use crate::topology::Topology;

/// Longest finite shortest path.
///
/// Undefined on an empty graph; zero when no two distinct vertices are
/// connected. Hop counts are integers, weighted lengths are scalars.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for non-bool parameters, and
/// [`GraphError::Undefined`] when `weights = true` and a route weight is
/// negative or not finite.
#[allow(clippy::cast_possible_truncation)]
pub fn diameter(graph: &StationGraph, params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    let (topo, directed, weighted) = prepare("diameter", graph, params)?;
    if topo.is_empty() {
        return Ok(MeasureValue::Undefined);
    }

    let mut longest = 0.0_f64;
    for source in 0..topo.len() {
        for d in topo.distances_from(source, directed, weighted).into_iter().flatten() {
            longest = longest.max(d);
        }
    }

    if weighted {
        Ok(MeasureValue::Scalar(longest))
    } else {
        Ok(MeasureValue::Integer(longest as i64))
    }
}

/// Mean shortest-path length over ordered pairs `(u, v)`, `u ≠ v`, where
/// `v` is reachable from `u`. Undefined when no such pair exists.
///
/// # Errors
///
/// Same as [`diameter`].
#[allow(clippy::cast_precision_loss)]
pub fn average_path_length(
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<MeasureValue, GraphError> {
    let (topo, directed, weighted) = prepare("average_path_length", graph, params)?;

    let mut total = 0.0;
    let mut pairs = 0_usize;
    for source in 0..topo.len() {
        let dist = topo.distances_from(source, directed, weighted);
        for (target, d) in dist.into_iter().enumerate() {
            if target == source {
                continue;
            }
            if let Some(d) = d {
                total += d;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        return Ok(MeasureValue::Undefined);
    }
    Ok(MeasureValue::Scalar(total / pairs as f64))
}

fn prepare(
    measure: &str,
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<(Topology, bool, bool), GraphError> {
    let directed = params.bool_or(measure, "directed", true)?;
    let weighted = params.bool_or(measure, "weights", false)?;
    let topo = graph.topology();
    if weighted && topo.has_invalid_weight() {
        return Err(GraphError::Undefined {
            measure: measure.to_string(),
            reason: "route weights must be finite and non-negative".to_string(),
        });
    }
    Ok((topo, directed, weighted))
}
