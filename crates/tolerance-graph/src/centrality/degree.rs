//! Degree centrality.

use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::registry::CentralityScores;
use crate::measure::{MeasureParams, degree_mode};

/// Degree of every vertex as a score.
///
/// `mode` picks in-, out- or total degree (directed graphs only) and
/// `loops = false` ignores self-loops. Parallel routes each count, matching
/// [`GraphAdapter::degree_ranking`](crate::GraphAdapter::degree_ranking).
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for a bad `mode` or `loops`.
#[allow(clippy::cast_precision_loss)]
pub fn degree(graph: &StationGraph, params: &MeasureParams) -> Result<CentralityScores, GraphError> {
    let mode = degree_mode("degree", params)?;
    let loops = params.bool_or("degree", "loops", true)?;
    Ok(graph
        .degrees(mode, loops)
        .into_iter()
        .map(|(id, d)| (id, d as f64))
        .collect())
}
