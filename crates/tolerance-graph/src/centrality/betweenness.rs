//! Betweenness centrality via Brandes' algorithm.
//!
//! # Algorithm
//!
//! For each source vertex `s`, a BFS counts shortest paths (`sigma`) and
//! records predecessors; dependencies are then accumulated in reverse BFS
//! order and summed across sources. O(V·E) on unweighted graphs.
//!
//! Scores are not normalized. When paths are undirected each pair is seen
//! from both ends, so the sums are halved.

use std::collections::VecDeque;

use tracing::instrument;

use super::by_id;
use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::MeasureParams;
use crate::measure::registry::CentralityScores;

/// Betweenness of every vertex (hop-count shortest paths).
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] if `directed` is not a bool.
#[instrument(skip_all, fields(vertices = graph.inner().node_count()))]
pub fn betweenness(
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<CentralityScores, GraphError> {
    let directed = params.bool_or("betweenness", "directed", true)?;
    let topo = graph.topology();
    let n = topo.len();
    let mut cb = vec![0.0_f64; n];

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next = dist[v].map_or(0, |d| d + 1);
            for &(w, _) in topo.neighbors(v, directed) {
                if dist[w].is_none() {
                    dist[w] = Some(next);
                    queue.push_back(w);
                }
                if dist[w] == Some(next) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                if sigma[w] > 0.0 {
                    delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                }
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    if !(directed && graph.is_directed()) {
        for score in &mut cb {
            *score /= 2.0;
        }
    }

    Ok(by_id(&topo, cb))
}
