//! PageRank by power iteration.
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! Vertices without outgoing routes spread their rank evenly over every
//! vertex. Parallel routes between the same pair count once; undirected
//! graphs treat every route as going both ways.
//!
//! | key              | default |
//! |------------------|---------|
//! | `damping`        | 0.85    |
//! | `max_iterations` | 100     |
//! | `tolerance`      | 1e-6    |

use tracing::{instrument, warn};

use super::by_id;
use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::MeasureParams;
use crate::measure::registry::CentralityScores;

/// Stationary random-walk probability of every vertex.
///
/// Iteration stops when the L1 change drops below `tolerance` or after
/// `max_iterations` rounds, whichever comes first. Scores sum to 1.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] if `damping` is outside `[0, 1]`
/// or a parameter has the wrong type.
#[allow(clippy::cast_precision_loss)]
#[instrument(skip_all, fields(vertices = graph.inner().node_count()))]
pub fn pagerank(graph: &StationGraph, params: &MeasureParams) -> Result<CentralityScores, GraphError> {
    let damping = params.float_or("pagerank", "damping", 0.85)?;
    let max_iterations = params.usize_or("pagerank", "max_iterations", 100)?;
    let tolerance = params.float_or("pagerank", "tolerance", 1e-6)?;
    if !(0.0..=1.0).contains(&damping) {
        return Err(GraphError::invalid_parameter(
            "pagerank",
            "damping",
            format!("{damping} is outside [0, 1]"),
        ));
    }

    let topo = graph.topology();
    let n = topo.len();
    if n == 0 {
        return Ok(CentralityScores::new());
    }

    let n_f64 = n as f64;
    let base = (1.0 - damping) / n_f64;
    let out_degree: Vec<usize> = (0..n).map(|v| topo.neighbors(v, true).len()).collect();

    let mut ranks = vec![1.0 / n_f64; n];
    let mut converged = false;

    for _ in 0..max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&v| out_degree[v] == 0)
            .map(|v| ranks[v])
            .sum();
        let teleport = base + damping * dangling / n_f64;

        let next: Vec<f64> = (0..n)
            .map(|v| {
                let inflow: f64 = topo
                    .predecessors(v, true)
                    .iter()
                    .map(|&(u, _)| ranks[u] / out_degree[u] as f64)
                    .sum();
                teleport + damping * inflow
            })
            .collect();

        let delta: f64 = ranks
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        ranks = next;

        if delta < tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(max_iterations, "pagerank did not converge");
    }

    Ok(by_id(&topo, ranks))
}
