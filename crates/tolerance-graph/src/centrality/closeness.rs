//! Closeness centrality.

use super::by_id;
use crate::error::GraphError;
use crate::graph::StationGraph;
use crate::measure::MeasureParams;
use crate::measure::registry::CentralityScores;

/// Inverse mean hop distance from each vertex to the vertices it can reach.
///
/// Only reachable vertices enter the mean, so a vertex in a small component
/// can score highly. A vertex that reaches nothing scores 0.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] if `directed` is not a bool.
#[allow(clippy::cast_precision_loss)]
pub fn closeness(
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<CentralityScores, GraphError> {
    let directed = params.bool_or("closeness", "directed", true)?;
    let topo = graph.topology();

    let scores = (0..topo.len())
        .map(|v| {
            let (total, reached) = topo
                .distances_from(v, directed, false)
                .into_iter()
                .enumerate()
                .filter(|(w, _)| *w != v)
                .filter_map(|(_, d)| d)
                .fold((0.0, 0_usize), |(sum, count), d| (sum + d, count + 1));
            if reached == 0 || total <= 0.0 {
                0.0
            } else {
                reached as f64 / total
            }
        })
        .collect();

    Ok(by_id(&topo, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closeness_on_a_chain() {
        // a → b → c: a reaches b (1) and c (2), b reaches c (1), c nothing.
        let graph = StationGraph::from_edges(true, &[("a", "b"), ("b", "c")]);
        let scores = closeness(&graph, &MeasureParams::new()).expect("closeness");
        assert_eq!(scores.get("a"), Some(&(2.0 / 3.0)));
        assert_eq!(scores.get("b"), Some(&1.0));
        assert_eq!(scores.get("c"), Some(&0.0));
    }

    #[test]
    fn undirected_middle_is_most_central() {
        let graph = StationGraph::from_edges(true, &[("a", "b"), ("b", "c")]);
        let params = MeasureParams::new().with("directed", false);
        let scores = closeness(&graph, &params).expect("closeness");
        assert_eq!(scores.get("b"), Some(&1.0));
        assert_eq!(scores.get("a"), Some(&(2.0 / 3.0)));
    }
}
