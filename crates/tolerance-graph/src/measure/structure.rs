//! Counting, density, degree and component measures.
//!
//! None of these need shortest paths; they read the station graph directly.
//! An empty graph has a count of zero everywhere except where a ratio would
//! divide by zero, which yields [`MeasureValue::Undefined`].

use crate::error::GraphError;
use crate::graph::{GraphAdapter, StationGraph};
use crate::measure::{MeasureParams, MeasureValue, degree_mode};

/// Number of vertices.
///
/// # Errors
///
/// Never fails; the signature matches the registry's.
pub fn vertex_count(graph: &StationGraph, _params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    Ok(MeasureValue::count(graph.vertex_count()))
}

/// Number of edges, parallel edges and self-loops included.
///
/// # Errors
///
/// Never fails; the signature matches the registry's.
pub fn edge_count(graph: &StationGraph, _params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    Ok(MeasureValue::count(graph.edge_count()))
}

/// Ratio of edges to possible edges.
///
/// A directed graph on `n` vertices has `n(n-1)` possible edges, an
/// undirected one `n(n-1)/2`. With `loops = true` self-pairs are possible
/// too (`n²` and `n(n+1)/2`). Undefined when there are no possible edges.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] if `loops` is not a bool.
#[allow(clippy::cast_precision_loss)]
pub fn density(graph: &StationGraph, params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    let loops = params.bool_or("density", "loops", false)?;
    let n = graph.vertex_count() as f64;
    let m = graph.edge_count() as f64;

    let possible = match (graph.is_directed(), loops) {
        (true, false) => n * (n - 1.0),
        (true, true) => n * n,
        (false, false) => n * (n - 1.0) / 2.0,
        (false, true) => n * (n + 1.0) / 2.0,
    };
    if possible <= 0.0 {
        return Ok(MeasureValue::Undefined);
    }
    Ok(MeasureValue::Scalar(m / possible))
}

/// Largest vertex degree. Zero on an empty graph.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for a bad `mode` or `loops`.
pub fn max_degree(graph: &StationGraph, params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    let mode = degree_mode("max_degree", params)?;
    let loops = params.bool_or("max_degree", "loops", true)?;
    let max = graph
        .degrees(mode, loops)
        .into_iter()
        .map(|(_, d)| d)
        .max()
        .unwrap_or(0);
    Ok(MeasureValue::count(max))
}

/// Number of vertices with each degree: element `k` counts the vertices of
/// degree `k`. Empty sequence on an empty graph.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for a bad `mode` or `loops`.
#[allow(clippy::cast_precision_loss)]
pub fn degree_distribution(
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<MeasureValue, GraphError> {
    let mode = degree_mode("degree_distribution", params)?;
    let loops = params.bool_or("degree_distribution", "loops", true)?;
    let degrees = graph.degrees(mode, loops);

    let Some(max) = degrees.iter().map(|(_, d)| *d).max() else {
        return Ok(MeasureValue::Sequence(Vec::new()));
    };
    let mut histogram = vec![0.0; max + 1];
    for (_, d) in degrees {
        histogram[d] += 1.0;
    }
    Ok(MeasureValue::Sequence(histogram))
}

/// Number of weakly (`mode = "weak"`, default) or strongly connected
/// components. Zero on an empty graph.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for an unknown `mode`.
pub fn component_count(graph: &StationGraph, params: &MeasureParams) -> Result<MeasureValue, GraphError> {
    let components = components("component_count", graph, params)?;
    Ok(MeasureValue::count(components.len()))
}

/// Size of the largest component. With `relative = true` the size is divided
/// by the vertex count, which is undefined on an empty graph.
///
/// # Errors
///
/// Returns [`GraphError::InvalidParameter`] for a bad `mode` or `relative`.
#[allow(clippy::cast_precision_loss)]
pub fn largest_component_size(
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<MeasureValue, GraphError> {
    let relative = params.bool_or("largest_component_size", "relative", false)?;
    let components = components("largest_component_size", graph, params)?;
    // Components come back largest first.
    let largest = components.first().map_or(0, Vec::len);

    if !relative {
        return Ok(MeasureValue::count(largest));
    }
    let n = graph.vertex_count();
    if n == 0 {
        return Ok(MeasureValue::Undefined);
    }
    Ok(MeasureValue::Scalar(largest as f64 / n as f64))
}

fn components(
    measure: &str,
    graph: &StationGraph,
    params: &MeasureParams,
) -> Result<Vec<Vec<String>>, GraphError> {
    match params.text_or(measure, "mode", "weak")? {
        "weak" => Ok(graph.weak_components()),
        "strong" => Ok(graph.strong_components()),
        other => Err(GraphError::invalid_parameter(
            measure,
            "mode",
            format!("unknown component mode {other:?} (expected weak or strong)"),
        )),
    }
}
