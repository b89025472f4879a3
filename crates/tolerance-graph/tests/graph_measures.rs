//! Known-topology regression tests for the built-in measures.
//!
//! Each test uses a hand-crafted graph with known properties. Expected
//! values are worked out by hand and hardcoded, so any algorithm change that
//! shifts them is caught. Everything goes through the registry, the way the
//! simulator calls measures.

use tolerance_graph::{
    CentralityScores, GraphAdapter, MeasureParams, MeasureRegistry, MeasureValue, StationGraph,
    TripGraphBuilder, read_trips,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn measure(graph: &StationGraph, name: &str, params: &MeasureParams) -> MeasureValue {
    let registry = MeasureRegistry::with_builtins();
    graph
        .compute_measure(&registry, name, params)
        .expect("built-in measure succeeds")
}

fn centrality(graph: &StationGraph, name: &str) -> CentralityScores {
    let registry = MeasureRegistry::with_builtins();
    graph
        .compute_centrality(&registry, name, &MeasureParams::new())
        .expect("built-in centrality succeeds")
}

fn top(scores: &CentralityScores) -> &str {
    scores
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(id, _)| id.as_str())
        .expect("non-empty scores")
}

/// Two triangles joined by the bridge c-d, undirected.
fn barbell() -> StationGraph {
    StationGraph::from_edges(
        false,
        &[
            ("a", "b"),
            ("b", "c"),
            ("a", "c"),
            ("c", "d"),
            ("d", "e"),
            ("e", "f"),
            ("d", "f"),
        ],
    )
}

// ---------------------------------------------------------------------------
// Graph-level measures
// ---------------------------------------------------------------------------

#[test]
fn complete_directed_graph_on_ten_vertices() {
    let graph = StationGraph::complete(10, true);
    let none = MeasureParams::new();
    assert_eq!(measure(&graph, "vertex_count", &none), MeasureValue::Integer(10));
    assert_eq!(measure(&graph, "edge_count", &none), MeasureValue::Integer(90));
    assert_eq!(measure(&graph, "diameter", &none), MeasureValue::Integer(1));
    assert_eq!(measure(&graph, "density", &none), MeasureValue::Scalar(1.0));
    assert_eq!(measure(&graph, "max_degree", &none), MeasureValue::Integer(18));
    assert_eq!(
        measure(&graph, "average_path_length", &none),
        MeasureValue::Scalar(1.0)
    );
}

#[test]
fn barbell_paths_and_components() {
    let graph = barbell();
    let none = MeasureParams::new();
    // a → f: a-c-d-f.
    assert_eq!(measure(&graph, "diameter", &none), MeasureValue::Integer(3));
    assert_eq!(measure(&graph, "component_count", &none), MeasureValue::Integer(1));
    assert_eq!(measure(&graph, "max_degree", &none), MeasureValue::Integer(3));
}

#[test]
fn removing_the_bridge_splits_the_graph() {
    let mut graph = barbell();
    graph.remove_vertex("c").expect("c is present");

    let none = MeasureParams::new();
    assert_eq!(measure(&graph, "component_count", &none), MeasureValue::Integer(2));
    assert_eq!(
        measure(&graph, "largest_component_size", &none),
        MeasureValue::Integer(3)
    );
    // Largest finite distance is inside d, e, f or between a and b.
    assert_eq!(measure(&graph, "diameter", &none), MeasureValue::Integer(1));
}

#[test]
fn measures_on_a_fully_depleted_graph() {
    let mut graph = StationGraph::complete(3, true);
    graph
        .remove_vertices(&graph.vertex_ids())
        .expect("every id is present");

    let none = MeasureParams::new();
    assert_eq!(measure(&graph, "vertex_count", &none), MeasureValue::Integer(0));
    assert_eq!(measure(&graph, "max_degree", &none), MeasureValue::Integer(0));
    assert!(measure(&graph, "diameter", &none).is_undefined());
    assert!(measure(&graph, "average_path_length", &none).is_undefined());
    assert!(measure(&graph, "density", &none).is_undefined());
}

// ---------------------------------------------------------------------------
// Centralities
// ---------------------------------------------------------------------------

#[test]
fn bridge_endpoints_lead_betweenness() {
    let scores = centrality(&barbell(), "betweenness");
    // c lies on every path from {a, b} to {d, e, f}: 2 × 3 = 6 pairs.
    // d mirrors it from {e, f} to {a, b, c}.
    assert!((scores["c"] - 6.0).abs() < 1e-9);
    assert!((scores["d"] - 6.0).abs() < 1e-9);
    assert!(scores["a"].abs() < 1e-9);
    // Equal scores: the lower id wins.
    assert_eq!(top(&scores), "c");
}

#[test]
fn degree_centrality_matches_ranking() {
    let graph = barbell();
    let scores = centrality(&graph, "degree");
    let ranking = graph.degree_ranking();
    for (id, degree) in &ranking {
        #[allow(clippy::cast_precision_loss)]
        let expected = *degree as f64;
        assert!((scores[id] - expected).abs() < f64::EPSILON);
    }
    assert_eq!(ranking[0].0, "c");
}

#[test]
fn pagerank_favours_the_sink() {
    let graph = StationGraph::from_edges(true, &[("a", "hub"), ("b", "hub"), ("c", "hub")]);
    assert_eq!(top(&centrality(&graph, "pagerank")), "hub");
}

// ---------------------------------------------------------------------------
// Trips → graph → measures
// ---------------------------------------------------------------------------

#[test]
fn trips_build_a_measurable_graph() {
    let input = r#"
{"ride_id":"1","started_at":"2023-03-01 09:00:00","ended_at":"2023-03-01 09:10:00","start_station_id":"100.0","end_station_id":"200","member_casual":"member"}
{"ride_id":"2","started_at":"2023-03-01 09:05:00","ended_at":"2023-03-01 09:20:00","start_station_id":200,"end_station_id":300,"member_casual":"casual"}
{"ride_id":"3","started_at":"2023-03-01 10:00:00","ended_at":"2023-03-01 10:30:00","start_station_id":"100","end_station_id":"200","member_casual":"member"}
{"ride_id":"4","started_at":"2023-03-01 11:00:00","ended_at":"2023-03-01 11:30:00","start_station_id":"","end_station_id":"200","member_casual":"member"}
"#;
    let trips = read_trips(input.as_bytes()).expect("valid JSONL");
    let (graph, report) = TripGraphBuilder::new().build(trips);

    assert_eq!(report.trips_read, 4);
    assert_eq!(report.trips_dropped, 1);
    assert_eq!(graph.vertex_ids(), vec!["100", "200", "300"]);
    assert_eq!(graph.edge_count(), 2);

    let none = MeasureParams::new();
    assert_eq!(measure(&graph, "diameter", &none), MeasureValue::Integer(2));
    let weighted = MeasureParams::new().with("weights", true);
    // 100 → 200 carries two trips, 200 → 300 one.
    assert_eq!(measure(&graph, "diameter", &weighted), MeasureValue::Scalar(3.0));
}
