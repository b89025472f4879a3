#![forbid(unsafe_code)]
//! tolerance-graph library.
//!
//! The station graph that robustness simulations run against, the registry
//! of named graph measures they call, and the builder that turns trip
//! records into a weighted station network.
//!
//! # Conventions
//!
//! - **Errors**: Library operations return [`GraphError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Example
//!
//! ```rust
//! use tolerance_graph::{GraphAdapter, MeasureParams, MeasureRegistry, StationGraph};
//!
//! let mut graph = StationGraph::from_edges(true, &[("a", "b"), ("b", "c"), ("c", "a")]);
//! let registry = MeasureRegistry::with_builtins();
//!
//! let diameter = graph.compute_measure(&registry, "diameter", &MeasureParams::new())?;
//! assert_eq!(diameter.as_f64(), Some(2.0));
//!
//! graph.remove_vertex("b")?;
//! assert_eq!(graph.vertex_count(), 2);
//! # Ok::<(), tolerance_graph::GraphError>(())
//! ```

pub mod centrality;
pub mod error;
pub mod graph;
pub mod measure;
mod topology;
pub mod trips;

pub use error::GraphError;
pub use graph::{DegreeMode, GraphAdapter, Route, Station, StationGraph};
pub use measure::registry::{CentralityScores, MeasureRegistry, ParamKind, Signature};
pub use measure::{MeasureParams, MeasureSpec, MeasureValue, ParamValue};
pub use trips::{BuildReport, TripGraphBuilder, TripRecord, normalize_station_id, read_trips};
