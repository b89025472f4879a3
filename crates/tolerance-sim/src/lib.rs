#![forbid(unsafe_code)]
//! tolerance-sim library.
//!
//! Robustness simulations on station graphs: strip vertices in batches,
//! either at random or by centrality, and record how graph measures evolve.
//!
//! # Conventions
//!
//! - **Errors**: Simulations return [`SimError`]; config loading returns
//!   `anyhow::Result` with file context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Example
//!
//! ```rust
//! use tolerance_graph::{MeasureRegistry, MeasureValue, StationGraph};
//! use tolerance_sim::{RunParams, Simulator};
//!
//! let graph = StationGraph::complete(10, true);
//! let registry = MeasureRegistry::with_builtins();
//! let sim = Simulator::new(&registry);
//!
//! let outcome = sim.random_fail_seeded(&graph, &RunParams::new(0.5, 5, ["vertex_count"]), 42)?;
//! let counts: Vec<usize> = outcome.table.rows().iter().map(|r| r.f_count).collect();
//! assert_eq!(counts, vec![1, 2, 3, 4, 5]);
//! assert_eq!(outcome.table.rows()[4].values, vec![MeasureValue::Integer(5)]);
//! # Ok::<(), tolerance_sim::SimError>(())
//! ```

pub mod attack;
pub mod config;
pub mod error;
mod random;
pub mod schedule;
pub mod simulator;
pub mod sweep;
pub mod table;

pub use attack::{AttackOptions, Centrality, RankingPolicy};
pub use config::{MeasureEntry, MeasureList, SimulationFile};
pub use error::SimError;
pub use schedule::{BatchPlan, RemovalSchedule, removal_target};
pub use simulator::{DEFAULT_FRACTION, DEFAULT_MEASURE, RunParams, SimulationOutcome, Simulator};
pub use sweep::{Policy, Scenario, ScenarioReport, run_sweep};
pub use table::{ResultRow, ResultTable};
