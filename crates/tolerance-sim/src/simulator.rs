//! The removal-and-measure loop shared by every policy.
//!
//! # Overview
//!
//! A [`Simulator`] borrows a measure registry and runs policies against any
//! [`GraphAdapter`]. Every run follows the same shape:
//!
//! 1. Validate the fraction, the step count and every measure request
//!    against the registry. Nothing is copied or removed before this passes.
//! 2. Lay out the batches ([`BatchPlan`]).
//! 3. Clone the caller's graph; the clone is the only graph that changes.
//! 4. For each batch: let the policy remove the batch, recompute every
//!    requested measure on what is left, append a row.
//! 5. Hand back the table, the depleted clone and the removal order.
//!
//! The loop runs exactly [`BatchPlan::batch_count`] times. A measure failing
//! mid-run aborts with [`SimError::Measure`]; the partial table is dropped.

use serde::Serialize;
use tolerance_graph::{GraphAdapter, MeasureRegistry, MeasureSpec, MeasureValue};
use tracing::{debug, info};

use crate::error::SimError;
use crate::schedule::{BatchPlan, check_fraction, check_steps};
use crate::table::{ResultRow, ResultTable};

/// Fraction removed when none is given.
pub const DEFAULT_FRACTION: f64 = 0.05;

/// Measure recorded when none is given.
pub const DEFAULT_MEASURE: &str = "diameter";

// ---------------------------------------------------------------------------
// Parameters and outcome
// ---------------------------------------------------------------------------

/// Policy-independent run parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunParams {
    /// Fraction of vertices to remove over the whole run, in `(0, 1]`.
    pub fraction: f64,
    /// Number of batches the removal is split into.
    pub steps: usize,
    /// Measures to record after each batch, in column order.
    pub measures: Vec<MeasureSpec>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_FRACTION,
            steps: 1,
            measures: vec![MeasureSpec::new(DEFAULT_MEASURE)],
        }
    }
}

impl RunParams {
    /// Parameters for `fraction` in `steps` batches recording `measures`.
    #[must_use]
    pub fn new<I, M>(fraction: f64, steps: usize, measures: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MeasureSpec>,
    {
        Self {
            fraction,
            steps,
            measures: measures.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct SimulationOutcome<G> {
    /// One row per applied batch.
    pub table: ResultTable,
    /// The depleted copy of the input graph.
    pub graph: G,
    /// Removed vertex ids in removal order.
    pub removed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Runs robustness policies against graphs of type `G`.
pub struct Simulator<'r, G> {
    registry: &'r MeasureRegistry<G>,
}

impl<G> Clone for Simulator<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Simulator<'_, G> {}

impl<G> std::fmt::Debug for Simulator<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("registry", self.registry)
            .finish()
    }
}

impl<'r, G: GraphAdapter> Simulator<'r, G> {
    /// A simulator resolving measures in `registry`.
    #[must_use]
    pub const fn new(registry: &'r MeasureRegistry<G>) -> Self {
        Self { registry }
    }

    /// The registry measures and centralities resolve in.
    #[must_use]
    pub const fn registry(&self) -> &'r MeasureRegistry<G> {
        self.registry
    }

    /// Check run parameters against `graph` and lay out the batches.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidArgument`] for a bad fraction, step count or empty
    /// measure list, and [`SimError::Graph`] for an unknown measure or a
    /// rejected parameter.
    pub fn plan(&self, graph: &G, params: &RunParams) -> Result<BatchPlan, SimError> {
        check_fraction(params.fraction)?;
        check_steps(params.steps)?;
        if params.measures.is_empty() {
            return Err(SimError::invalid("at least one measure is required"));
        }
        for spec in &params.measures {
            self.registry.check_measure(&spec.name, &spec.params)?;
        }
        BatchPlan::new(params.fraction, params.steps, graph.vertex_count())
    }

    /// Run the batch loop on a private copy of `graph`.
    ///
    /// `remove_batch` receives the working graph, the batch size and the
    /// rows recorded so far, removes exactly that many vertices and returns
    /// their ids. A batch of any other length aborts the run.
    pub(crate) fn run<F>(
        &self,
        graph: &G,
        params: &RunParams,
        plan: &BatchPlan,
        mut remove_batch: F,
    ) -> Result<SimulationOutcome<G>, SimError>
    where
        F: FnMut(&mut G, usize, usize) -> Result<Vec<String>, SimError>,
    {
        let mut working = graph.clone();
        let mut table = ResultTable::new(params.measures.iter().map(MeasureSpec::column));
        let mut removed: Vec<String> = Vec::with_capacity(plan.target());

        for (batch, size) in plan.batch_sizes().into_iter().enumerate() {
            let ids = remove_batch(&mut working, size, table.len())?;
            if ids.len() != size {
                return Err(SimError::invalid(format!(
                    "batch {batch} removed {} vertices, expected {size}",
                    ids.len()
                )));
            }
            removed.extend(ids);

            let values = self.measure_all(&working, params, table.len())?;
            debug!(
                batch,
                removed = removed.len(),
                remaining = working.vertex_count(),
                "batch applied"
            );
            table.push(ResultRow {
                f: plan.fraction_removed(removed.len()),
                f_count: removed.len(),
                values,
            });
        }

        info!(
            rows = table.len(),
            removed = removed.len(),
            remaining = working.vertex_count(),
            "simulation finished"
        );
        Ok(SimulationOutcome {
            table,
            graph: working,
            removed,
        })
    }

    fn measure_all(
        &self,
        graph: &G,
        params: &RunParams,
        rows_completed: usize,
    ) -> Result<Vec<MeasureValue>, SimError> {
        params
            .measures
            .iter()
            .map(|spec| {
                graph
                    .compute_measure(self.registry, &spec.name, &spec.params)
                    .map_err(|source| SimError::Measure {
                        rows_completed,
                        source,
                    })
            })
            .collect()
    }
}
