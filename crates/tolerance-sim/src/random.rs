//! Random failure: remove a uniformly drawn set of vertices.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tolerance_graph::GraphAdapter;
use tracing::{info, instrument};

use crate::error::SimError;
use crate::schedule::RemovalSchedule;
use crate::simulator::{RunParams, SimulationOutcome, Simulator};

impl<G: GraphAdapter> Simulator<'_, G> {
    /// Remove `round(f × n)` vertices drawn uniformly without replacement,
    /// in `steps` batches, recording every measure after each batch.
    ///
    /// The whole removal set is drawn up front from the sorted vertex ids,
    /// so a given `rng` state always removes the same vertices in the same
    /// order. The input graph is not modified.
    ///
    /// # Errors
    ///
    /// See [`Simulator::plan`] for validation errors; a measure failing
    /// mid-run returns [`SimError::Measure`].
    #[instrument(skip_all, fields(fraction = params.fraction, steps = params.steps))]
    pub fn random_fail<R>(
        &self,
        graph: &G,
        params: &RunParams,
        rng: &mut R,
    ) -> Result<SimulationOutcome<G>, SimError>
    where
        R: Rng + ?Sized,
    {
        let plan = self.plan(graph, params)?;
        info!(
            nodes = plan.node_count(),
            target = plan.target(),
            batch_size = plan.batch_size(),
            "random failure starting"
        );

        let ids = graph.vertex_ids();
        let pool: Vec<String> = index::sample(rng, ids.len(), plan.target())
            .into_iter()
            .map(|i| ids[i].clone())
            .collect();
        let schedule = RemovalSchedule::from_pool(&pool, &plan);
        let mut batches = schedule.batches().iter();

        self.run(graph, params, &plan, |working, _size, _rows| {
            let batch = batches
                .next()
                .ok_or_else(|| SimError::invalid("removal schedule ran out of batches"))?;
            working.remove_vertices(batch)?;
            Ok(batch.clone())
        })
    }

    /// [`Simulator::random_fail`] with a [`StdRng`] seeded from `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`Simulator::random_fail`].
    pub fn random_fail_seeded(
        &self,
        graph: &G,
        params: &RunParams,
        seed: u64,
    ) -> Result<SimulationOutcome<G>, SimError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.random_fail(graph, params, &mut rng)
    }
}
