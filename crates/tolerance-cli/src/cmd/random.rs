//! `tol random`: uniform random failure.

use anyhow::Result;
use clap::Args;
use tolerance_graph::MeasureRegistry;
use tolerance_sim::Simulator;

use super::{RunOutput, SimulationArgs, effective_seed, load_graph};
use crate::output::{OutputMode, render_mode};

/// Arguments for `tol random`.
#[derive(Args, Debug)]
pub struct RandomArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Fraction of stations to remove, in (0, 1].
    #[arg(long)]
    pub fraction: Option<f64>,
}

/// Execute `tol random`.
pub fn run_random(args: &RandomArgs, output: OutputMode) -> Result<()> {
    let resolved = args.sim.resolve(args.fraction)?;
    let (graph, report) = load_graph(&args.sim.trips, resolved.directed)?;

    let registry = MeasureRegistry::with_builtins();
    let seed = effective_seed(resolved.seed);
    let outcome = Simulator::new(&registry).random_fail_seeded(&graph, &resolved.params, seed)?;

    let out = RunOutput {
        policy: "random",
        trips: args.sim.trips.display().to_string(),
        graph: report,
        fraction: resolved.params.fraction,
        steps: resolved.params.steps,
        seed: Some(seed),
        attack: None,
        removed: &outcome.removed,
        fingerprint: outcome.table.fingerprint(),
        table: &outcome.table,
    };
    render_mode(
        output,
        &out,
        |o, w| o.render_csv(w),
        |o, w| o.render_pretty(w, "Random failure"),
    )
}
