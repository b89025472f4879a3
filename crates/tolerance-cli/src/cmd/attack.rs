//! `tol attack`: targeted removal of the most central stations.

use anyhow::Result;
use clap::Args;
use tolerance_graph::MeasureRegistry;
use tolerance_sim::Simulator;

use super::{AttackArgs, RunOutput, SimulationArgs, load_graph};
use crate::output::{OutputMode, render_mode};

/// Arguments for `tol attack`.
#[derive(Args, Debug)]
pub struct AttackCmdArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    #[command(flatten)]
    pub attack: AttackArgs,

    /// Fraction of stations to remove, in (0, 1].
    #[arg(long)]
    pub fraction: Option<f64>,
}

/// Execute `tol attack`.
pub fn run_attack(args: &AttackCmdArgs, output: OutputMode) -> Result<()> {
    let resolved = args.sim.resolve(args.fraction)?;
    let options = args.attack.resolve(&resolved.file);
    let (graph, report) = load_graph(&args.sim.trips, resolved.directed)?;

    let registry = MeasureRegistry::with_builtins();
    let outcome = Simulator::new(&registry).target_attack(&graph, &resolved.params, &options)?;

    let out = RunOutput {
        policy: "attack",
        trips: args.sim.trips.display().to_string(),
        graph: report,
        fraction: resolved.params.fraction,
        steps: resolved.params.steps,
        seed: None,
        attack: Some(&options),
        removed: &outcome.removed,
        fingerprint: outcome.table.fingerprint(),
        table: &outcome.table,
    };
    render_mode(
        output,
        &out,
        |o, w| o.render_csv(w),
        |o, w| o.render_pretty(w, "Targeted attack"),
    )
}
