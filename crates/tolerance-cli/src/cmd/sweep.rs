//! `tol sweep`: one scenario per removal fraction, run in parallel.

use std::io::Write;

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tolerance_graph::MeasureRegistry;
use tolerance_sim::{Policy, ResultTable, RunParams, Scenario, run_sweep};

use super::{AttackArgs, SimulationArgs, effective_seed, load_graph};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Removal policy applied by every scenario of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyArg {
    #[default]
    Random,
    Attack,
}

/// Arguments for `tol sweep`.
#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    #[command(flatten)]
    pub attack: AttackArgs,

    /// Removal fractions, comma separated. One scenario each.
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub fractions: Vec<f64>,

    /// Removal policy for every scenario.
    #[arg(long, value_enum, default_value_t = PolicyArg::Random)]
    pub policy: PolicyArg,
}

/// JSON output for `tol sweep`.
#[derive(Debug, Serialize)]
struct SweepOutput {
    trips: String,
    base_seed: u64,
    scenarios: Vec<ScenarioOutput>,
}

#[derive(Debug, Serialize)]
struct ScenarioOutput {
    label: String,
    fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<ResultTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn scenarios(args: &SweepArgs, base: &RunParams, policy: &Policy) -> Vec<Scenario> {
    let name = match policy {
        Policy::Random => "random",
        Policy::Attack(_) => "attack",
    };
    args.fractions
        .iter()
        .map(|&fraction| Scenario {
            label: format!("{name}@{fraction}"),
            policy: policy.clone(),
            params: RunParams {
                fraction,
                ..base.clone()
            },
            seed: None,
        })
        .collect()
}

/// Execute `tol sweep`.
pub fn run_sweep_cmd(args: &SweepArgs, output: OutputMode) -> Result<()> {
    let resolved = args.sim.resolve(None)?;
    let policy = match args.policy {
        PolicyArg::Random => Policy::Random,
        PolicyArg::Attack => Policy::Attack(args.attack.resolve(&resolved.file)),
    };
    let (graph, _report) = load_graph(&args.sim.trips, resolved.directed)?;

    let registry = MeasureRegistry::with_builtins();
    let base_seed = effective_seed(resolved.seed);
    let scenarios = scenarios(args, &resolved.params, &policy);
    let reports = run_sweep(&graph, &registry, &scenarios, base_seed);

    let random = matches!(policy, Policy::Random);
    let out = SweepOutput {
        trips: args.sim.trips.display().to_string(),
        base_seed,
        scenarios: reports
            .into_iter()
            .map(|report| {
                let (fingerprint, table, error) = match report.result {
                    Ok(outcome) => (Some(outcome.table.fingerprint()), Some(outcome.table), None),
                    Err(err) => (None, None, Some(err.to_string())),
                };
                ScenarioOutput {
                    label: report.scenario.label,
                    fraction: report.scenario.params.fraction,
                    seed: report.scenario.seed.filter(|_| random),
                    fingerprint,
                    table,
                    error,
                }
            })
            .collect(),
    };

    render_mode(output, &out, render_csv, render_pretty)?;

    let failed = out.scenarios.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} scenarios failed", out.scenarios.len());
    }
    Ok(())
}

/// One CSV with a leading `scenario` column; failed scenarios are skipped.
fn render_csv(out: &SweepOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let mut header_written = false;
    for scenario in &out.scenarios {
        let Some(table) = &scenario.table else {
            continue;
        };
        let csv = table.to_csv();
        let mut lines = csv.lines();
        if let Some(header) = lines.next()
            && !header_written
        {
            writeln!(w, "scenario,{header}")?;
            header_written = true;
        }
        for line in lines {
            writeln!(w, "{},{line}", scenario.label)?;
        }
    }
    Ok(())
}

fn render_pretty(out: &SweepOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Sweep")?;
    pretty_kv(w, "Trips", &out.trips)?;
    pretty_kv(w, "Base seed", out.base_seed.to_string())?;
    pretty_kv(w, "Scenarios", out.scenarios.len().to_string())?;
    for scenario in &out.scenarios {
        writeln!(w)?;
        pretty_section(w, &scenario.label)?;
        if let Some(seed) = scenario.seed {
            pretty_kv(w, "Seed", seed.to_string())?;
        }
        match (&scenario.table, &scenario.error) {
            (Some(table), _) => {
                if let Some(fingerprint) = &scenario.fingerprint {
                    pretty_kv(w, "Fingerprint", fingerprint)?;
                }
                write!(w, "{table}")?;
            }
            (None, Some(error)) => pretty_kv(w, "Error", error)?,
            (None, None) => {}
        }
    }
    Ok(())
}
