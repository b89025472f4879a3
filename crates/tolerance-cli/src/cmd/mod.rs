//! Command handlers and the argument groups they share.

pub mod attack;
pub mod measures;
pub mod random;
pub mod sweep;

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tolerance_graph::{BuildReport, MeasureSpec, ParamValue, StationGraph, TripGraphBuilder, read_trips};
use tolerance_sim::{AttackOptions, Centrality, RankingPolicy, ResultTable, RunParams, SimulationFile};
use tracing::info;

use crate::output::pretty_kv;

/// Input and run options shared by every simulation command.
#[derive(Args, Debug, Clone)]
pub struct SimulationArgs {
    /// Trip records, one JSON object per line.
    #[arg(long, value_name = "FILE")]
    pub trips: PathBuf,

    /// TOML simulation file. Flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of batches the removal is split into.
    #[arg(long)]
    pub steps: Option<usize>,

    /// Measure to record after each batch, as `NAME` or
    /// `NAME:KEY=VALUE,...`. Repeat for several columns.
    #[arg(long = "measure", value_name = "NAME[:PARAMS]", value_parser = parse_measure_arg)]
    pub measures: Vec<MeasureSpec>,

    /// Seed for random failure. Drawn at random and reported when unset.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Build an undirected station graph.
    #[arg(long)]
    pub undirected: bool,
}

/// Attack options shared by `attack` and `sweep --policy attack`.
#[derive(Args, Debug, Clone, Default)]
pub struct AttackArgs {
    /// Registered centrality used to rank targets, as `NAME` or
    /// `NAME:KEY=VALUE,...`.
    #[arg(long, value_name = "NAME[:PARAMS]", value_parser = parse_measure_arg)]
    pub centrality: Option<MeasureSpec>,

    /// Rank once (`static`) or before every removal (`dynamic`).
    #[arg(long, value_name = "POLICY")]
    pub ranking: Option<RankingPolicy>,
}

impl AttackArgs {
    /// Apply the flags on top of the file's `[attack]` table.
    pub fn resolve(&self, file: &SimulationFile) -> AttackOptions {
        let mut options = file.attack.clone();
        if let Some(spec) = &self.centrality {
            options.centrality = if spec.params.is_empty() {
                Centrality::named(&spec.name)
            } else {
                Centrality::Measure(spec.clone())
            };
        }
        if let Some(ranking) = self.ranking {
            options.ranking = ranking;
        }
        options
    }
}

/// A simulation file with command-line overrides applied.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub file: SimulationFile,
    pub params: RunParams,
    pub seed: Option<u64>,
    pub directed: bool,
}

impl SimulationArgs {
    /// Load `--config` (or defaults) and apply the flags on top.
    pub fn resolve(&self, fraction: Option<f64>) -> Result<Resolved> {
        let file = match &self.config {
            Some(path) => SimulationFile::load(path)?,
            None => SimulationFile::default(),
        };
        let mut params = file.run_params()?;
        if let Some(fraction) = fraction {
            params.fraction = fraction;
        }
        if let Some(steps) = self.steps {
            params.steps = steps;
        }
        if !self.measures.is_empty() {
            params.measures.clone_from(&self.measures);
        }
        Ok(Resolved {
            seed: self.seed.or(file.seed),
            directed: file.directed && !self.undirected,
            params,
            file,
        })
    }
}

/// Parse `name` or `name:key=value,key=value` into a measure request.
///
/// Values read as bool, then integer, then float, and fall back to text.
pub fn parse_measure_arg(raw: &str) -> Result<MeasureSpec, String> {
    let (name, rest) = raw.split_once(':').unwrap_or((raw, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing measure name in {raw:?}"));
    }
    let mut spec = MeasureSpec::new(name);
    for pair in rest.split(',').filter(|p| !p.trim().is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got {pair:?}"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty parameter key in {raw:?}"));
        }
        spec.params.insert(key, param_value(value.trim()));
    }
    Ok(spec)
}

fn param_value(text: &str) -> ParamValue {
    if let Ok(b) = text.parse::<bool>() {
        ParamValue::Bool(b)
    } else if let Ok(n) = text.parse::<i64>() {
        ParamValue::Int(n)
    } else if let Ok(x) = text.parse::<f64>() {
        ParamValue::Float(x)
    } else {
        ParamValue::Text(text.to_string())
    }
}

/// Read trip records from `path` and build the station graph.
pub fn load_graph(path: &Path, directed: bool) -> Result<(StationGraph, BuildReport)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let trips = read_trips(BufReader::new(file))
        .with_context(|| format!("Failed to read trips from {}", path.display()))?;
    let (graph, report) = TripGraphBuilder::new().directed(directed).build(trips);
    info!(
        path = %path.display(),
        stations = report.stations,
        routes = report.routes,
        "station graph ready"
    );
    Ok((graph, report))
}

/// The seed a random run uses: the configured one, or a fresh draw.
pub fn effective_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let drawn = rand::random();
        info!(seed = drawn, "no seed given, drew one");
        drawn
    })
}

/// JSON output for `tol random` and `tol attack`.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub policy: &'static str,
    pub trips: String,
    pub graph: BuildReport,
    pub fraction: f64,
    pub steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<&'a AttackOptions>,
    pub removed: &'a [String],
    pub fingerprint: String,
    pub table: &'a ResultTable,
}

impl RunOutput<'_> {
    pub fn render_csv(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.table.to_csv())
    }

    pub fn render_pretty(&self, w: &mut dyn Write, heading: &str) -> std::io::Result<()> {
        crate::output::pretty_section(w, heading)?;
        pretty_kv(w, "Trips", &self.trips)?;
        pretty_kv(
            w,
            "Graph",
            format!(
                "{} stations / {} routes ({} of {} trips dropped)",
                self.graph.stations,
                self.graph.routes,
                self.graph.trips_dropped,
                self.graph.trips_read
            ),
        )?;
        pretty_kv(
            w,
            "Removal",
            format!(
                "{} vertices ({:.2}%) in {} steps",
                self.removed.len(),
                self.fraction * 100.0,
                self.steps
            ),
        )?;
        if let Some(seed) = self.seed {
            pretty_kv(w, "Seed", seed.to_string())?;
        }
        if let Some(attack) = self.attack {
            pretty_kv(
                w,
                "Attack",
                format!("{} ({} ranking)", attack.centrality, attack.ranking),
            )?;
        }
        pretty_kv(w, "Fingerprint", &self.fingerprint)?;
        writeln!(w)?;
        write!(w, "{}", self.table)
    }
}
