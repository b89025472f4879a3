//! `tol measures`: list what `--measure` and `--centrality` accept.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tolerance_graph::{MeasureRegistry, Signature, StationGraph};

use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct MeasuresOutput {
    measures: Vec<SignatureOutput>,
    centralities: Vec<SignatureOutput>,
}

#[derive(Debug, Serialize)]
struct SignatureOutput {
    name: String,
    params: Vec<String>,
    summary: String,
    #[serde(skip)]
    display: String,
}

impl From<&Signature> for SignatureOutput {
    fn from(signature: &Signature) -> Self {
        Self {
            name: signature.name().to_string(),
            params: signature.accepted().to_vec(),
            summary: signature.description().to_string(),
            display: signature.to_string(),
        }
    }
}

fn collect(registry: &MeasureRegistry<StationGraph>) -> MeasuresOutput {
    MeasuresOutput {
        measures: registry.measures().map(Into::into).collect(),
        centralities: registry.centralities().map(Into::into).collect(),
    }
}

/// Execute `tol measures`.
pub fn run_measures(output: OutputMode) -> Result<()> {
    let registry = MeasureRegistry::with_builtins();
    render_mode(output, &collect(&registry), render_csv, render_pretty)
}

fn render_csv(out: &MeasuresOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "kind,name,params,summary")?;
    let rows = out
        .measures
        .iter()
        .map(|s| ("measure", s))
        .chain(out.centralities.iter().map(|s| ("centrality", s)));
    for (kind, signature) in rows {
        writeln!(
            w,
            "{kind},{},{},\"{}\"",
            signature.name,
            signature.params.join(";"),
            signature.summary.replace('"', "\"\"")
        )?;
    }
    Ok(())
}

fn render_pretty(out: &MeasuresOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let width = out
        .measures
        .iter()
        .chain(&out.centralities)
        .map(|s| s.display.len())
        .max()
        .unwrap_or(0);

    pretty_section(w, "Graph measures")?;
    for signature in &out.measures {
        writeln!(w, "{:<width$}  {}", signature.display, signature.summary)?;
    }
    writeln!(w)?;
    pretty_section(w, "Centralities")?;
    for signature in &out.centralities {
        writeln!(w, "{:<width$}  {}", signature.display, signature.summary)?;
    }
    Ok(())
}
