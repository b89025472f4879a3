//! Shared output layer for pretty/CSV/JSON parity across all commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format`
//! 2. `TOLERANCE_FORMAT` env var → `"pretty"` | `"csv"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Csv`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections and an aligned table).
    Pretty,
    /// The result table as CSV, nothing else.
    Csv,
    /// Machine-readable JSON with run metadata.
    Json,
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "csv" => return OutputMode::Csv,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value, fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Csv
    }
}

/// Resolve the output mode from the CLI flag, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>) -> OutputMode {
    let env_val = std::env::var("TOLERANCE_FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with explicit CSV and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    csv_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, mode, value, csv_fn, pretty_fn)
}

fn render_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    csv_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Csv => csv_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        rows: usize,
    }

    fn render_sample(mode: OutputMode) -> String {
        let mut buf = Vec::new();
        let sample = Sample {
            name: "random",
            rows: 3,
        };
        render_to(
            &mut buf,
            mode,
            &sample,
            |s, w| writeln!(w, "name,rows\n{},{}", s.name, s.rows),
            |s, w| pretty_kv(w, "Name", s.name),
        )
        .expect("render succeeds");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn flag_wins_over_env_and_tty() {
        assert_eq!(
            resolve_output_mode_inner(Some(OutputMode::Json), Some("csv"), true),
            OutputMode::Json
        );
    }

    #[test]
    fn env_wins_over_tty() {
        assert_eq!(resolve_output_mode_inner(None, Some("CSV"), true), OutputMode::Csv);
        assert_eq!(resolve_output_mode_inner(None, Some("json"), false), OutputMode::Json);
    }

    #[test]
    fn unknown_env_falls_back_to_tty_detection() {
        assert_eq!(resolve_output_mode_inner(None, Some("xml"), true), OutputMode::Pretty);
        assert_eq!(resolve_output_mode_inner(None, None, false), OutputMode::Csv);
    }

    #[test]
    fn json_mode_serializes_value() {
        let json: serde_json::Value =
            serde_json::from_str(&render_sample(OutputMode::Json)).expect("valid JSON");
        assert_eq!(json["name"], "random");
        assert_eq!(json["rows"], 3);
    }

    #[test]
    fn csv_and_pretty_use_their_renderers() {
        assert_eq!(render_sample(OutputMode::Csv), "name,rows\nrandom,3\n");
        assert_eq!(render_sample(OutputMode::Pretty), "Name:        random\n");
    }

    #[test]
    fn pretty_section_underlines_heading() {
        let mut buf = Vec::new();
        pretty_section(&mut buf, "Random failure").expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Random failure"));
        assert_eq!(lines.next().map(str::len), Some(PRETTY_RULE_WIDTH));
    }
}
