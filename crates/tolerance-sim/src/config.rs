//! TOML simulation files.
//!
//! ```toml
//! fraction = 0.05
//! steps = 5
//! seed = 42
//! directed = true
//! measures = ["diameter", { name = "max_degree", params = { mode = "all" } }]
//!
//! [attack]
//! centrality = "degree"
//! ranking = "dynamic"
//! ```
//!
//! Every key is optional. `measures` must be an array; a single string is
//! rejected rather than read as a list of characters.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tolerance_graph::MeasureSpec;

use crate::attack::AttackOptions;
use crate::error::SimError;
use crate::simulator::{DEFAULT_FRACTION, DEFAULT_MEASURE, RunParams};

/// Parsed simulation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationFile {
    #[serde(default = "default_fraction")]
    pub fraction: f64,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub directed: bool,
    #[serde(default)]
    pub measures: Option<MeasureList>,
    #[serde(default)]
    pub attack: AttackOptions,
}

impl Default for SimulationFile {
    fn default() -> Self {
        Self {
            fraction: default_fraction(),
            steps: default_steps(),
            seed: None,
            directed: default_true(),
            measures: None,
            attack: AttackOptions::default(),
        }
    }
}

/// The `measures` key as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureList {
    /// An array of names or measure requests.
    Many(Vec<MeasureEntry>),
    /// A bare string. Always rejected.
    Single(String),
}

/// One element of the `measures` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureEntry {
    Name(String),
    Spec(MeasureSpec),
}

impl From<MeasureEntry> for MeasureSpec {
    fn from(entry: MeasureEntry) -> Self {
        match entry {
            MeasureEntry::Name(name) => Self::new(name),
            MeasureEntry::Spec(spec) => spec,
        }
    }
}

impl MeasureList {
    /// Measure requests in column order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] for a bare string or an empty
    /// array.
    pub fn into_specs(self) -> Result<Vec<MeasureSpec>, SimError> {
        match self {
            Self::Single(name) => Err(SimError::invalid(format!(
                "measures must be a list of measure names, got the single string {name:?}"
            ))),
            Self::Many(entries) if entries.is_empty() => {
                Err(SimError::invalid("measures must not be empty"))
            }
            Self::Many(entries) => Ok(entries.into_iter().map(Into::into).collect()),
        }
    }
}

impl SimulationFile {
    /// Parse a simulation file from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this layout.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse simulation file")
    }

    /// Read and parse a simulation file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Run parameters described by the file. Without a `measures` key the
    /// run records the diameter.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgument`] if `measures` is a bare string
    /// or empty.
    pub fn run_params(&self) -> Result<RunParams, SimError> {
        let measures = match self.measures.clone() {
            Some(list) => list.into_specs()?,
            None => vec![MeasureSpec::new(DEFAULT_MEASURE)],
        };
        Ok(RunParams {
            fraction: self.fraction,
            steps: self.steps,
            measures,
        })
    }
}

const fn default_fraction() -> f64 {
    DEFAULT_FRACTION
}

const fn default_steps() -> usize {
    1
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::attack::{Centrality, RankingPolicy};

    #[test]
    fn empty_file_uses_defaults() {
        let file = SimulationFile::from_toml_str("").expect("empty is valid");
        assert_eq!(file, SimulationFile::default());
        let params = file.run_params().expect("defaults are valid");
        assert!((params.fraction - 0.05).abs() < f64::EPSILON);
        assert_eq!(params.steps, 1);
        assert_eq!(params.measures, vec![MeasureSpec::new("diameter")]);
        assert_eq!(file.attack.ranking, RankingPolicy::Dynamic);
    }

    #[test]
    fn full_file() {
        let file = SimulationFile::from_toml_str(
            r#"
fraction = 0.5
steps = 5
seed = 42
directed = false
measures = ["diameter", { name = "max_degree", params = { mode = "in" }, label = "max_in" }]

[attack]
centrality = { name = "betweenness", params = { directed = false } }
ranking = "static"
"#,
        )
        .expect("valid file");

        assert_eq!(file.seed, Some(42));
        assert!(!file.directed);
        let params = file.run_params().expect("valid measures");
        assert_eq!(params.measures.len(), 2);
        assert_eq!(params.measures[1].column(), "max_in");
        assert_eq!(file.attack.ranking, RankingPolicy::Static);
        assert!(matches!(file.attack.centrality, Centrality::Measure(ref s) if s.name == "betweenness"));
    }

    #[test]
    fn single_string_measures_rejected() {
        let file = SimulationFile::from_toml_str(r#"measures = "diameter""#).expect("parses");
        let err = file.run_params().expect_err("a string is not a list");
        assert!(matches!(err, SimError::InvalidArgument(_)));
    }

    #[test]
    fn empty_measures_rejected() {
        let file = SimulationFile::from_toml_str("measures = []").expect("parses");
        assert!(matches!(file.run_params(), Err(SimError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(SimulationFile::from_toml_str("fracton = 0.1").is_err());
    }

    #[test]
    fn load_from_disk_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "steps = [").expect("write");
        let err = SimulationFile::load(file.path()).expect_err("broken TOML");
        assert!(err.to_string().contains("Failed to parse"));

        let missing = file.path().with_extension("missing");
        let err = SimulationFile::load(&missing).expect_err("no such file");
        assert!(err.to_string().contains("Failed to read"));
    }
}
