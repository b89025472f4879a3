//! The result table: one row per applied batch.
//!
//! Columns are `f`, `f_count`, then one column per requested measure in
//! request order. Rows are appended by the simulator and never changed
//! afterwards.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tolerance_graph::MeasureValue;

/// Measurements taken after one batch removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Fraction of the starting vertices removed so far.
    pub f: f64,
    /// Vertices removed so far.
    pub f_count: usize,
    /// One value per measure column.
    pub values: Vec<MeasureValue>,
}

/// Time series of measure values as removal progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// An empty table with `f`, `f_count` and the given measure columns.
    #[must_use]
    pub fn new<I, S>(measure_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = vec!["f".to_string(), "f_count".to_string()];
        columns.extend(measure_columns.into_iter().map(Into::into));
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: ResultRow) {
        debug_assert_eq!(row.values.len() + 2, self.columns.len());
        self.rows.push(row);
    }

    /// Column names, `f` and `f_count` first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in application order.
    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the measure column `name`, top to bottom. `None` when the
    /// column is unknown or a row is too short to hold it.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&MeasureValue>> {
        let idx = self.columns.iter().skip(2).position(|c| c == name)?;
        self.rows.iter().map(|r| r.values.get(idx)).collect()
    }

    /// Render as CSV with a header line. Undefined values are written `NA`.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| csv_field(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in &self.rows {
            let _ = write!(out, "{},{}", row.f, row.f_count);
            for value in &row.values {
                out.push(',');
                out.push_str(&csv_field(&value.to_string()));
            }
            out.push('\n');
        }
        out
    }

    /// BLAKE3 digest of the columns and every row, `blake3:<hex>`.
    ///
    /// Two runs with equal fingerprints produced the same table.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for column in &self.columns {
            hasher.update(column.as_bytes());
            hasher.update(b"\x00");
        }
        for row in &self.rows {
            hasher.update(&row.f.to_bits().to_le_bytes());
            hasher.update(&row.f_count.to_le_bytes());
            for value in &row.values {
                hasher.update(value.to_string().as_bytes());
                hasher.update(b"\x00");
            }
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Aligned plain-text rendering.
impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut line = vec![format!("{:.4}", row.f), row.f_count.to_string()];
                line.extend(row.values.iter().map(ToString::to_string));
                line
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|line| line[i].len())
                    .fold(name.len(), usize::max)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(name, w)| format!("{name:>w$}"))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for line in cells {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:>w$}"))
                .collect();
            writeln!(f, "{}", padded.join("  "))?;
        }
        Ok(())
    }
}
