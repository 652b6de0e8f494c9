//! Core types: decoded tables, per-dataset results and the run summary

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Storage class of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Floating point values (SAS numeric)
    Numeric,
    /// Free text (SAS character)
    Text,
}

/// Column metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Variable name (e.g., "SEQN")
    pub name: String,
    /// Variable label, empty when the source has none
    #[serde(default)]
    pub label: String,
    /// Storage class
    pub kind: ColumnKind,
    /// SAS display format name (e.g., "DATE"), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Column {
    /// Create a column without label or format
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            kind,
            format: None,
        }
    }
}

/// A single cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value
    Number(f64),
    /// Character value, trailing blanks removed
    Text(String),
    /// SAS missing value (any of `.`, `._`, `.A`-`.Z`) or empty CSV field
    Missing,
}

impl Value {
    /// Whether the cell holds no value
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// The numeric value, if any
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text value, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders the cell the way it is written to CSV: missing is empty, numbers
/// use the shortest round-trip form with a trailing `.0` on whole values.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

/// An in-memory table: ordered columns and rows of cells
///
/// Every row has exactly `columns.len()` cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Dataset name from the transport file (e.g., "DEMO_J"), empty when loaded from CSV
    #[serde(default)]
    pub name: String,
    /// Dataset label from the transport file
    #[serde(default)]
    pub label: String,
    /// Columns in file order
    pub columns: Vec<Column>,
    /// Rows in file order
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Index of the column called `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Iterate over one column's cells
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

/// Where a dataset's table came from in this run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Decoded from the transport file and written to CSV in this run
    Converted,
    /// Loaded from a CSV produced by an earlier run
    Cached,
}

/// A dataset that produced a usable table
#[derive(Clone, Debug)]
pub struct LoadedDataset {
    /// The table
    pub table: Table,
    /// How the table was obtained
    pub origin: Origin,
}

/// Results of one cycle: dataset name to table, in configuration order
///
/// Datasets that failed are absent; their errors were logged.
#[derive(Clone, Debug, Default)]
pub struct CycleResult {
    /// Cycle identifier (e.g., "2017-2018")
    pub cycle: String,
    /// Directory holding the cycle's artifacts
    pub dir: PathBuf,
    /// Loaded datasets by name
    pub datasets: IndexMap<String, LoadedDataset>,
}

impl CycleResult {
    /// Table of dataset `name`, if it loaded
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.datasets.get(name).map(|d| &d.table)
    }

    /// Number of loaded datasets
    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Whether no dataset loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Shape summary of this cycle
    #[must_use]
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            cycle: self.cycle.clone(),
            datasets: self
                .datasets
                .iter()
                .map(|(name, d)| DatasetSummary {
                    name: name.clone(),
                    rows: d.table.row_count(),
                    columns: d.table.column_count(),
                    origin: d.origin,
                })
                .collect(),
        }
    }
}

/// Shape of one loaded dataset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset name
    pub name: String,
    /// Row count
    pub rows: usize,
    /// Column count
    pub columns: usize,
    /// Whether it was converted or loaded from cache
    pub origin: Origin,
}

/// Loaded datasets of one cycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Cycle identifier
    pub cycle: String,
    /// Loaded datasets, in configuration order
    pub datasets: Vec<DatasetSummary>,
}

/// Outcome of a full run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Artifact cache root
    pub data_dir: PathBuf,
    /// Per-cycle summaries, in configuration order
    pub cycles: Vec<CycleSummary>,
}

impl RunSummary {
    /// Total loaded datasets across all cycles
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.cycles.iter().map(|c| c.datasets.len()).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Download Summary:")?;
        for cycle in &self.cycles {
            writeln!(
                f,
                "  {}: {} datasets successfully loaded",
                cycle.cycle,
                cycle.datasets.len()
            )?;
            for d in &cycle.datasets {
                writeln!(f, "    - {}: {} rows, {} columns", d.name, d.rows, d.columns)?;
            }
        }
        write!(f, "Data saved to: {}", self.data_dir.display())
    }
}
