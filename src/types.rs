//! Core value types for Tablex
//!
//! The output data model (`Cell`, `Table`, `DocResult`) and the
//! configuration enums parsed from strings at the API boundary. The
//! extraction core operates on the tagged variants exclusively; string
//! handling stops here.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detect::Detector;
use crate::error::{Result, TablexError};
use crate::geometry::BBox;

/// Default sentinel written at non-anchor positions of merged spans.
pub const DEFAULT_SENTINEL: &str = "<MERGED>";

/// How matrix projection fills the non-anchor positions covered by a
/// merged cell. The top-left (anchor) position always carries the cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixFill {
    /// Repeat the cell text across every covered position
    Repeat,
    /// Leave non-anchor positions blank
    Empty,
    /// Write a sentinel string at non-anchor positions
    Sentinel(String),
    /// Write an arbitrary value at non-anchor positions
    Value(String),
}

impl FromStr for MatrixFill {
    type Err = TablexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "repeat" => Ok(Self::Repeat),
            "empty" => Ok(Self::Empty),
            "sentinel" => Ok(Self::Sentinel(DEFAULT_SENTINEL.to_string())),
            other => Err(TablexError::InvalidOptions(format!(
                "Unknown fill policy: {other}"
            ))),
        }
    }
}

/// How eagerly the stitcher joins same-shaped tables across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StitchAggressiveness {
    /// Join only near-identical widths
    Low,
    /// Balanced default
    #[default]
    Med,
    /// Permit larger width drift
    High,
}

impl StitchAggressiveness {
    /// Relative table-width tolerance used by `should_join`.
    pub fn tolerance(&self) -> f64 {
        match self {
            Self::Low => 0.01,
            Self::Med => 0.015,
            Self::High => 0.025,
        }
    }
}

impl FromStr for StitchAggressiveness {
    type Err = TablexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "med" => Ok(Self::Med),
            "high" => Ok(Self::High),
            other => Err(TablexError::InvalidOptions(format!(
                "Unknown stitch aggressiveness: {other}"
            ))),
        }
    }
}

/// Which detector drives region proposal.
#[derive(Clone, Default)]
pub enum DetectorRef {
    /// The built-in `plumber` detector
    #[default]
    Default,
    /// A registered detector, looked up by name
    Named(String),
    /// A caller-supplied instance
    Instance(Arc<dyn Detector>),
}

impl std::fmt::Debug for DetectorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("DetectorRef::Default"),
            Self::Named(name) => write!(f, "DetectorRef::Named({name:?})"),
            Self::Instance(d) => write!(f, "DetectorRef::Instance({:?})", d.name()),
        }
    }
}

/// Options for a single extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// 1-based page numbers to process; `None` means all pages
    pub pages: Option<BTreeSet<usize>>,
    /// Detector choice
    pub detector: DetectorRef,
    /// Stitching aggressiveness
    pub stitch: StitchAggressiveness,
}

static PAGE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").unwrap());

/// Parse a comma-separated page list with ranges, e.g. `1,3-5,12`.
///
/// Pages are 1-based; malformed parts, zero pages, and reversed ranges are
/// configuration errors.
pub fn parse_page_ranges(expr: &str) -> Result<BTreeSet<usize>> {
    let mut pages = BTreeSet::new();
    for part in expr.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let caps = PAGE_RANGE.captures(part).ok_or_else(|| {
            TablexError::InvalidOptions(format!("Malformed page range: {part:?}"))
        })?;
        let start: usize = caps[1].parse().map_err(|_| {
            TablexError::InvalidOptions(format!("Malformed page range: {part:?}"))
        })?;
        let end: usize = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| {
                TablexError::InvalidOptions(format!("Malformed page range: {part:?}"))
            })?,
            None => start,
        };
        if start == 0 || end < start {
            return Err(TablexError::InvalidOptions(format!(
                "Malformed page range: {part:?}"
            )));
        }
        pages.extend(start..=end);
    }
    if pages.is_empty() {
        return Err(TablexError::InvalidOptions(format!(
            "Empty page selection: {expr:?}"
        )));
    }
    Ok(pages)
}

/// A single table cell. Immutable after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Concatenated text of the words in the cell
    pub text: String,
    /// Hull of the cell: grid span rectangle unioned with the word hull
    pub bbox: BBox,
    /// Anchor row (top-left of the span)
    pub row: usize,
    /// Anchor column (top-left of the span)
    pub col: usize,
    /// Number of rows covered, `>= 1`
    pub rowspan: usize,
    /// Number of columns covered, `>= 1`
    pub colspan: usize,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
}

impl Cell {
    /// Whether the cell covers the grid position `(row, col)`.
    pub fn covers(&self, row: usize, col: usize) -> bool {
        row >= self.row
            && row < self.row + self.rowspan
            && col >= self.col
            && col < self.col + self.colspan
    }
}

fn default_units() -> String {
    "pt".to_string()
}

/// Structured table representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Sorted 1-based page numbers the table spans
    pub pages: Vec<usize>,
    /// Cells in canonical `(row, col)` order
    pub cells: Vec<Cell>,
    /// Number of grid rows
    pub n_rows: usize,
    /// Number of grid columns
    pub n_cols: usize,
    /// Optional title
    #[serde(default)]
    pub title: Option<String>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Extraction metadata (detector version, epsilon, ...)
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
    /// Coordinate units
    #[serde(default = "default_units")]
    pub units: String,
    /// Page size `(width, height)` in points
    #[serde(default)]
    pub page_size: Option<(f64, f64)>,
}

impl Table {
    /// Restore canonical `(row, col)` cell order.
    pub fn sort_cells(&mut self) {
        self.cells.sort_by_key(|c| (c.row, c.col));
    }

    /// Project the table onto a dense `n_rows x n_cols` matrix of strings.
    ///
    /// Every position covered by a cell is written according to `fill`; the
    /// top-left anchor of each cell always carries the cell text.
    pub fn as_matrix(&self, fill: &MatrixFill) -> Vec<Vec<String>> {
        let mut matrix = vec![vec![String::new(); self.n_cols]; self.n_rows];
        for cell in &self.cells {
            for r in cell.row..cell.row + cell.rowspan {
                for c in cell.col..cell.col + cell.colspan {
                    if (r, c) == (cell.row, cell.col) {
                        matrix[r][c] = cell.text.clone();
                    } else {
                        matrix[r][c] = match fill {
                            MatrixFill::Repeat => cell.text.clone(),
                            MatrixFill::Empty => String::new(),
                            MatrixFill::Sentinel(s) | MatrixFill::Value(s) => s.clone(),
                        };
                    }
                }
            }
        }
        matrix
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Extraction statistics for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Name of the detector that proposed regions
    pub detector: String,
    /// Number of regions proposed
    pub regions: usize,
    /// Number of tables after stitching
    pub tables: usize,
}

/// Extraction result for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResult {
    /// Extracted tables, ordered by first page
    pub tables: Vec<Table>,
    /// Run statistics
    pub stats: ExtractStats,
    /// Soft anomalies recorded while processing
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl DocResult {
    /// Matrix projection of every table.
    pub fn as_matrices(&self, fill: &MatrixFill) -> Vec<Vec<Vec<String>>> {
        self.tables.iter().map(|t| t.as_matrix(fill)).collect()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
