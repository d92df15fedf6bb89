//! Grid inference: words and rulings to a boundary lattice
//!
//! Word centers are snapped into row/column tracks, track centers become
//! edges, and every interior edge segment is checked against the rulings for
//! coverage. Words are then bucketed into `(row, col)` candidate cells.

use std::collections::BTreeMap;

use crate::geometry::{BBox, centers_to_edges, snap_values};
use crate::reader::Word;

/// Flat bit-packed boolean grid with row-major indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

impl BitGrid {
    /// All-false grid of the given shape. A zero dimension is allowed and
    /// yields an empty grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        let words = (rows * cols).div_ceil(64);
        Self {
            rows,
            cols,
            bits: vec![0; words],
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Read the bit at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        let i = self.index(row, col);
        self.bits[i / 64] >> (i % 64) & 1 == 1
    }

    /// Set the bit at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        let i = self.index(row, col);
        if value {
            self.bits[i / 64] |= 1 << (i % 64);
        } else {
            self.bits[i / 64] &= !(1 << (i % 64));
        }
    }

    /// Whether any bit is set.
    pub fn any(&self) -> bool {
        self.bits.iter().any(|w| *w != 0)
    }
}

/// Pre-merge cell candidate: at most one per `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCell {
    /// Grid row
    pub row: usize,
    /// Grid column
    pub col: usize,
    /// Concatenated word text, ascending x order
    pub text: String,
    /// Hull of the source word boxes
    pub bbox: BBox,
}

/// Inferred grid: track edges plus ruling coverage of the interior
/// boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStructure {
    /// Row edges, strictly increasing, length >= 2
    pub row_edges: Vec<f64>,
    /// Column edges, strictly increasing, length >= 2
    pub col_edges: Vec<f64>,
    /// `n_rows x (n_cols - 1)`: vertical ruling coverage per interior column
    /// edge, per row
    vertical: BitGrid,
    /// `(n_rows - 1) x n_cols`: horizontal ruling coverage per interior row
    /// edge, per column
    horizontal: BitGrid,
    /// Snapping tolerance the grid was built with; all later comparisons
    /// against this grid use the same value
    pub epsilon: f64,
}

impl GridStructure {
    fn new(
        row_edges: Vec<f64>,
        col_edges: Vec<f64>,
        vertical: BitGrid,
        horizontal: BitGrid,
        epsilon: f64,
    ) -> Self {
        assert!(row_edges.len() >= 2 && col_edges.len() >= 2);
        let n_rows = row_edges.len() - 1;
        let n_cols = col_edges.len() - 1;
        assert!(vertical.rows == n_rows && vertical.cols == n_cols - 1);
        assert!(horizontal.rows == n_rows - 1 && horizontal.cols == n_cols);
        Self {
            row_edges,
            col_edges,
            vertical,
            horizontal,
            epsilon,
        }
    }

    /// Number of row tracks.
    pub fn n_rows(&self) -> usize {
        self.row_edges.len() - 1
    }

    /// Number of column tracks.
    pub fn n_cols(&self) -> usize {
        self.col_edges.len() - 1
    }

    /// Grid rectangle of the track cell `(row, col)`.
    pub fn cell_bbox(&self, row: usize, col: usize) -> BBox {
        BBox::new(
            self.col_edges[col],
            self.row_edges[row],
            self.col_edges[col + 1],
            self.row_edges[row + 1],
        )
    }

    /// Whether a vertical ruling covers interior column edge `i + 1` across
    /// the y-extent of `row`.
    pub fn vertical_boundary(&self, row: usize, i: usize) -> bool {
        self.vertical.get(row, i)
    }

    /// Whether a horizontal ruling covers interior row edge `j + 1` across
    /// the x-extent of `col`.
    pub fn horizontal_boundary(&self, j: usize, col: usize) -> bool {
        self.horizontal.get(j, col)
    }

    /// Whether the grid has any covered vertical boundary.
    pub fn has_vertical_rulings(&self) -> bool {
        self.vertical.any()
    }

    /// Whether the grid has any covered horizontal boundary.
    pub fn has_horizontal_rulings(&self) -> bool {
        self.horizontal.any()
    }
}

/// Infer a grid and its candidate cells from region words and rulings.
pub fn build_grid(
    words: &[Word],
    region: BBox,
    rulings: &[BBox],
    epsilon: f64,
) -> (GridStructure, Vec<CandidateCell>) {
    let centers_y: Vec<f64> = words.iter().map(|w| w.bbox.center().1).collect();
    let centers_x: Vec<f64> = words.iter().map(|w| w.bbox.center().0).collect();
    let row_centers = snap_values(&centers_y, epsilon);
    let col_centers = snap_values(&centers_x, epsilon);

    let row_edges = centers_to_edges(&row_centers, region.y0, region.y1);
    let col_edges = centers_to_edges(&col_centers, region.x0, region.x1);
    let n_rows = row_edges.len() - 1;
    let n_cols = col_edges.len() - 1;

    // Ties resolve to vertical
    let (vertical_rulings, horizontal_rulings): (Vec<&BBox>, Vec<&BBox>) =
        rulings.iter().partition(|r| r.width() <= r.height());

    let mut vertical = BitGrid::new(n_rows, n_cols - 1);
    for (i, &edge_x) in col_edges.iter().enumerate().take(n_cols).skip(1) {
        for row in 0..n_rows {
            let covered = vertical_rulings.iter().any(|line| {
                covers_span(
                    line.x0,
                    line.x1,
                    edge_x,
                    line.y0,
                    line.y1,
                    row_edges[row],
                    row_edges[row + 1],
                    epsilon,
                )
            });
            vertical.set(row, i - 1, covered);
        }
    }

    let mut horizontal = BitGrid::new(n_rows - 1, n_cols);
    for (j, &edge_y) in row_edges.iter().enumerate().take(n_rows).skip(1) {
        for col in 0..n_cols {
            let covered = horizontal_rulings.iter().any(|line| {
                covers_span(
                    line.y0,
                    line.y1,
                    edge_y,
                    line.x0,
                    line.x1,
                    col_edges[col],
                    col_edges[col + 1],
                    epsilon,
                )
            });
            horizontal.set(j - 1, col, covered);
        }
    }

    let grid = GridStructure::new(row_edges, col_edges, vertical, horizontal, epsilon);

    // Stage candidates in a sparse ordered map, drain once
    struct Bucket {
        texts: Vec<(f64, String)>,
        bbox: BBox,
    }
    let mut buckets: BTreeMap<(usize, usize), Bucket> = BTreeMap::new();
    for word in words {
        let (cx, cy) = word.bbox.center();
        let row = locate_edge(&grid.row_edges, cy, grid.epsilon);
        let col = locate_edge(&grid.col_edges, cx, grid.epsilon);
        buckets
            .entry((row, col))
            .and_modify(|bucket| {
                bucket.texts.push((cx, word.text.clone()));
                bucket.bbox = bucket.bbox.union(&word.bbox);
            })
            .or_insert_with(|| Bucket {
                texts: vec![(cx, word.text.clone())],
                bbox: word.bbox,
            });
    }

    let candidates = buckets
        .into_iter()
        .map(|((row, col), mut bucket)| {
            bucket.texts.sort_by(|a, b| a.0.total_cmp(&b.0));
            let text = bucket
                .texts
                .iter()
                .map(|(_, t)| t.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            CandidateCell {
                row,
                col,
                text,
                bbox: bucket.bbox,
            }
        })
        .collect();

    (grid, candidates)
}

/// Whether a ruling sitting at `[at0, at1]` on the perpendicular axis covers
/// `edge` there, and spans all of `[span_lo, span_hi]` along its own axis,
/// both within `epsilon`.
#[allow(clippy::too_many_arguments)]
fn covers_span(
    at0: f64,
    at1: f64,
    edge: f64,
    along0: f64,
    along1: f64,
    span_lo: f64,
    span_hi: f64,
    epsilon: f64,
) -> bool {
    if !(at0.min(at1) - epsilon <= edge && edge <= at0.max(at1) + epsilon) {
        return false;
    }
    along0.min(along1) - epsilon <= span_lo && along0.max(along1) + epsilon >= span_hi
}

/// Index of the edge interval containing `value`, clamped into
/// `[edges[0] - epsilon, edges[last] + epsilon]`. A value equally close to
/// two adjacent edges picks the lower index.
pub fn locate_edge(edges: &[f64], value: f64, epsilon: f64) -> usize {
    debug_assert!(edges.len() >= 2);
    let clamped = value.clamp(edges[0] - epsilon, edges[edges.len() - 1] + epsilon);
    for i in 0..edges.len() - 1 {
        if edges[i] - epsilon <= clamped && clamped <= edges[i + 1] + epsilon {
            return i;
        }
    }
    // The clamp range is covered by the first and last intervals
    unreachable!("clamped value fell outside every edge interval");
}
