//! Merged-span resolution
//!
//! Walks candidate cells in row-major order, expanding each across empty
//! neighbors subject to the ruling and content constraints, then fills every
//! unclaimed grid position with a unit empty cell. The emitted cells
//! partition the grid exactly.

use std::collections::BTreeMap;

use crate::resolve::grid::{BitGrid, CandidateCell, GridStructure};
use crate::types::Cell;

/// Resolve candidates into final cells with `rowspan`/`colspan`.
pub fn apply_merges(grid: &GridStructure, candidates: &[CandidateCell]) -> Vec<Cell> {
    let candidate_map: BTreeMap<(usize, usize), &CandidateCell> = candidates
        .iter()
        .map(|cell| ((cell.row, cell.col), cell))
        .collect();
    let has_vlines = grid.has_vertical_rulings();
    let has_hlines = grid.has_horizontal_rulings();

    let n_rows = grid.n_rows();
    let n_cols = grid.n_cols();
    let mut consumed = BitGrid::new(n_rows, n_cols);
    let mut resolved: Vec<Cell> = Vec::new();

    // First pass: candidates claim their spans in row-major order
    for (&(row, col), &candidate) in &candidate_map {
        if consumed.get(row, col) {
            // Swallowed by an earlier expansion
            continue;
        }
        let (col_start, col_end) =
            expand_columns(grid, &candidate_map, &consumed, candidate, has_vlines);
        let (row_start, row_end) = expand_rows(
            grid,
            &candidate_map,
            &consumed,
            candidate,
            col_start,
            col_end,
            has_hlines,
        );

        let span_rect = grid
            .cell_bbox(row_start, col_start)
            .union(&grid.cell_bbox(row_end, col_end));
        let bbox = span_rect.union(&candidate.bbox);

        for r in row_start..=row_end {
            for c in col_start..=col_end {
                consumed.set(r, c, true);
            }
        }
        resolved.push(Cell {
            text: candidate.text.clone(),
            bbox,
            row: row_start,
            col: col_start,
            rowspan: row_end - row_start + 1,
            colspan: col_end - col_start + 1,
            confidence: 1.0,
        });
    }

    // Second pass: unclaimed positions become unit empty cells
    for row in 0..n_rows {
        for col in 0..n_cols {
            if !consumed.get(row, col) {
                resolved.push(Cell {
                    text: String::new(),
                    bbox: grid.cell_bbox(row, col),
                    row,
                    col,
                    rowspan: 1,
                    colspan: 1,
                    confidence: 1.0,
                });
            }
        }
    }

    resolved.sort_by_key(|c| (c.row, c.col));
    resolved
}

/// Whether any position in the range carries candidate content, the
/// expanding candidate's own position excepted. Consumed positions block
/// expansion outright: they already belong to another cell.
fn span_blocked(
    candidate_map: &BTreeMap<(usize, usize), &CandidateCell>,
    consumed: &BitGrid,
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
    exclude: (usize, usize),
) -> bool {
    for r in rows {
        for c in cols.clone() {
            if (r, c) == exclude {
                continue;
            }
            if consumed.get(r, c) {
                return true;
            }
            if let Some(other) = candidate_map.get(&(r, c)) {
                if !other.text.trim().is_empty() {
                    return true;
                }
            }
        }
    }
    false
}

fn expand_columns(
    grid: &GridStructure,
    candidate_map: &BTreeMap<(usize, usize), &CandidateCell>,
    consumed: &BitGrid,
    candidate: &CandidateCell,
    has_vlines: bool,
) -> (usize, usize) {
    let mut col_start = candidate.col;
    let mut col_end = candidate.col;

    while col_start > 0 {
        let boundary_present = grid.vertical_boundary(candidate.row, col_start - 1);
        let reaches = candidate.bbox.x0 <= grid.col_edges[col_start] + grid.epsilon;
        if boundary_present && !reaches {
            break;
        }
        if !has_vlines && !reaches {
            break;
        }
        if span_blocked(
            candidate_map,
            consumed,
            candidate.row..=candidate.row,
            (col_start - 1)..=(col_start - 1),
            (candidate.row, candidate.col),
        ) {
            break;
        }
        col_start -= 1;
    }

    while col_end + 1 < grid.n_cols() {
        let boundary_present = grid.vertical_boundary(candidate.row, col_end);
        let reaches = candidate.bbox.x1 >= grid.col_edges[col_end + 1] - grid.epsilon;
        if boundary_present && !reaches {
            break;
        }
        if !has_vlines && !reaches {
            break;
        }
        if span_blocked(
            candidate_map,
            consumed,
            candidate.row..=candidate.row,
            (col_end + 1)..=(col_end + 1),
            (candidate.row, candidate.col),
        ) {
            break;
        }
        col_end += 1;
    }

    (col_start, col_end)
}

fn expand_rows(
    grid: &GridStructure,
    candidate_map: &BTreeMap<(usize, usize), &CandidateCell>,
    consumed: &BitGrid,
    candidate: &CandidateCell,
    col_start: usize,
    col_end: usize,
    has_hlines: bool,
) -> (usize, usize) {
    let mut row_start = candidate.row;
    let mut row_end = candidate.row;

    while row_start > 0 {
        let boundary_present =
            (col_start..=col_end).any(|c| grid.horizontal_boundary(row_start - 1, c));
        let reaches = candidate.bbox.y0 <= grid.row_edges[row_start] + grid.epsilon;
        if boundary_present && !reaches {
            break;
        }
        if !has_hlines && !reaches {
            break;
        }
        if span_blocked(
            candidate_map,
            consumed,
            (row_start - 1)..=(row_start - 1),
            col_start..=col_end,
            (candidate.row, candidate.col),
        ) {
            break;
        }
        row_start -= 1;
    }

    while row_end + 1 < grid.n_rows() {
        let boundary_present = (col_start..=col_end).any(|c| grid.horizontal_boundary(row_end, c));
        let reaches = candidate.bbox.y1 >= grid.row_edges[row_end + 1] - grid.epsilon;
        if boundary_present && !reaches {
            break;
        }
        if !has_hlines && !reaches {
            break;
        }
        if span_blocked(
            candidate_map,
            consumed,
            (row_end + 1)..=(row_end + 1),
            col_start..=col_end,
            (candidate.row, candidate.col),
        ) {
            break;
        }
        row_end += 1;
    }

    (row_start, row_end)
}
