//! Cross-page table stitching
//!
//! Joins continuation tables: same column count, near-equal width, and a
//! matching first-row signature. A repeated header row is dropped from the
//! joined-on table.

use crate::types::{Cell, StitchAggressiveness, Table};

/// Stitch continuation tables across pages.
///
/// Tables are ordered by `(min(pages), pages)` and folded left: a table
/// joining the accumulator's last table replaces it with their merge.
pub fn stitch_tables(tables: Vec<Table>, aggressiveness: StitchAggressiveness) -> Vec<Table> {
    if tables.is_empty() {
        return Vec::new();
    }
    let tolerance = aggressiveness.tolerance();

    let mut ordered = tables;
    ordered.sort_by(|a, b| {
        let first_a = a.pages.first().copied().unwrap_or(0);
        let first_b = b.pages.first().copied().unwrap_or(0);
        first_a.cmp(&first_b).then_with(|| a.pages.cmp(&b.pages))
    });

    let mut stitched: Vec<Table> = Vec::new();
    for mut table in ordered {
        table.sort_cells();
        match stitched.last() {
            Some(prev) if should_join(prev, &table, tolerance) => {
                tracing::debug!(
                    pages = ?table.pages,
                    onto = ?prev.pages,
                    "stitching continuation table"
                );
                let prev = stitched.pop().unwrap();
                stitched.push(merge_tables(prev, table));
            }
            _ => stitched.push(table),
        }
    }
    stitched
}

fn should_join(first: &Table, second: &Table, tolerance: f64) -> bool {
    if first.n_cols != second.n_cols {
        return false;
    }
    let width_a = table_width(first);
    let width_b = table_width(second);
    if width_a <= 0.0 || width_b <= 0.0 {
        return false;
    }
    let width_diff = (width_a - width_b).abs() / width_a.max(width_b);
    if width_diff > tolerance {
        return false;
    }
    row_signature(first, 0) == row_signature(second, 0)
}

fn table_width(table: &Table) -> f64 {
    if table.cells.is_empty() {
        return 0.0;
    }
    let x0 = table.cells.iter().map(|c| c.bbox.x0).fold(f64::INFINITY, f64::min);
    let x1 = table
        .cells
        .iter()
        .map(|c| c.bbox.x1)
        .fold(f64::NEG_INFINITY, f64::max);
    x1 - x0
}

/// Ordered tuple of trimmed cell texts in `row`, sorted by column.
fn row_signature(table: &Table, row: usize) -> Vec<String> {
    let mut row_cells: Vec<&Cell> = table.cells.iter().filter(|c| c.row == row).collect();
    row_cells.sort_by_key(|c| c.col);
    row_cells
        .iter()
        .map(|c| c.text.trim().to_string())
        .collect()
}

fn merge_tables(first: Table, second: Table) -> Table {
    let drop_rows = usize::from(row_signature(&first, 0) == row_signature(&second, 0));
    let offset = first.n_rows;

    let mut cells = first.cells;
    for cell in second.cells {
        if cell.row < drop_rows {
            continue;
        }
        cells.push(Cell {
            row: cell.row - drop_rows + offset,
            ..cell
        });
    }

    let mut pages: Vec<usize> = first
        .pages
        .iter()
        .chain(second.pages.iter())
        .copied()
        .collect();
    pages.sort_unstable();
    pages.dedup();

    // Meta union, first table's keys taking precedence
    let mut meta = second.meta;
    meta.extend(first.meta);

    let mut merged = Table {
        pages,
        cells,
        n_rows: first.n_rows + second.n_rows - drop_rows,
        n_cols: first.n_cols,
        title: first.title.or(second.title),
        confidence: first.confidence.min(second.confidence),
        meta,
        units: first.units,
        page_size: first.page_size.or(second.page_size),
    };
    merged.sort_cells();
    merged
}
