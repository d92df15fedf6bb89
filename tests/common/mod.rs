//! Synthetic table pages for end-to-end tests
//!
//! Builds `PageContent` fixtures laying a table out on a letter-sized page:
//! one glyph run per non-empty cell, optional grid rulings with span-aware
//! omissions, and optional whole-page content rotation.
//!
//! Layout constants are chosen so that the plumber detector's
//! padding-expanded glyph boxes form a single connected cluster per table
//! (gaps of 2pt against a 2.4pt bridge at 10pt type) while word grouping
//! keeps neighboring cells apart.

#![allow(dead_code)]

use tablex::geometry::{BBox, RotatedPage};
use tablex::reader::{Glyph, MemorySource, PageContent};

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const ORIGIN_X: f64 = 72.0;
pub const ORIGIN_Y: f64 = 72.0;
pub const COL_WIDTH: f64 = 90.0;
pub const ROW_HEIGHT: f64 = 12.0;
pub const FONT_SIZE: f64 = 10.0;
const CELL_MARGIN: f64 = 1.0;

/// A rectangular span `(row0, col0, row1, col1)`, inclusive.
pub type Span = (usize, usize, usize, usize);

/// Declarative table fixture.
pub struct TablePage {
    data: Vec<Vec<String>>,
    spans: Vec<Span>,
    grid: bool,
    rotation_degrees: f64,
}

impl TablePage {
    /// Table with the given cell texts and full grid rulings.
    pub fn new(data: &[&[&str]]) -> Self {
        Self {
            data: data
                .iter()
                .map(|row| row.iter().map(|s| (*s).to_string()).collect())
                .collect(),
            spans: Vec::new(),
            grid: true,
            rotation_degrees: 0.0,
        }
    }

    /// Declare a merged span; the grid omits the rulings it swallows.
    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Drop all rulings.
    pub fn without_grid(mut self) -> Self {
        self.grid = false;
        self
    }

    /// Rotate the page content clockwise by a multiple of 90 degrees.
    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    fn n_rows(&self) -> usize {
        self.data.len()
    }

    fn n_cols(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn span_covering(&self, row: usize, col: usize) -> Option<&Span> {
        self.spans
            .iter()
            .find(|(r0, c0, r1, c1)| row >= *r0 && row <= *r1 && col >= *c0 && col <= *c1)
    }

    /// Materialize the fixture as a page.
    pub fn build(&self) -> PageContent {
        let mut glyphs = Vec::new();
        for (row, cells) in self.data.iter().enumerate() {
            for (col, text) in cells.iter().enumerate() {
                if text.trim().is_empty() {
                    continue;
                }
                if let Some(&(r0, c0, _, _)) = self.span_covering(row, col) {
                    if (row, col) != (r0, c0) {
                        continue;
                    }
                }
                glyphs.push(Glyph {
                    bbox: cell_word_bbox(row, col),
                    text: text.clone(),
                    size: FONT_SIZE,
                    angle: 0.0,
                });
            }
        }

        let mut rulings = Vec::new();
        if self.grid {
            let (n_rows, n_cols) = (self.n_rows(), self.n_cols());
            for i in 0..=n_cols {
                for row in 0..n_rows {
                    if self.edge_inside_col_span(row, i) {
                        continue;
                    }
                    let x = ORIGIN_X + i as f64 * COL_WIDTH;
                    let y0 = ORIGIN_Y + row as f64 * ROW_HEIGHT;
                    rulings.push(BBox::new(x, y0, x, y0 + ROW_HEIGHT));
                }
            }
            for j in 0..=n_rows {
                for col in 0..n_cols {
                    if self.edge_inside_row_span(j, col) {
                        continue;
                    }
                    let y = ORIGIN_Y + j as f64 * ROW_HEIGHT;
                    let x0 = ORIGIN_X + col as f64 * COL_WIDTH;
                    rulings.push(BBox::new(x0, y, x0 + COL_WIDTH, y));
                }
            }
        }

        let mut page = PageContent {
            number: 1,
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            rotation: 0.0,
            glyphs,
            rulings,
        };

        if self.rotation_degrees != 0.0 {
            let rot = RotatedPage::new(
                self.rotation_degrees.to_radians(),
                PAGE_WIDTH,
                PAGE_HEIGHT,
            );
            for glyph in &mut page.glyphs {
                glyph.bbox = rotate_bbox(&rot, &glyph.bbox);
                glyph.angle = self.rotation_degrees;
            }
            for ruling in &mut page.rulings {
                *ruling = rotate_bbox(&rot, ruling);
            }
        }
        page
    }

    /// Vertical edge `i` sits strictly inside a span at `row`.
    fn edge_inside_col_span(&self, row: usize, i: usize) -> bool {
        self.spans
            .iter()
            .any(|(r0, c0, r1, c1)| row >= *r0 && row <= *r1 && i > *c0 && i <= *c1)
    }

    /// Horizontal edge `j` sits strictly inside a span at `col`.
    fn edge_inside_row_span(&self, j: usize, col: usize) -> bool {
        self.spans
            .iter()
            .any(|(r0, c0, r1, c1)| col >= *c0 && col <= *c1 && j > *r0 && j <= *r1)
    }
}

/// Word box for a cell: anchored to the cell (spans anchor in their first
/// column), inset by one point per side.
fn cell_word_bbox(row: usize, col: usize) -> BBox {
    let x0 = ORIGIN_X + col as f64 * COL_WIDTH + CELL_MARGIN;
    let y0 = ORIGIN_Y + row as f64 * ROW_HEIGHT + CELL_MARGIN;
    BBox::new(
        x0,
        y0,
        x0 + COL_WIDTH - 2.0 * CELL_MARGIN,
        y0 + FONT_SIZE,
    )
}

fn rotate_bbox(rot: &RotatedPage, bbox: &BBox) -> BBox {
    let corners = [
        rot.rotate_point(bbox.x0, bbox.y0),
        rot.rotate_point(bbox.x0, bbox.y1),
        rot.rotate_point(bbox.x1, bbox.y0),
        rot.rotate_point(bbox.x1, bbox.y1),
    ];
    let xs = corners.iter().map(|c| c.0);
    let ys = corners.iter().map(|c| c.1);
    BBox::new(
        xs.clone().fold(f64::INFINITY, f64::min),
        ys.clone().fold(f64::INFINITY, f64::min),
        xs.fold(f64::NEG_INFINITY, f64::max),
        ys.fold(f64::NEG_INFINITY, f64::max),
    )
}

/// Bundle pages into a source.
pub fn source_of(pages: Vec<PageContent>) -> MemorySource {
    MemorySource::new(pages)
}

/// Partition and ordering invariants every extracted table must satisfy.
pub fn assert_table_invariants(table: &tablex::Table) {
    let mut covered = vec![false; table.n_rows * table.n_cols];
    for cell in &table.cells {
        assert!(cell.rowspan >= 1 && cell.colspan >= 1);
        assert!(cell.row + cell.rowspan <= table.n_rows);
        assert!(cell.col + cell.colspan <= table.n_cols);
        for r in cell.row..cell.row + cell.rowspan {
            for c in cell.col..cell.col + cell.colspan {
                assert!(
                    !covered[r * table.n_cols + c],
                    "cells overlap at ({r}, {c})"
                );
                covered[r * table.n_cols + c] = true;
            }
        }
    }
    assert!(covered.iter().all(|&v| v), "grid positions left uncovered");

    for pair in table.cells.windows(2) {
        assert!(
            (pair[0].row, pair[0].col) < (pair[1].row, pair[1].col),
            "cells out of canonical order"
        );
    }
}
