//! End-to-end extraction scenarios over synthetic pages

mod common;

use pretty_assertions::assert_eq;
use tablex::{ExtractOptions, MatrixFill, extract_from_source};

use common::{TablePage, assert_table_invariants, source_of};

fn matrix_of(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|s| (*s).to_string()).collect())
        .collect()
}

#[test]
fn ruled_three_by_three_round_trips() {
    let data: &[&[&str]] = &[
        &["Header 1", "Header 2", "Header 3"],
        &["R1C1", "R1C2", "R1C3"],
        &["R2C1", "R2C2", "R2C3"],
    ];
    let source = source_of(vec![TablePage::new(data).build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    assert_eq!(result.tables.len(), 1);
    let table = &result.tables[0];
    assert_eq!(table.n_rows, 3);
    assert_eq!(table.n_cols, 3);
    assert!(table.cells.iter().all(|c| c.rowspan == 1 && c.colspan == 1));
    assert_eq!(table.as_matrix(&MatrixFill::Repeat), matrix_of(data));
    assert_eq!(table.pages, vec![1]);
    assert!((table.confidence - 0.8).abs() < 1e-12);
    assert_table_invariants(table);

    assert_eq!(result.stats.detector, "plumber");
    assert_eq!(result.stats.regions, 1);
    assert!(result.warnings.is_empty());
}

#[test]
fn merged_header_recovers_colspan() {
    let data: &[&[&str]] = &[&["Merged", "", "Solo"], &["A1", "B1", "C1"]];
    let source = source_of(vec![TablePage::new(data).with_span((0, 0, 0, 1)).build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    assert_eq!(result.tables.len(), 1);
    let table = &result.tables[0];
    assert_eq!(table.n_cols, 3);
    let merged = table.cells.iter().find(|c| c.text == "Merged").unwrap();
    assert_eq!((merged.row, merged.col), (0, 0));
    assert_eq!(merged.colspan, 2);
    assert_eq!(merged.rowspan, 1);

    let matrix = table.as_matrix(&MatrixFill::Repeat);
    assert_eq!(matrix[0][0], "Merged");
    assert_eq!(matrix[0][1], "Merged");
    assert_eq!(matrix[0][2], "Solo");
    assert_table_invariants(table);
}

#[test]
fn ragged_body_keeps_empty_cells_apart() {
    let data: &[&[&str]] = &[
        &["A", "B", "C", "D"],
        &["1", "2", "", ""],
        &["3", "", "", ""],
    ];
    let source = source_of(vec![TablePage::new(data).build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    let table = &result.tables[0];
    assert_eq!(table.n_cols, 4);
    assert_eq!(table.n_rows, 3);
    let matrix = table.as_matrix(&MatrixFill::Repeat);
    assert_eq!(matrix[2][0], "3");
    assert_eq!(matrix[1][2], "");
    // No accidental merges across non-empty neighbors
    assert!(table.cells.iter().all(|c| c.rowspan == 1 && c.colspan == 1));
    assert_table_invariants(table);
}

#[test]
fn unruled_table_recovers_from_layout_alone() {
    let data: &[&[&str]] = &[
        &["Header 1", "Header 2", "Header 3"],
        &["R1C1", "R1C2", "R1C3"],
        &["R2C1", "R2C2", "R2C3"],
    ];
    let source = source_of(vec![TablePage::new(data).without_grid().build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    let table = &result.tables[0];
    assert_eq!(table.n_rows, 3);
    assert_eq!(table.n_cols, 3);
    assert_eq!(table.as_matrix(&MatrixFill::Repeat), matrix_of(data));
    assert_table_invariants(table);
}

#[test]
fn rotated_page_is_transparent_to_the_caller() {
    let data: &[&[&str]] = &[&["H1", "H2"], &["R1", "R2"]];
    // Content drawn at -90 degrees (stored as 270 clockwise)
    let source = source_of(vec![TablePage::new(data).rotated(270.0).build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    assert_eq!(result.tables.len(), 1);
    let table = &result.tables[0];
    assert_eq!((table.n_rows, table.n_cols), (2, 2));
    let matrix = table.as_matrix(&MatrixFill::Repeat);
    assert_eq!(matrix[1][0], "R1");
    assert_eq!(matrix[0][1], "H2");
    assert_table_invariants(table);
}

#[test]
fn single_word_makes_a_one_by_one_table() {
    let source = source_of(vec![TablePage::new(&[&["lonely"]]).without_grid().build()]);
    let result = extract_from_source(&source, &ExtractOptions::default()).unwrap();

    assert_eq!(result.tables.len(), 1);
    let table = &result.tables[0];
    assert_eq!((table.n_rows, table.n_cols), (1, 1));
    assert_eq!(table.cells[0].text, "lonely");
    assert_table_invariants(table);
}

#[test]
fn page_filter_limits_extraction() {
    let data: &[&[&str]] = &[&["A", "B"], &["1", "2"]];
    let other: &[&[&str]] = &[&["X"], &["9"]];
    let source = source_of(vec![
        TablePage::new(data).build(),
        TablePage::new(other).build(),
    ]);
    let options = ExtractOptions {
        pages: Some([2].into_iter().collect()),
        ..Default::default()
    };
    let result = extract_from_source(&source, &options).unwrap();
    assert_eq!(result.tables.len(), 1);
    assert_eq!(result.tables[0].pages, vec![2]);
    assert_eq!(result.tables[0].n_cols, 1);
}

#[test]
fn matrix_anchoring_holds_for_every_fill() {
    let data: &[&[&str]] = &[&["Merged", "", "Solo"], &["A1", "B1", "C1"]];
    let source = source_of(vec![TablePage::new(data).with_span((0, 0, 0, 1)).build()]);
    let table = extract_from_source(&source, &ExtractOptions::default())
        .unwrap()
        .tables
        .remove(0);
    for fill in [
        MatrixFill::Repeat,
        MatrixFill::Empty,
        MatrixFill::Sentinel("<X>".to_string()),
        MatrixFill::Value("?".to_string()),
    ] {
        let matrix = table.as_matrix(&fill);
        for cell in &table.cells {
            assert_eq!(matrix[cell.row][cell.col], cell.text);
        }
    }
}
