//! CSV exporter
//!
//! Writes the matrix projection as RFC-style CSV: fields containing commas,
//! quotes, or newlines are quoted, embedded quotes doubled.

use crate::types::{MatrixFill, Table};

/// Render a table as CSV using the given fill policy.
pub fn table_to_csv(table: &Table, fill: &MatrixFill) -> String {
    let matrix = table.as_matrix(fill);
    let mut out = String::new();
    for row in matrix {
        let line = row
            .iter()
            .map(|field| quote_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::types::Cell;
    use std::collections::BTreeMap;

    fn merged_table() -> Table {
        let cell = |text: &str, row, col, colspan| Cell {
            text: text.to_string(),
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            row,
            col,
            rowspan: 1,
            colspan,
            confidence: 1.0,
        };
        Table {
            pages: vec![1],
            cells: vec![
                cell("Merged", 0, 0, 2),
                cell("Solo", 0, 2, 1),
                cell("A1", 1, 0, 1),
                cell("B1", 1, 1, 1),
                cell("C1", 1, 2, 1),
            ],
            n_rows: 2,
            n_cols: 3,
            title: None,
            confidence: 1.0,
            meta: BTreeMap::new(),
            units: "pt".to_string(),
            page_size: None,
        }
    }

    #[test]
    fn test_repeat_fill() {
        let csv = table_to_csv(&merged_table(), &MatrixFill::Repeat);
        assert!(csv.starts_with("Merged,Merged,Solo\r\n"));
    }

    #[test]
    fn test_empty_fill() {
        let csv = table_to_csv(&merged_table(), &MatrixFill::Empty);
        assert!(csv.starts_with("Merged,,Solo\r\n"));
    }

    #[test]
    fn test_sentinel_fill() {
        let csv = table_to_csv(&merged_table(), &MatrixFill::Sentinel("<S>".to_string()));
        assert!(csv.starts_with("Merged,<S>,Solo\r\n"));
    }

    #[test]
    fn test_quoting() {
        let mut table = merged_table();
        table.cells[2].text = "a,b \"c\"".to_string();
        let csv = table_to_csv(&table, &MatrixFill::Repeat);
        assert!(csv.contains("\"a,b \"\"c\"\"\""));
    }
}
