//! Markdown exporter
//!
//! Renders the matrix projection as a pipe table, first row as header.

use crate::types::{MatrixFill, Table};

/// Render a table as a Markdown pipe table.
pub fn table_to_markdown(table: &Table, fill: &MatrixFill) -> String {
    let matrix = table.as_matrix(fill);
    if matrix.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(matrix.len() + 1);
    lines.push(render_row(&matrix[0]));
    lines.push(format!(
        "| {} |",
        vec!["---"; matrix[0].len()].join(" | ")
    ));
    for row in &matrix[1..] {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

fn render_row(row: &[String]) -> String {
    let fields: Vec<String> = row.iter().map(|f| f.replace('|', "\\|")).collect();
    format!("| {} |", fields.join(" | "))
}
