//! HTML exporter
//!
//! Emits one `<table>` per extracted table. Span attributes appear only when
//! greater than one; positions covered by a span are skipped rather than
//! rendered as empty `<td>` elements.

use crate::types::{Cell, Table};

/// Render a table as an HTML `<table>` element.
pub fn table_to_html(table: &Table, inline_styles: bool) -> String {
    let anchors = anchor_matrix(table);
    let style_attr = if inline_styles {
        " style=\"border-collapse:collapse;border:1px solid #666;font-family:monospace;\""
    } else {
        ""
    };
    let mut lines = vec![format!("<table{style_attr}>")];
    for row in anchors {
        lines.push("  <tr>".to_string());
        for cell in row.into_iter().flatten() {
            let mut attrs = String::new();
            if cell.rowspan > 1 {
                attrs.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
            }
            if cell.colspan > 1 {
                attrs.push_str(&format!(" colspan=\"{}\"", cell.colspan));
            }
            if inline_styles {
                attrs.push_str(" style=\"padding:4px;border:1px solid #999;\"");
            }
            lines.push(format!("    <td{attrs}>{}</td>", escape(&cell.text)));
        }
        lines.push("  </tr>".to_string());
    }
    lines.push("</table>".to_string());
    lines.join("\n")
}

/// Render several tables, separated by blank lines.
pub fn tables_to_html(tables: &[Table], inline_styles: bool) -> String {
    tables
        .iter()
        .map(|t| table_to_html(t, inline_styles))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `n_rows x n_cols` matrix holding each cell at its anchor position only.
fn anchor_matrix(table: &Table) -> Vec<Vec<Option<&Cell>>> {
    let mut matrix: Vec<Vec<Option<&Cell>>> = vec![vec![None; table.n_cols]; table.n_rows];
    for cell in &table.cells {
        matrix[cell.row][cell.col] = Some(cell);
    }
    matrix
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use std::collections::BTreeMap;

    fn sample_table() -> Table {
        let cell = |text: &str, row, col, rowspan, colspan| Cell {
            text: text.to_string(),
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            row,
            col,
            rowspan,
            colspan,
            confidence: 1.0,
        };
        Table {
            pages: vec![1],
            cells: vec![
                cell("Merged", 0, 0, 1, 2),
                cell("Solo", 0, 2, 1, 1),
                cell("A1", 1, 0, 1, 1),
                cell("B1", 1, 1, 1, 1),
                cell("C1", 1, 2, 1, 1),
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
    fn test_colspan_attribute_and_skipped_position() {
        let html = table_to_html(&sample_table(), false);
        assert!(html.contains("colspan=\"2\""));
        assert!(!html.contains("rowspan="));
        // Two <td> in the first row: the span position is skipped
        let first_row = html.split("</tr>").next().unwrap();
        assert_eq!(first_row.matches("<td").count(), 2);
    }

    #[test]
    fn test_escaping() {
        let mut table = sample_table();
        table.cells[1].text = "a<b & \"c\"".to_string();
        let html = table_to_html(&table, false);
        assert!(html.contains("a&lt;b &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_inline_styles_toggle() {
        let plain = table_to_html(&sample_table(), false);
        assert!(!plain.contains("style="));
        let styled = table_to_html(&sample_table(), true);
        assert!(styled.contains("border-collapse"));
    }

    #[test]
    fn test_tables_to_html_joins() {
        let html = tables_to_html(&[sample_table(), sample_table()], false);
        assert_eq!(html.matches("<table>").count(), 2);
    }
}
