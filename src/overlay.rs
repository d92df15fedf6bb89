//! Debug overlay rendering
//!
//! Draws the cell boxes of a table as an SVG embedded in a standalone HTML
//! page. The pipeline works y-down; the renderer flips to SVG's y-up display
//! space here and nowhere else.

use crate::types::Table;

/// Render an HTML page with an SVG overlay of the table's cells.
pub fn render_overlay(table: &Table, epsilon: f64, detector: &str, scale: f64) -> String {
    let (width, height) = table.page_size.unwrap_or_else(|| {
        let w = table
            .cells
            .iter()
            .map(|c| c.bbox.x1)
            .fold(0.0f64, f64::max);
        let h = table
            .cells
            .iter()
            .map(|c| c.bbox.y1)
            .fold(0.0f64, f64::max);
        (w, h)
    });
    let svg_width = width * scale;
    let svg_height = height * scale;

    let mut elements = String::new();
    for cell in &table.cells {
        let b = &cell.bbox;
        elements.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" \
             fill=\"rgba(0, 128, 255, 0.15)\" stroke=\"rgba(0, 128, 255, 0.7)\"/>",
            b.x0 * scale,
            (height - b.y1) * scale,
            b.width() * scale,
            b.height() * scale,
        ));
        elements.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"10\" fill=\"#003366\">{}</text>",
            (b.x0 + 2.0) * scale,
            (height - b.y0 - 2.0) * scale,
            escape(&cell.text),
        ));
    }

    let legend = format!(
        "<g transform=\"translate(10,{:.2})\">\
         <rect width=\"260\" height=\"50\" fill=\"white\" stroke=\"#999\"/>\
         <text x=\"10\" y=\"20\" font-size=\"12\">Detector: {}</text>\
         <text x=\"10\" y=\"35\" font-size=\"12\">Cells: {}</text>\
         <text x=\"10\" y=\"48\" font-size=\"12\">Epsilon: {epsilon:.2}</text>\
         </g>",
        svg_height - 60.0,
        escape(detector),
        table.cells.len(),
    );

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Tablex Overlay</title>\
         <style>body{{background:#f9f9f9;font-family:monospace;}}</style>\
         </head><body>\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{svg_width:.2}\" height=\"{svg_height:.2}\" \
         viewBox=\"0 0 {width:.2} {height:.2}\">{elements}{legend}</svg>\
         </body></html>"
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
