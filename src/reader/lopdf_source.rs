//! PDF-backed page source built on `lopdf`
//!
//! A deliberately thin content-stream interpreter: enough of the text and
//! path operators to recover positioned glyph runs and axis-aligned rulings.
//! Glyph advance widths use a flat half-em estimate when font metrics are
//! unavailable; the extraction core only needs centers and hulls, not exact
//! advances.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use super::{Glyph, PageContent, PageSource};
use crate::error::{Result, TablexError};
use crate::geometry::BBox;

const ASCENT: f64 = 0.8;
const DESCENT: f64 = 0.2;
const AVERAGE_ADVANCE: f64 = 0.5;
const DEFAULT_LEADING_FACTOR: f64 = 1.2;

/// Page source reading a PDF document through `lopdf`.
pub struct LopdfSource {
    document: Document,
    pages: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfSource")
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl LopdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TablexError::FileNotFound(path.to_path_buf()));
        }
        let document = Document::load(path)
            .map_err(|e| TablexError::pdf_read_with_source("failed to load PDF", e))?;
        Ok(Self::from_document(document))
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|e| TablexError::pdf_read_with_source("failed to load PDF from bytes", e))?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: Document) -> Self {
        let pages = document.get_pages().into_values().collect();
        Self { document, pages }
    }

    /// Walk the page dictionary and its ancestors for an inheritable key.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = page_id;
        loop {
            let dict = self.document.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                let value = match value {
                    Object::Reference(id) => self.document.get_object(*id).ok()?.clone(),
                    other => other.clone(),
                };
                return Some(value);
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => return None,
            }
        }
    }

    fn media_box(&self, page_id: ObjectId) -> (f64, f64) {
        let rect = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok().cloned());
        match rect {
            Some(values) if values.len() == 4 => {
                let nums: Vec<f64> = values
                    .iter()
                    .filter_map(|v| v.as_float().ok().map(f64::from))
                    .collect();
                if nums.len() == 4 {
                    ((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs())
                } else {
                    (612.0, 792.0)
                }
            }
            _ => (612.0, 792.0),
        }
    }

    fn page_rotation(&self, page_id: ObjectId) -> f64 {
        self.inherited(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|deg| f64::from(deg as i32))
            .unwrap_or(0.0)
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, number: usize) -> Result<PageContent> {
        if number == 0 || number > self.pages.len() {
            return Err(TablexError::PageOutOfBounds {
                page: number,
                page_count: self.pages.len(),
            });
        }
        let page_id = self.pages[number - 1];
        let (width, height) = self.media_box(page_id);
        let rotation = self.page_rotation(page_id);

        let data = self
            .document
            .get_page_content(page_id)
            .map_err(|e| TablexError::pdf_read_with_source("failed to read page content", e))?;
        let content = Content::decode(&data)
            .map_err(|e| TablexError::pdf_read_with_source("failed to decode content stream", e))?;

        let mut interpreter = Interpreter::new(height, rotation);
        interpreter.run(&content);

        Ok(PageContent {
            number,
            width,
            height,
            rotation,
            glyphs: interpreter.glyphs,
            rulings: interpreter.rulings,
        })
    }
}

/// 2-D affine transform in PDF row-vector convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

struct Interpreter {
    page_height: f64,
    page_rotation: f64,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f64,
    leading: f64,
    path_start: (f64, f64),
    path_point: (f64, f64),
    pending: Vec<BBox>,
    glyphs: Vec<Glyph>,
    rulings: Vec<BBox>,
}

impl Interpreter {
    fn new(page_height: f64, page_rotation: f64) -> Self {
        Self {
            page_height,
            page_rotation,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            path_start: (0.0, 0.0),
            path_point: (0.0, 0.0),
            pending: Vec::new(),
            glyphs: Vec::new(),
            rulings: Vec::new(),
        }
    }

    fn run(&mut self, content: &Content) {
        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_ref() {
                "q" => self.ctm_stack.push(self.ctm),
                "Q" => {
                    if let Some(m) = self.ctm_stack.pop() {
                        self.ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operand(operands) {
                        self.ctm = m.then(&self.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    if let Some(size) = float_operand(operands, 1) {
                        self.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(l) = float_operand(operands, 0) {
                        self.leading = l;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operand(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) =
                        (float_operand(operands, 0), float_operand(operands, 1))
                    {
                        self.next_line(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) =
                        (float_operand(operands, 0), float_operand(operands, 1))
                    {
                        self.leading = -ty;
                        self.next_line(tx, ty);
                    }
                }
                "T*" => {
                    let leading = if self.leading != 0.0 {
                        self.leading
                    } else {
                        self.font_size * DEFAULT_LEADING_FACTOR
                    };
                    self.next_line(0.0, -leading);
                }
                "Tj" => {
                    if let Some(text) = string_operand(operands, 0) {
                        self.show_text(&text);
                    }
                }
                "'" => {
                    let leading = if self.leading != 0.0 {
                        self.leading
                    } else {
                        self.font_size * DEFAULT_LEADING_FACTOR
                    };
                    self.next_line(0.0, -leading);
                    if let Some(text) = string_operand(operands, 0) {
                        self.show_text(&text);
                    }
                }
                "\"" => {
                    // word/char spacing operands are ignored by this adapter
                    let leading = if self.leading != 0.0 {
                        self.leading
                    } else {
                        self.font_size * DEFAULT_LEADING_FACTOR
                    };
                    self.next_line(0.0, -leading);
                    if let Some(text) = string_operand(operands, 2) {
                        self.show_text(&text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = operands.first() {
                        for part in parts {
                            match part {
                                Object::String(bytes, _) => {
                                    self.show_text(&decode_bytes(bytes));
                                }
                                Object::Integer(n) => self.advance(-(*n as f64) / 1000.0),
                                Object::Real(n) => self.advance(-f64::from(*n) / 1000.0),
                                _ => {}
                            }
                        }
                    }
                }
                "m" => {
                    if let (Some(x), Some(y)) =
                        (float_operand(operands, 0), float_operand(operands, 1))
                    {
                        self.path_start = (x, y);
                        self.path_point = (x, y);
                    }
                }
                "l" => {
                    if let (Some(x), Some(y)) =
                        (float_operand(operands, 0), float_operand(operands, 1))
                    {
                        self.push_segment(self.path_point, (x, y));
                        self.path_point = (x, y);
                    }
                }
                "h" => {
                    self.push_segment(self.path_point, self.path_start);
                    self.path_point = self.path_start;
                }
                "re" => {
                    if let (Some(x), Some(y), Some(w), Some(h)) = (
                        float_operand(operands, 0),
                        float_operand(operands, 1),
                        float_operand(operands, 2),
                        float_operand(operands, 3),
                    ) {
                        self.push_rect(x, y, w, h);
                    }
                }
                // Painting flushes the pending path as rulings
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    self.rulings.append(&mut self.pending);
                }
                // No-paint path end (clipping paths land here)
                "n" => self.pending.clear(),
                _ => {}
            }
        }
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Advance the text matrix by `units` text-space units.
    fn advance(&mut self, units: f64) {
        self.text_matrix =
            Matrix::translation(units * self.font_size, 0.0).then(&self.text_matrix);
    }

    fn show_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let advance = AVERAGE_ADVANCE * self.font_size * text.chars().count() as f64;
        let device = self.text_matrix.then(&self.ctm);

        // Run rectangle in text space, y-up: baseline at y = 0
        let corners = [
            (0.0, -DESCENT * self.font_size),
            (advance, -DESCENT * self.font_size),
            (0.0, ASCENT * self.font_size),
            (advance, ASCENT * self.font_size),
        ];
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for (cx, cy) in corners {
            let (dx, dy) = device.apply(cx, cy);
            let (px, py) = (dx, self.page_height - dy);
            x0 = x0.min(px);
            y0 = y0.min(py);
            x1 = x1.max(px);
            y1 = y1.max(py);
        }

        // Orientation of the baseline in the y-down page frame; the page
        // /Rotate is folded in so one rotation mechanism covers both.
        let angle_pdf = device.b.atan2(device.a).to_degrees();
        let angle = (-angle_pdf + self.page_rotation).rem_euclid(360.0);

        let scale = (device.a * device.a + device.b * device.b).sqrt();
        self.glyphs.push(Glyph {
            bbox: BBox::new(x0, y0, x1, y1),
            text: text.to_string(),
            size: self.font_size * scale,
            angle,
        });
        self.text_matrix = Matrix::translation(advance, 0.0).then(&self.text_matrix);
    }

    fn push_segment(&mut self, from: (f64, f64), to: (f64, f64)) {
        let (x0, y0) = self.ctm.apply(from.0, from.1);
        let (x1, y1) = self.ctm.apply(to.0, to.1);
        self.pending.push(BBox::new(
            x0,
            self.page_height - y0,
            x1,
            self.page_height - y1,
        ));
    }

    fn push_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let corners = [
            self.ctm.apply(x, y),
            self.ctm.apply(x + w, y),
            self.ctm.apply(x, y + h),
            self.ctm.apply(x + w, y + h),
        ];
        let xs = corners.iter().map(|c| c.0);
        let ys = corners.iter().map(|c| self.page_height - c.1);
        self.pending.push(BBox::new(
            xs.clone().fold(f64::INFINITY, f64::min),
            ys.clone().fold(f64::INFINITY, f64::min),
            xs.fold(f64::NEG_INFINITY, f64::max),
            ys.fold(f64::NEG_INFINITY, f64::max),
        ));
    }
}

fn float_operand(operands: &[Object], index: usize) -> Option<f64> {
    operands
        .get(index)
        .and_then(|o| o.as_float().ok())
        .map(f64::from)
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut nums = [0.0f64; 6];
    for (i, slot) in nums.iter_mut().enumerate() {
        *slot = f64::from(operands[i].as_float().ok()?);
    }
    Some(Matrix {
        a: nums[0],
        b: nums[1],
        c: nums[2],
        d: nums[3],
        e: nums[4],
        f: nums[5],
    })
}

fn string_operand(operands: &[Object], index: usize) -> Option<String> {
    match operands.get(index) {
        Some(Object::String(bytes, _)) => Some(decode_bytes(bytes)),
        _ => None,
    }
}

fn decode_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn single_page_pdf(content: &[u8]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_text_run_position_and_flip() {
        let bytes = single_page_pdf(b"BT /F1 10 Tf 100 700 Td (Hello) Tj ET");
        let source = LopdfSource::from_bytes(&bytes).unwrap();
        assert_eq!(source.page_count(), 1);
        let page = source.page(1).unwrap();
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
        assert_eq!(page.glyphs.len(), 1);
        let glyph = &page.glyphs[0];
        assert_eq!(glyph.text, "Hello");
        assert_eq!(glyph.angle, 0.0);
        assert!((glyph.bbox.x0 - 100.0).abs() < 1e-6);
        // Baseline at pdf y=700 maps to page-top y=92; ascent rises above it
        assert!((glyph.bbox.y0 - (92.0 - 8.0)).abs() < 1e-6);
        assert!((glyph.bbox.y1 - (92.0 + 2.0)).abs() < 1e-6);
        // Half-em estimate: 5 chars * 5pt
        assert!((glyph.bbox.width() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_rect_and_line_become_rulings() {
        let bytes = single_page_pdf(b"100 100 200 0.5 re f 50 50 m 50 250 l S");
        let source = LopdfSource::from_bytes(&bytes).unwrap();
        let page = source.page(1).unwrap();
        assert_eq!(page.rulings.len(), 2);
        let rect = &page.rulings[0];
        assert!((rect.x0 - 100.0).abs() < 1e-6);
        assert!((rect.y1 - (792.0 - 100.0)).abs() < 1e-6);
        let line = &page.rulings[1];
        assert!((line.x0 - 50.0).abs() < 1e-6);
        assert!((line.height() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_extract_through_a_file_on_disk() {
        let bytes = single_page_pdf(b"BT /F1 10 Tf 100 700 Td (Hello) Tj ET");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.pdf");
        std::fs::write(&path, &bytes).unwrap();

        let result = crate::extract(&path, &crate::types::ExtractOptions::default()).unwrap();
        assert_eq!(result.tables.len(), 1);
        let table = &result.tables[0];
        assert_eq!((table.n_rows, table.n_cols), (1, 1));
        assert_eq!(table.cells[0].text, "Hello");
        assert_eq!(table.page_size, Some((612.0, 792.0)));
    }

    #[test]
    fn test_page_out_of_bounds() {
        let bytes = single_page_pdf(b"");
        let source = LopdfSource::from_bytes(&bytes).unwrap();
        assert!(matches!(
            source.page(2),
            Err(TablexError::PageOutOfBounds { page: 2, .. })
        ));
        assert!(matches!(
            source.page(0),
            Err(TablexError::PageOutOfBounds { .. })
        ));
    }
}
