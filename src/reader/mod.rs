//! Page sources: the input contract of the extraction pipeline
//!
//! A page source yields, per page, the page geometry plus positioned glyphs
//! and axis-aligned vector rulings. The built-in [`LopdfSource`] adapts PDF
//! files; [`MemorySource`] serves synthetic pages and hosts that bring their
//! own PDF stack.

mod lopdf_source;
mod memory;

pub use lopdf_source::LopdfSource;
pub use memory::MemorySource;

use crate::error::Result;
use crate::geometry::{BBox, RotatedPage, rotation_from_angles};

/// A positioned glyph run as produced by the PDF reader.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Bounding box, y growing downward from the page top
    pub bbox: BBox,
    /// Text of the run; may contain embedded spaces
    pub text: String,
    /// Font size in points
    pub size: f64,
    /// Clockwise rotation in degrees in the y-down page frame
    pub angle: f64,
}

/// A word grouped from same-baseline glyph runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Hull of the grouped runs
    pub bbox: BBox,
    /// Aggregated text
    pub text: String,
    /// Dominant font size of the runs
    pub size: f64,
}

/// Content of one page, in points with the origin at the page top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// 1-based page number
    pub number: usize,
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
    /// Page-level rotation in degrees, informational; sources fold it into
    /// the glyph angles
    pub rotation: f64,
    /// Positioned glyph runs
    pub glyphs: Vec<Glyph>,
    /// Axis-aligned rulings: stroked lines and filled rectangles alike
    pub rulings: Vec<BBox>,
}

impl PageContent {
    /// Dominant content rotation of the page, inferred from glyph angles.
    pub fn rotated_page(&self) -> RotatedPage {
        let angles: Vec<f64> = self.glyphs.iter().map(|g| g.angle).collect();
        RotatedPage::new(rotation_from_angles(&angles), self.width, self.height)
    }
}

/// Source of page content for one document.
///
/// The orchestrator owns the source for the duration of an extraction run;
/// detectors receive a borrowed handle and never open files themselves.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Content of the 1-based page `number`.
    fn page(&self, number: usize) -> Result<PageContent>;
}

/// Group glyph runs into words.
///
/// Runs sharing a baseline are merged when the horizontal gap between them
/// stays within a size-relative tolerance; a visible gap inserts a single
/// space. Embedded spaces inside a run are preserved as-is, so a run like
/// `"Header 1"` stays one word. Whitespace-only runs are dropped.
pub fn group_words(glyphs: &[Glyph]) -> Vec<Word> {
    let mut runs: Vec<&Glyph> = glyphs.iter().filter(|g| !g.text.trim().is_empty()).collect();
    runs.sort_by(|a, b| {
        let (_, ay) = a.bbox.center();
        let (_, by) = b.bbox.center();
        ay.total_cmp(&by).then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut words: Vec<Word> = Vec::new();
    for run in runs {
        let (_, cy) = run.bbox.center();
        let joined = match words.last_mut() {
            Some(word) => {
                let (_, wy) = word.bbox.center();
                let line_tolerance = 0.5 * run.bbox.height().min(word.bbox.height()).max(1.0);
                let gap = run.bbox.x0 - word.bbox.x1;
                // Runs are sub-word fragments; anything past a sliver of the
                // em size is a cell gap, not a kerning artifact
                let gap_tolerance = 0.15 * run.size.max(word.size);
                if (cy - wy).abs() <= line_tolerance && gap <= gap_tolerance && gap > -gap_tolerance
                {
                    if gap > 0.07 * run.size.max(word.size)
                        && !word.text.ends_with(char::is_whitespace)
                        && !run.text.starts_with(char::is_whitespace)
                    {
                        word.text.push(' ');
                    }
                    word.text.push_str(&run.text);
                    word.bbox = word.bbox.union(&run.bbox);
                    word.size = word.size.max(run.size);
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        if !joined {
            words.push(Word {
                bbox: run.bbox,
                text: run.text.clone(),
                size: run.size,
            });
        }
    }
    for word in &mut words {
        word.text = word.text.trim().to_string();
    }
    words
}
