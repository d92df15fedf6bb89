//! # Tablex
//!
//! Structured table extraction from PDF documents: positioned glyphs and
//! vector rulings in, tables with rows, columns, merged spans, and cell text
//! out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablex::{Extractor, MatrixFill, StitchAggressiveness};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = Extractor::new()
//!         .extract("report.pdf")
//!         .stitch(StitchAggressiveness::High)
//!         .run()?;
//!
//!     for table in &result.tables {
//!         for row in table.as_matrix(&MatrixFill::Repeat) {
//!             println!("{}", row.join(" | "));
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2024_compatibility)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod detect;
pub mod error;
pub mod export;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod reader;
pub mod resolve;
pub mod types;

pub use error::{Result, TablexError};
pub use pipeline::extract_from_source;
pub use types::{
    Cell, DetectorRef, DocResult, ExtractOptions, ExtractStats, MatrixFill,
    StitchAggressiveness, Table, parse_page_ranges,
};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use reader::LopdfSource;

/// Current version of the Tablex library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract tables from a PDF file.
pub fn extract<P: AsRef<Path>>(pdf_path: P, options: &ExtractOptions) -> Result<DocResult> {
    let source = LopdfSource::open(pdf_path)?;
    pipeline::extract_from_source(&source, options)
}

/// Main extraction interface
#[derive(Debug, Clone, Default)]
pub struct Extractor;

impl Extractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Start an extraction with builder pattern
    pub fn extract<P: AsRef<Path>>(&self, input: P) -> ExtractionBuilder {
        ExtractionBuilder::new(input.as_ref().to_path_buf())
    }
}

/// Builder for extractions with fluent API
#[derive(Debug)]
pub struct ExtractionBuilder {
    input: PathBuf,
    options: ExtractOptions,
}

impl ExtractionBuilder {
    /// Create a new extraction builder
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            options: ExtractOptions::default(),
        }
    }

    /// Restrict extraction to the given 1-based pages
    pub fn pages<I: IntoIterator<Item = usize>>(mut self, pages: I) -> Self {
        self.options.pages = Some(pages.into_iter().collect::<BTreeSet<usize>>());
        self
    }

    /// Restrict extraction to a page-range expression, e.g. `"1,3-5"`
    pub fn page_range(mut self, expr: &str) -> Result<Self> {
        self.options.pages = Some(parse_page_ranges(expr)?);
        Ok(self)
    }

    /// Select the detector
    pub fn detector(mut self, detector: DetectorRef) -> Self {
        self.options.detector = detector;
        self
    }

    /// Select a registered detector by name
    pub fn detector_name<S: Into<String>>(mut self, name: S) -> Self {
        self.options.detector = DetectorRef::Named(name.into());
        self
    }

    /// Set the stitching aggressiveness
    pub fn stitch(mut self, aggressiveness: StitchAggressiveness) -> Self {
        self.options.stitch = aggressiveness;
        self
    }

    /// Run the extraction
    pub fn run(self) -> Result<DocResult> {
        extract(&self.input, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_options() {
        let builder = Extractor::new()
            .extract("x.pdf")
            .pages([3, 1, 2])
            .stitch(StitchAggressiveness::Low)
            .detector_name("plumber");
        assert_eq!(
            builder.options.pages.as_ref().unwrap().len(),
            3
        );
        assert_eq!(builder.options.stitch, StitchAggressiveness::Low);
        assert!(matches!(
            builder.options.detector,
            DetectorRef::Named(ref n) if n == "plumber"
        ));
    }

    #[test]
    fn test_page_range_builder_rejects_garbage() {
        assert!(Extractor::new().extract("x.pdf").page_range("nope").is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let result = extract("/definitely/not/here.pdf", &ExtractOptions::default());
        assert!(matches!(result, Err(TablexError::FileNotFound(_))));
    }
}
