//! Extraction orchestrator
//!
//! Drives the per-region pipeline: canonical orientation, word grouping,
//! grid inference, merge resolution, packaging, and cross-page stitching.
//! Soft anomalies are recorded as warnings and skipped; the rest of the
//! document proceeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::detect::{self, Detector};
use crate::error::Result;
use crate::geometry::snap_epsilon;
use crate::reader::{Glyph, PageSource, Word, group_words};
use crate::resolve::{apply_merges, build_grid, stitch_tables};
use crate::types::{DetectorRef, DocResult, ExtractOptions, ExtractStats, Table};

/// Resolve the configured detector into an instance.
pub fn resolve_detector(choice: &DetectorRef) -> Result<Arc<dyn Detector>> {
    match choice {
        DetectorRef::Default => detect::detector(detect::PlumberDetector::NAME),
        DetectorRef::Named(name) => detect::detector(name),
        DetectorRef::Instance(instance) => Ok(Arc::clone(instance)),
    }
}

/// Extract tables from an opened page source.
pub fn extract_from_source(
    source: &dyn PageSource,
    options: &ExtractOptions,
) -> Result<DocResult> {
    let detector = resolve_detector(&options.detector)?;
    tracing::info!(
        detector = detector.name(),
        pages = ?options.pages,
        "starting extraction"
    );

    let detections = detector.detect(source, options.pages.as_ref())?;
    let mut tables: Vec<Table> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for region in &detections {
        if region.page == 0 || region.page > source.page_count() {
            warnings.push(format!("Region on page {} out of bounds", region.page));
            continue;
        }
        if region.bbox.width() <= 0.0 || region.bbox.height() <= 0.0 {
            warnings.push(format!("Degenerate region on page {}", region.page));
            continue;
        }

        let page = source.page(region.page)?;
        let rot = page.rotated_page();
        let glyphs: Vec<Glyph> = if rot.is_rotated() {
            page.glyphs
                .iter()
                .map(|g| Glyph {
                    bbox: rot.unrotate_bbox(&g.bbox),
                    text: g.text.clone(),
                    size: g.size,
                    angle: 0.0,
                })
                .collect()
        } else {
            page.glyphs.clone()
        };

        let words: Vec<Word> = group_words(&glyphs)
            .into_iter()
            .filter(|w| w.bbox.intersects(&region.bbox))
            .collect();
        let heights: Vec<f64> = words.iter().map(|w| w.bbox.height()).collect();
        let epsilon = snap_epsilon(&heights);

        let (grid, candidates) = build_grid(&words, region.bbox, &region.rulings, epsilon);
        let cells = apply_merges(&grid, &candidates);
        tracing::debug!(
            page = region.page,
            rows = grid.n_rows(),
            cols = grid.n_cols(),
            cells = cells.len(),
            epsilon,
            "region resolved"
        );

        let mut meta = BTreeMap::new();
        meta.insert(
            "detector_version".to_string(),
            serde_json::Value::String(region.detector_version.clone()),
        );
        meta.insert("epsilon".to_string(), serde_json::json!(epsilon));

        let mut table = Table {
            pages: vec![region.page],
            cells,
            n_rows: grid.n_rows(),
            n_cols: grid.n_cols(),
            title: None,
            confidence: region.confidence,
            meta,
            units: "pt".to_string(),
            page_size: Some((page.width, page.height)),
        };
        table.sort_cells();
        tables.push(table);
    }

    let stitched = stitch_tables(tables, options.stitch);
    let stats = ExtractStats {
        detector: detector.name().to_string(),
        regions: detections.len(),
        tables: stitched.len(),
    };
    tracing::info!(
        regions = stats.regions,
        tables = stats.tables,
        warnings = warnings.len(),
        "extraction complete"
    );
    Ok(DocResult {
        tables: stitched,
        stats,
        warnings,
    })
}
