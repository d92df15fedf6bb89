//! Built-in glyph-clustering detector
//!
//! Expands every glyph box by a typography-derived padding and treats the
//! connected components of the resulting overlap graph as candidate table
//! regions. Rulings are assigned to the regions they intersect. Everything
//! happens in the canonical page orientation.

use std::collections::BTreeSet;

use crate::detect::{DetectedRegion, Detector};
use crate::error::Result;
use crate::geometry::{BBox, merge_boxes, snap_epsilon};
use crate::reader::PageSource;

const PADDING_FACTOR: f64 = 1.5;
const HULL_EXPANSION_FACTOR: f64 = 0.3;
const REGION_CONFIDENCE: f64 = 0.8;

/// Detector clustering glyph boxes into table regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlumberDetector;

impl PlumberDetector {
    /// Registry name of the built-in detector.
    pub const NAME: &'static str = "plumber";
    /// Version recorded on emitted regions.
    pub const VERSION: &'static str = "1.0";

    /// Create the detector.
    pub fn new() -> Self {
        Self
    }
}

impl Detector for PlumberDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn detect(
        &self,
        source: &dyn PageSource,
        pages: Option<&BTreeSet<usize>>,
    ) -> Result<Vec<DetectedRegion>> {
        let mut regions = Vec::new();
        for number in 1..=source.page_count() {
            if let Some(filter) = pages {
                if !filter.contains(&number) {
                    continue;
                }
            }
            let page = source.page(number)?;
            if page.glyphs.is_empty() {
                continue;
            }

            let rot = page.rotated_page();
            let sizes: Vec<f64> = page.glyphs.iter().map(|g| g.size).collect();
            let padding = snap_epsilon(&sizes) * PADDING_FACTOR;

            let glyph_boxes: Vec<BBox> = page
                .glyphs
                .iter()
                .map(|g| rot.unrotate_bbox(&g.bbox))
                .collect();
            let rulings: Vec<BBox> = page.rulings.iter().map(|r| rot.unrotate_bbox(r)).collect();
            let expanded: Vec<BBox> = glyph_boxes.iter().map(|b| b.expand(padding)).collect();

            let mut clusters = connected_components(&expanded);
            // Deterministic region order: top-to-bottom, then left-to-right
            clusters.sort_by(|a, b| {
                let ha = cluster_hull(&glyph_boxes, a);
                let hb = cluster_hull(&glyph_boxes, b);
                ha.y0.total_cmp(&hb.y0).then(ha.x0.total_cmp(&hb.x0))
            });

            tracing::debug!(
                page = number,
                clusters = clusters.len(),
                padding,
                "glyph clustering complete"
            );

            for members in clusters {
                let member_boxes: Vec<BBox> = members.iter().map(|&i| glyph_boxes[i]).collect();
                let hull = cluster_hull(&glyph_boxes, &members);
                let bbox = hull.expand(padding * HULL_EXPANSION_FACTOR);
                let region_rulings: Vec<BBox> = rulings
                    .iter()
                    .filter(|r| r.intersects(&bbox))
                    .copied()
                    .collect();
                regions.push(DetectedRegion {
                    page: number,
                    bbox,
                    rulings: region_rulings,
                    glyph_boxes: member_boxes,
                    confidence: REGION_CONFIDENCE,
                    detector_version: Self::VERSION.to_string(),
                });
            }
        }
        Ok(regions)
    }
}

fn cluster_hull(boxes: &[BBox], members: &[usize]) -> BBox {
    merge_boxes(members.iter().map(|&i| boxes[i]))
        .expect("clusters are never empty")
}

/// Connected components of the box-overlap graph. Equivalent to the
/// connected polygons of the boxes' union.
fn connected_components(boxes: &[BBox]) -> Vec<Vec<usize>> {
    let mut dsu = DisjointSet::new(boxes.len());
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].intersects(&boxes[j]) {
                dsu.union(i, j);
            }
        }
    }
    let mut components: std::collections::BTreeMap<usize, Vec<usize>> =
        std::collections::BTreeMap::new();
    for i in 0..boxes.len() {
        components.entry(dsu.find(i)).or_default().push(i);
    }
    components.into_values().collect()
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}
