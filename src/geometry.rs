//! Geometry primitives for table inference
//!
//! Bounding-box algebra, adaptive snapping tolerances derived from glyph
//! heights, 1-D value snapping, and the quarter-turn page rotation transform.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in PDF points, y growing downward from the page top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl BBox {
    /// Create a bbox, normalizing so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Center point `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Area, zero for degenerate boxes.
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the box by `padding` on every side.
    pub fn expand(&self, padding: f64) -> BBox {
        BBox {
            x0: self.x0 - padding,
            y0: self.y0 - padding,
            x1: self.x1 + padding,
            y1: self.y1 + padding,
        }
    }

    /// Whether the two boxes overlap (touching edges count as overlap).
    pub fn intersects(&self, other: &BBox) -> bool {
        !(self.x1 < other.x0 || self.x0 > other.x1 || self.y1 < other.y0 || self.y0 > other.y1)
    }

    /// Intersection-over-union of two boxes.
    pub fn iou(&self, other: &BBox) -> f64 {
        let ix = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let iy = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union == 0.0 { 0.0 } else { inter / union }
    }
}

/// Smallest box containing every input box, `None` for an empty input.
pub fn merge_boxes<I>(boxes: I) -> Option<BBox>
where
    I: IntoIterator<Item = BBox>,
{
    boxes.into_iter().reduce(|acc, b| acc.union(&b))
}

/// Median of a sample. Even-length samples average the two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Adaptive snapping tolerance from glyph heights.
///
/// The tolerance scales with typography (median absolute deviation of the
/// heights) but never collapses to zero for uniform fonts: a zero MAD falls
/// back to a tenth of the median height, and the result is floored at 0.5pt.
pub fn snap_epsilon(heights: &[f64]) -> f64 {
    if heights.is_empty() {
        return 1.0;
    }
    let mut sample = heights.to_vec();
    let med = median(&mut sample);
    let mut deviations: Vec<f64> = heights.iter().map(|h| (h - med).abs()).collect();
    let mut mad = median(&mut deviations);
    if mad == 0.0 {
        mad = med * 0.1;
    }
    (mad * 0.8).max(0.5)
}

/// Snap a set of 1-D values into a sorted list whose consecutive elements
/// differ by more than `epsilon`.
///
/// Values within `epsilon` of the last accepted value are merged into it by
/// averaging, so a dense cluster collapses to a single representative.
pub fn snap_values(values: &[f64], epsilon: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut snapped = vec![sorted[0]];
    for &value in &sorted[1..] {
        let last = snapped.last_mut().unwrap();
        if (value - *last).abs() <= epsilon {
            *last = (*last + value) / 2.0;
        } else {
            snapped.push(value);
        }
    }
    snapped
}

/// Convert track centers into track edges bounded by `[lo, hi]`.
///
/// Edges are the midpoints between consecutive centers; an empty center list
/// yields the two-element `[lo, hi]`.
pub fn centers_to_edges(centers: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let mut edges = Vec::with_capacity(centers.len() + 1);
    edges.push(lo);
    for pair in centers.windows(2) {
        edges.push((pair[0] + pair[1]) / 2.0);
    }
    edges.push(hi);
    edges
}

/// Infer the dominant page rotation (radians) from glyph angles in degrees.
///
/// Every angle is bucketed (mod 360) into the closest of {0, 90, 180, 270}
/// by minimum circular distance; the dominant bucket wins, earlier buckets
/// winning ties.
pub fn rotation_from_angles(angles: &[f64]) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    const BUCKETS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];
    let mut counts = [0usize; 4];
    for angle in angles {
        let a = angle.rem_euclid(360.0);
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, b) in BUCKETS.iter().enumerate() {
            let d = (a - b).abs();
            let circ = d.min(360.0 - d);
            if circ < best_dist {
                best_dist = circ;
                best = i;
            }
        }
        counts[best] += 1;
    }
    let mut dominant = 0;
    for i in 1..4 {
        if counts[i] > counts[dominant] {
            dominant = i;
        }
    }
    BUCKETS[dominant].to_radians()
}

/// A page with a known content rotation, able to map points back into the
/// canonical (unrotated) orientation.
///
/// The angle is always a multiple of a quarter turn, so the transform is the
/// exact axis-swap form rather than trigonometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedPage {
    /// Content rotation in radians, a multiple of `PI / 2`
    pub angle: f64,
    /// Page width in points
    pub width: f64,
    /// Page height in points
    pub height: f64,
}

impl RotatedPage {
    /// Construct from an angle in radians.
    pub fn new(angle: f64, width: f64, height: f64) -> Self {
        Self {
            angle,
            width,
            height,
        }
    }

    /// Whether the page carries any rotation.
    pub fn is_rotated(&self) -> bool {
        self.quarter_turns() != 0
    }

    /// Number of counter-clockwise quarter turns encoded by `angle`, in 0..4.
    fn quarter_turns(&self) -> u8 {
        let turns = (self.angle / std::f64::consts::FRAC_PI_2).round() as i64;
        turns.rem_euclid(4) as u8
    }

    /// Rotate a point by `-angle` about the page center, into the canonical
    /// orientation.
    pub fn unrotate_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let (dx, dy) = (x - cx, y - cy);
        let (rx, ry) = match self.quarter_turns() {
            0 => (dx, dy),
            1 => (dy, -dx),
            2 => (-dx, -dy),
            3 => (-dy, dx),
            _ => unreachable!(),
        };
        (rx + cx, ry + cy)
    }

    /// Rotate a point by `+angle` about the page center; the inverse of
    /// [`unrotate_point`](Self::unrotate_point).
    pub fn rotate_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let (dx, dy) = (x - cx, y - cy);
        let (rx, ry) = match self.quarter_turns() {
            0 => (dx, dy),
            1 => (-dy, dx),
            2 => (-dx, -dy),
            3 => (dy, -dx),
            _ => unreachable!(),
        };
        (rx + cx, ry + cy)
    }

    /// Unrotate a bbox by transforming its corners and taking the hull.
    /// Exact for quarter turns: an axis-aligned box stays axis-aligned.
    pub fn unrotate_bbox(&self, bbox: &BBox) -> BBox {
        let corners = [
            self.unrotate_point(bbox.x0, bbox.y0),
            self.unrotate_point(bbox.x0, bbox.y1),
            self.unrotate_point(bbox.x1, bbox.y0),
            self.unrotate_point(bbox.x1, bbox.y1),
        ];
        let xs = corners.iter().map(|c| c.0);
        let ys = corners.iter().map(|c| c.1);
        BBox {
            x0: xs.clone().fold(f64::INFINITY, f64::min),
            y0: ys.clone().fold(f64::INFINITY, f64::min),
            x1: xs.fold(f64::NEG_INFINITY, f64::max),
            y1: ys.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
