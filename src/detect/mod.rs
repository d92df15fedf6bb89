//! Table region detectors
//!
//! A detector proposes candidate table regions per page. Implementations are
//! discovered by name through a process-wide registry; the built-in detector
//! is [`PlumberDetector`] under the name `"plumber"`.

mod plumber;

pub use plumber::PlumberDetector;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::{Result, TablexError};
use crate::geometry::BBox;
use crate::reader::PageSource;

/// Candidate table region proposed by a detector, in the canonical
/// (unrotated) page orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedRegion {
    /// 1-based page number
    pub page: usize,
    /// Region bounds
    pub bbox: BBox,
    /// Rulings intersecting the region
    pub rulings: Vec<BBox>,
    /// Bounding boxes of the glyphs that formed the region
    pub glyph_boxes: Vec<BBox>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Version string of the emitting detector
    pub detector_version: String,
}

/// A table region detector.
///
/// Detectors receive the opened page source rather than a path: the
/// orchestrator owns the reader session and hands a borrowed handle down.
pub trait Detector: Send + Sync {
    /// Registry name of the detector.
    fn name(&self) -> &str;

    /// Version string recorded on emitted regions.
    fn version(&self) -> &str;

    /// Propose table regions for the selected pages (`None` means all).
    fn detect(
        &self,
        source: &dyn PageSource,
        pages: Option<&BTreeSet<usize>>,
    ) -> Result<Vec<DetectedRegion>>;
}

impl std::fmt::Debug for dyn Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Detector({})", self.name())
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn Detector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a detector under its own name, replacing any previous entry.
pub fn register_detector(detector: Arc<dyn Detector>) {
    let mut registry = REGISTRY.write().expect("detector registry poisoned");
    registry.insert(detector.name().to_string(), detector);
}

/// Look up a detector by name. The built-in `"plumber"` detector is inserted
/// lazily on first lookup; instances are cached for the process lifetime.
pub fn detector(name: &str) -> Result<Arc<dyn Detector>> {
    {
        let registry = REGISTRY.read().expect("detector registry poisoned");
        if let Some(found) = registry.get(name) {
            return Ok(Arc::clone(found));
        }
    }
    if name == PlumberDetector::NAME {
        let built_in: Arc<dyn Detector> = Arc::new(PlumberDetector::new());
        let mut registry = REGISTRY.write().expect("detector registry poisoned");
        let entry = registry
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&built_in));
        return Ok(Arc::clone(entry));
    }
    Err(TablexError::UnknownDetector(name.to_string()))
}

/// Names of all currently registered detectors, including the built-in.
pub fn available_detectors() -> Vec<String> {
    let registry = REGISTRY.read().expect("detector registry poisoned");
    let mut names: Vec<String> = registry.keys().cloned().collect();
    if !names.iter().any(|n| n == PlumberDetector::NAME) {
        names.push(PlumberDetector::NAME.to_string());
    }
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullDetector;

    impl Detector for NullDetector {
        fn name(&self) -> &str {
            "null"
        }

        fn version(&self) -> &str {
            "0.0"
        }

        fn detect(
            &self,
            _source: &dyn PageSource,
            _pages: Option<&BTreeSet<usize>>,
        ) -> Result<Vec<DetectedRegion>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_builtin_lookup_is_cached() {
        let first = detector("plumber").unwrap();
        let second = detector("plumber").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_detector() {
        let err = detector("does-not-exist").unwrap_err();
        assert!(matches!(err, TablexError::UnknownDetector(_)));
    }

    #[test]
    fn test_registration() {
        register_detector(Arc::new(NullDetector));
        let found = detector("null").unwrap();
        assert_eq!(found.name(), "null");
        assert!(available_detectors().contains(&"null".to_string()));
        assert!(available_detectors().contains(&"plumber".to_string()));
    }
}
