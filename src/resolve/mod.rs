//! Table resolution pipeline: grid inference, merge resolution, stitching

pub mod grid;
pub mod merge;
pub mod stitch;

pub use grid::{BitGrid, CandidateCell, GridStructure, build_grid, locate_edge};
pub use merge::apply_merges;
pub use stitch::stitch_tables;
