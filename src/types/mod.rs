//! Core types used throughout the fidelity library.
//!
//! - [`design`] - design-tree and captured-tree node payloads
//! - [`inputs`] - image-fill maps and variable bundles
//! - [`core`] - luminance pixel matrices
//! - [`metric_results`] - coverage ratios and similarity results

pub mod core;
pub mod design;
pub mod inputs;
pub mod metric_results;

pub use self::core::{ImagePair, PixelMatrix};
pub use design::{CaptureSnapshot, CapturedNode, CapturedTree, DesignNode, DesignTree};
pub use inputs::{ImageFillMap, VariableBundle};
pub use metric_results::{CoverageRatio, MetricScores, SimilarityResult};
