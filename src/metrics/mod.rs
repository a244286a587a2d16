//! Metrics module for scoring design fidelity.
//!
//! This module provides a unified interface for computing:
//! - Text-segment coverage (design text nodes vs. captured text)
//! - Image-fill coverage (declared asset refs vs. resolved fills)
//! - Variable-resolution coverage
//! - Image similarity (global or windowed SSIM, PSNR, MSE)

// Submodules
mod coverage;
mod runner;
mod similarity;
mod thresholds;


// Re-exports
pub use coverage::{
    image_fill_coverage, text_segment_coverage, variable_coverage, ImageFillCoverage,
    TextSegmentCoverage, VariableCoverage,
};
pub use runner::{default_metrics, metrics_with, run_metrics, Metric, MetricKind, MetricResult};
pub use similarity::{score, ImageSimilarity, SsimMode, SSIM_C1, SSIM_C2};
pub use thresholds::{check_thresholds, ThresholdFailure};
