//! Fidelity Evaluation Library
//!
//! Scores how faithfully an automated pipeline reproduced a design: how much
//! of the design's text, image fills, and variables survived into the
//! captured output, and how similar the rendered implementation looks to the
//! reference rendering.
//!
//! # Module Overview
//!
//! - [`bundle`] - Evaluation inputs read from a node bundle and loop results
//! - [`tree`] - Shape-tolerant node trees and recursive counting
//! - [`metrics`] - Coverage ratios and image similarity (SSIM, PSNR, MSE)
//! - [`report`] - Threshold checks and report synthesis
//! - [`image_loader`] - Decoding image files into luminance matrices
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use fidelity_lib::{evaluate, load_pixel_matrix, Config, EvaluationInputs};
//!
//! # fn example() -> fidelity_lib::Result<()> {
//! let bundle: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("bundle.json")?)?;
//! let inputs = EvaluationInputs::from_bundle(&bundle).with_images(
//!     load_pixel_matrix("reference.png")?,
//!     load_pixel_matrix("implementation.png")?,
//! );
//!
//! let report = evaluate(&inputs, &Config::default())?;
//! println!("passed: {}", report.passed);
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod image_loader;
pub mod metrics;
pub mod output;
pub mod report;
pub mod tree;
pub mod types;

pub use bundle::{EvaluationInputs, LoopSummary};
pub use config::{Config, SimilarityConfig, Thresholds};
pub use error::{ErrorCategory, ErrorPayload, FidelityError, Result};
pub use image_loader::{load_image, load_pixel_matrix};
// Metrics module re-exports
pub use metrics::{
    // Core traits and types
    check_thresholds, default_metrics, metrics_with, run_metrics, Metric, MetricKind,
    MetricResult, ThresholdFailure,
    // Pure scoring functions
    image_fill_coverage, score, text_segment_coverage, variable_coverage,
    // Concrete metric implementations (for custom configuration)
    ImageFillCoverage, ImageSimilarity, SsimMode, TextSegmentCoverage, VariableCoverage,
};
pub use output::{
    ErrorOutput, FidelityOutput, FidelityReport, SimilarityOutput, FIDELITY_OUTPUT_VERSION,
};
pub use report::{evaluate, evaluate_with, synthesize_report};
pub use tree::{FromShape, Tree};
pub use types::{
    CaptureSnapshot, CapturedTree, CoverageRatio, DesignTree, ImageFillMap, ImagePair,
    MetricScores, PixelMatrix, SimilarityResult, VariableBundle,
};
