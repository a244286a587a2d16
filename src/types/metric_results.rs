//! Metric result types for fidelity output.
//!
//! - [`CoverageRatio`] - completeness of one extraction step
//! - [`SimilarityResult`] - SSIM/PSNR/MSE between two renderings
//! - [`MetricScores`] - everything one evaluation computed

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::MetricKind;

/// PSNR reported for pixel-identical images.
pub const IDENTICAL_PSNR: f64 = 100.0;

// ============================================================================
// Coverage
// ============================================================================

/// How many of `total` expected items an extraction step actually produced.
///
/// `matched` is not clamped to `total`: over-reporting captures are kept as
/// reported and only `missing` floors at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRatio {
    pub total: usize,
    pub matched: usize,
    pub missing: usize,
    /// Set when the step failed outright rather than producing zero items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CoverageRatio {
    pub fn new(total: usize, matched: usize) -> Self {
        Self {
            total,
            matched,
            missing: total.saturating_sub(matched),
            error: None,
        }
    }

    /// A step that failed entirely: one expected item, none matched.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(1, 0)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// `matched / total`, or `1.0` when nothing was expected. Can exceed 1.0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }
}

// ============================================================================
// Image similarity
// ============================================================================

/// Result of comparing two luminance renderings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    /// Structural similarity in (-1, 1]
    pub ssim: f64,
    /// Peak signal-to-noise ratio in dB; a finite sentinel for identical images
    pub psnr: f64,
    /// Mean squared error over the compared region
    pub mse: f64,
}

impl SimilarityResult {
    pub fn is_identical(&self) -> bool {
        self.mse == 0.0
    }

    /// Values as emitted in reports: ssim/mse to 6 places, psnr to 2.
    pub fn rounded(&self) -> Self {
        Self {
            ssim: round_to(self.ssim, 6),
            psnr: round_to(self.psnr, 2),
            mse: round_to(self.mse, 6),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// Aggregate
// ============================================================================

/// Container for all computed metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScores {
    #[serde(default)]
    pub coverages: BTreeMap<MetricKind, CoverageRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityResult>,
}

impl MetricScores {
    pub fn is_empty(&self) -> bool {
        self.coverages.is_empty() && self.similarity.is_none()
    }

    pub fn coverage(&self, kind: MetricKind) -> Option<&CoverageRatio> {
        self.coverages.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_floors_at_zero() {
        let over = CoverageRatio::new(2, 5);
        assert_eq!(over.missing, 0);
        assert_eq!(over.matched, 5, "matched is not clamped");
        assert!(over.ratio() > 1.0);

        let under = CoverageRatio::new(3, 1);
        assert_eq!(under.missing, 2);
    }

    #[test]
    fn empty_coverage_is_vacuously_complete() {
        let empty = CoverageRatio::new(0, 0);
        assert_eq!(empty.ratio(), 1.0);
        assert_eq!(empty.missing, 0);
    }

    #[test]
    fn failed_coverage_has_one_missing() {
        let failed = CoverageRatio::failed("plugin timeout");
        assert_eq!((failed.total, failed.matched, failed.missing), (1, 0, 1));
        assert_eq!(failed.ratio(), 0.0);
        assert!(failed.is_failed());
    }

    #[test]
    fn coverage_serializes_error_only_when_present() {
        let ok = serde_json::to_string(&CoverageRatio::new(3, 2)).unwrap();
        assert_eq!(ok, r#"{"total":3,"matched":2,"missing":1}"#);

        let failed = serde_json::to_string(&CoverageRatio::failed("boom")).unwrap();
        assert!(failed.contains(r#""error":"boom""#));
    }

    #[test]
    fn rounding_matches_report_precision() {
        let result = SimilarityResult {
            ssim: 0.123_456_789,
            psnr: 14.150_514,
            mse: 2500.000_000_4,
        };
        let rounded = result.rounded();
        assert_eq!(rounded.ssim, 0.123457);
        assert_eq!(rounded.psnr, 14.15);
        assert_eq!(rounded.mse, 2500.0);
    }

    #[test]
    fn scores_serialize_coverage_keys_as_metric_names() {
        let mut scores = MetricScores::default();
        scores
            .coverages
            .insert(MetricKind::ImageFills, CoverageRatio::new(3, 2));
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.contains(r#""image_fills":{"total":3"#), "got {json}");
    }
}
