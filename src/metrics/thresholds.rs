use serde::{Deserialize, Serialize};

use crate::bundle::LoopSummary;
use crate::config::Thresholds;
use crate::types::MetricScores;

use super::MetricKind;

/// A gate that a computed value did not meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdFailure {
    pub metric: String,
    pub actual: f64,
    pub required: f64,
}

impl ThresholdFailure {
    fn new(metric: impl Into<String>, actual: f64, required: f64) -> Self {
        Self {
            metric: metric.into(),
            actual,
            required,
        }
    }
}

/// Check every computed metric that has a configured threshold.
///
/// Metrics that were not computed, or have no threshold, are ignored; an
/// empty result means the evaluation passed.
pub fn check_thresholds(
    scores: &MetricScores,
    fidelity_loop: Option<&LoopSummary>,
    thresholds: &Thresholds,
) -> Vec<ThresholdFailure> {
    let mut failures = Vec::new();

    for (kind, ratio) in &scores.coverages {
        if let Some(min) = thresholds.minimum_for(*kind) {
            let actual = ratio.ratio();
            if actual < min {
                failures.push(ThresholdFailure::new(kind.to_string(), actual, min));
            }
        }
    }

    if let (Some(similarity), Some(target)) = (&scores.similarity, thresholds.target_ssim) {
        if similarity.ssim < target {
            failures.push(ThresholdFailure::new("ssim", similarity.ssim, target));
        }
    }

    if let (Some(best), Some(target)) = (
        fidelity_loop.and_then(|l| l.best_score),
        thresholds.target_score,
    ) {
        if best < target {
            failures.push(ThresholdFailure::new("fidelity_loop", best, target));
        }
    }

    failures
}

impl Thresholds {
    /// Minimum coverage ratio configured for a coverage metric.
    pub fn minimum_for(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::TextSegments => self.min_text_segments,
            MetricKind::ImageFills => self.min_image_fills,
            MetricKind::Variables => self.min_variables,
            MetricKind::Similarity => None,
        }
    }
}
