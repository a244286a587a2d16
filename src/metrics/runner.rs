use crate::bundle::EvaluationInputs;
use crate::config::SimilarityConfig;
use crate::error::FidelityError;
use crate::types::{CoverageRatio, MetricScores, SimilarityResult};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::{ImageFillCoverage, ImageSimilarity, TextSegmentCoverage, VariableCoverage};

/// The kind of metric being computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TextSegments,
    ImageFills,
    Variables,
    Similarity,
}

impl MetricKind {
    pub const fn all() -> [MetricKind; 4] {
        [
            MetricKind::TextSegments,
            MetricKind::ImageFills,
            MetricKind::Variables,
            MetricKind::Similarity,
        ]
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MetricKind::TextSegments => "text_segments",
                MetricKind::ImageFills => "image_fills",
                MetricKind::Variables => "variables",
                MetricKind::Similarity => "similarity",
            }
        )
    }
}

impl FromStr for MetricKind {
    type Err = FidelityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "text_segments" | "text" => Ok(MetricKind::TextSegments),
            "image_fills" | "fills" => Ok(MetricKind::ImageFills),
            "variables" => Ok(MetricKind::Variables),
            "similarity" | "ssim" => Ok(MetricKind::Similarity),
            _ => Err(FidelityError::Config(format!("Unknown metric kind: {}", s))),
        }
    }
}

/// Output of a single metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricResult {
    Coverage(MetricKind, CoverageRatio),
    Similarity(SimilarityResult),
}

impl MetricResult {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricResult::Coverage(kind, _) => *kind,
            MetricResult::Similarity(_) => MetricKind::Similarity,
        }
    }
}

/// A fidelity metric over evaluation inputs.
pub trait Metric {
    fn kind(&self) -> MetricKind;
    /// Whether the inputs this metric needs were supplied.
    fn is_available(&self, inputs: &EvaluationInputs) -> bool;
    fn compute(&self, inputs: &EvaluationInputs) -> Result<MetricResult>;
}

/// Returns the default set of all metrics.
pub fn default_metrics() -> Vec<Box<dyn Metric>> {
    metrics_with(&SimilarityConfig::default())
}

/// All metrics, with the image scorer configured from `similarity`.
pub fn metrics_with(similarity: &SimilarityConfig) -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(TextSegmentCoverage),
        Box::new(ImageFillCoverage),
        Box::new(VariableCoverage),
        Box::new(ImageSimilarity::from(similarity)),
    ]
}

/// Run the selected metrics (all when `selected` is empty) whose inputs are
/// present. Metrics without inputs are skipped, not failed.
pub fn run_metrics(
    metrics: &[Box<dyn Metric>],
    selected: &[MetricKind],
    inputs: &EvaluationInputs,
) -> Result<MetricScores> {
    let desired: Vec<MetricKind> = if selected.is_empty() {
        MetricKind::all().to_vec()
    } else {
        selected.to_vec()
    };

    let missing: Vec<MetricKind> = desired
        .iter()
        .copied()
        .filter(|kind| !metrics.iter().any(|m| m.kind() == *kind))
        .collect();

    if !missing.is_empty() {
        let names = missing
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(FidelityError::Config(format!(
            "Requested metrics not available: {}",
            names
        )));
    }

    let mut scores = MetricScores::default();

    for metric in metrics {
        let kind = metric.kind();
        if !desired.contains(&kind) {
            continue;
        }
        if !metric.is_available(inputs) {
            debug!(metric = %kind, "skipping metric; inputs not supplied");
            continue;
        }

        match metric.compute(inputs)? {
            MetricResult::Coverage(kind, ratio) => {
                debug!(
                    metric = %kind,
                    total = ratio.total,
                    matched = ratio.matched,
                    missing = ratio.missing,
                    "coverage computed"
                );
                scores.coverages.insert(kind, ratio);
            }
            MetricResult::Similarity(result) => {
                debug!(
                    ssim = result.ssim,
                    psnr = result.psnr,
                    mse = result.mse,
                    "similarity computed"
                );
                scores.similarity = Some(result);
            }
        }
    }

    Ok(scores)
}
