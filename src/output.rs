use crate::bundle::LoopSummary;
use crate::error::ErrorPayload;
use crate::metrics::{MetricKind, SsimMode, ThresholdFailure};
use crate::types::{CoverageRatio, SimilarityResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version for output payloads.
pub const FIDELITY_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FidelityOutput {
    Report(FidelityReport),
    Similarity(SimilarityOutput),
    Error(ErrorOutput),
}

/// The aggregated, threshold-evaluated result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FidelityReport {
    pub version: String,
    /// UTC, RFC 3339 with second precision
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_score: Option<f64>,
    pub passed: bool,
    #[serde(default)]
    pub coverages: BTreeMap<MetricKind, CoverageRatio>,
    /// Whether the content-capture step reported success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity_loop: Option<LoopSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ThresholdFailure>,
}

/// Standalone image comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityOutput {
    pub version: String,
    #[serde(rename = "ref")]
    pub ref_path: String,
    #[serde(rename = "impl")]
    pub impl_path: String,
    pub ssim_mode: SsimMode,
    #[serde(flatten)]
    pub result: SimilarityResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ssim: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
