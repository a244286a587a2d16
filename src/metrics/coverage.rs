use tracing::warn;

use crate::bundle::EvaluationInputs;
use crate::types::{
    CapturedNode, CapturedTree, CoverageRatio, DesignNode, DesignTree, ImageFillMap,
    VariableBundle,
};
use crate::Result;

use super::{Metric, MetricKind, MetricResult};

/// Text nodes in the design against captured nodes carrying text segments.
///
/// The two trees are aligned by count only, never by node identity, so
/// structural drift between them does not matter.
pub fn text_segment_coverage(design: &DesignTree, captured: Option<&CapturedTree>) -> CoverageRatio {
    let total = design.count(&DesignNode::is_text);
    let matched = captured
        .map(|tree| tree.count(&CapturedNode::has_segments))
        .unwrap_or(0);
    CoverageRatio::new(total, matched)
}

/// Declared asset references against the ones the fill map resolves.
pub fn image_fill_coverage(asset_refs: &[String], fills: &ImageFillMap) -> CoverageRatio {
    let matched = asset_refs.iter().filter(|r| fills.resolves(r)).count();
    CoverageRatio::new(asset_refs.len(), matched)
}

/// Known variables against resolved ones. A failed bundle reports one
/// expected, none matched, and carries the failure message.
pub fn variable_coverage(bundle: &VariableBundle) -> CoverageRatio {
    match bundle {
        VariableBundle::Failed { message } => CoverageRatio::failed(message.clone()),
        VariableBundle::Resolved { raw, resolved } => CoverageRatio::new(raw.len(), resolved.len()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSegmentCoverage;

impl Metric for TextSegmentCoverage {
    fn kind(&self) -> MetricKind {
        MetricKind::TextSegments
    }

    fn is_available(&self, inputs: &EvaluationInputs) -> bool {
        inputs.design.is_some()
    }

    fn compute(&self, inputs: &EvaluationInputs) -> Result<MetricResult> {
        let ratio = match &inputs.design {
            Some(design) => {
                let captured = inputs.capture.as_ref().and_then(|c| c.payload.as_ref());
                text_segment_coverage(design, captured)
            }
            None => CoverageRatio::new(0, 0),
        };
        Ok(MetricResult::Coverage(self.kind(), ratio))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFillCoverage;

impl Metric for ImageFillCoverage {
    fn kind(&self) -> MetricKind {
        MetricKind::ImageFills
    }

    fn is_available(&self, inputs: &EvaluationInputs) -> bool {
        inputs.design.is_some() && inputs.image_fills.is_some()
    }

    fn compute(&self, inputs: &EvaluationInputs) -> Result<MetricResult> {
        let refs: &[String] = inputs
            .design
            .as_ref()
            .and_then(|d| d.root())
            .map(|root| root.asset_refs.as_slice())
            .unwrap_or(&[]);
        let empty = ImageFillMap::new();
        let fills = inputs.image_fills.as_ref().unwrap_or(&empty);
        Ok(MetricResult::Coverage(
            self.kind(),
            image_fill_coverage(refs, fills),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariableCoverage;

impl Metric for VariableCoverage {
    fn kind(&self) -> MetricKind {
        MetricKind::Variables
    }

    fn is_available(&self, inputs: &EvaluationInputs) -> bool {
        inputs.variables.is_some()
    }

    fn compute(&self, inputs: &EvaluationInputs) -> Result<MetricResult> {
        let ratio = match &inputs.variables {
            Some(bundle) => variable_coverage(bundle),
            None => CoverageRatio::new(0, 0),
        };
        if let Some(message) = &ratio.error {
            warn!(error = %message, "variable resolution failed");
        }
        Ok(MetricResult::Coverage(self.kind(), ratio))
    }
}
