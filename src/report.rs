//! Fidelity report synthesis: run the metrics whose inputs are present,
//! apply the configured gates, and assemble one [`FidelityReport`].

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::bundle::EvaluationInputs;
use crate::config::{Config, Thresholds};
use crate::metrics::{check_thresholds, metrics_with, run_metrics, Metric, MetricKind};
use crate::output::{FidelityReport, FIDELITY_OUTPUT_VERSION};
use crate::types::MetricScores;
use crate::Result;

/// Evaluate `inputs` with every metric configured by `config`.
pub fn evaluate(inputs: &EvaluationInputs, config: &Config) -> Result<FidelityReport> {
    let metrics = metrics_with(&config.similarity);
    evaluate_with(&metrics, &[], inputs, &config.thresholds)
}

/// Evaluate `inputs` with an explicit metric set and selection.
pub fn evaluate_with(
    metrics: &[Box<dyn Metric>],
    selected: &[MetricKind],
    inputs: &EvaluationInputs,
    thresholds: &Thresholds,
) -> Result<FidelityReport> {
    let scores = run_metrics(metrics, selected, inputs)?;
    Ok(synthesize_report(scores, inputs, thresholds))
}

/// Merge computed scores into a report stamped with the current time.
pub fn synthesize_report(
    scores: MetricScores,
    inputs: &EvaluationInputs,
    thresholds: &Thresholds,
) -> FidelityReport {
    let failures = check_thresholds(&scores, inputs.fidelity_loop.as_ref(), thresholds);
    for failure in &failures {
        debug!(
            metric = %failure.metric,
            actual = failure.actual,
            required = failure.required,
            "threshold not met"
        );
    }
    let passed = failures.is_empty();
    info!(passed, failures = failures.len(), "fidelity report assembled");

    let capture_ok = scores
        .coverages
        .contains_key(&MetricKind::TextSegments)
        .then(|| inputs.capture.as_ref().map(|c| c.ok).unwrap_or(false));

    FidelityReport {
        version: FIDELITY_OUTPUT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        target_score: thresholds.target_score,
        passed,
        coverages: scores.coverages,
        capture_ok,
        similarity: scores.similarity.map(|s| s.rounded()),
        fidelity_loop: inputs.fidelity_loop.clone(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::LoopSummary;
    use crate::types::PixelMatrix;
    use serde_json::json;

    #[test]
    fn empty_inputs_pass_with_no_metrics() {
        let report = evaluate(&EvaluationInputs::default(), &Config::default()).unwrap();
        assert!(report.passed);
        assert!(report.coverages.is_empty());
        assert!(report.similarity.is_none());
        assert!(report.capture_ok.is_none());
        assert_eq!(report.target_score, Some(0.95));
        assert!(report.generated_at.ends_with('Z'));
    }

    #[test]
    fn absent_metrics_do_not_fail_the_gate() {
        let mut config = Config::default();
        config.thresholds.min_variables = Some(1.0);
        config.thresholds.target_ssim = Some(0.99);

        let inputs = EvaluationInputs::from_bundle(&json!({
            "dsl_json": {"meta": {"type": "TEXT"}},
            "plugin_snapshot": {"ok": true, "payload": {"text": {"segments": []}}}
        }));
        let report = evaluate(&inputs, &config).unwrap();

        assert!(report.passed, "unsupplied metrics are excluded: {:?}", report.failures);
        assert!(report.coverage_is(MetricKind::TextSegments, 1, 1));
        assert_eq!(report.capture_ok, Some(true));
    }

    #[test]
    fn failing_ratio_is_listed() {
        let mut config = Config::default();
        config.thresholds.min_variables = Some(0.5);

        let inputs = EvaluationInputs::from_bundle(&json!({"variables": {"error": "plugin timeout"}}));
        let report = evaluate(&inputs, &config).unwrap();

        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].metric, "variables");
        assert_eq!(report.failures[0].actual, 0.0);
    }

    #[test]
    fn similarity_gate_uses_target_ssim() {
        let a = PixelMatrix::from_rows(&[vec![0.0, 255.0], vec![255.0, 0.0]]).unwrap();
        let b = PixelMatrix::from_rows(&[vec![255.0, 0.0], vec![0.0, 255.0]]).unwrap();
        let inputs = EvaluationInputs::default().with_images(a, b);

        let mut config = Config::default();
        config.thresholds.target_ssim = Some(0.9);
        let report = evaluate(&inputs, &config).unwrap();

        assert!(!report.passed);
        assert_eq!(report.failures[0].metric, "ssim");
        assert!(report.similarity.is_some_and(|s| s.ssim < 0.0));
    }

    #[test]
    fn loop_best_score_is_gated_by_target_score() {
        let below = EvaluationInputs::default().with_fidelity_loop(LoopSummary {
            best_score: Some(0.9),
            ..Default::default()
        });
        let report = evaluate(&below, &Config::default()).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].metric, "fidelity_loop");

        let above = EvaluationInputs::default().with_fidelity_loop(LoopSummary {
            best_score: Some(0.97),
            ..Default::default()
        });
        assert!(evaluate(&above, &Config::default()).unwrap().passed);
    }

    impl FidelityReport {
        fn coverage_is(&self, kind: MetricKind, total: usize, matched: usize) -> bool {
            self.coverages
                .get(&kind)
                .is_some_and(|c| c.total == total && c.matched == matched)
        }
    }
}
