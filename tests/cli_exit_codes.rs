use fidelity_lib::{FidelityOutput, MetricKind};
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_image(path: &Path, value: u8) {
    let img = GrayImage::from_pixel(4, 4, Luma([value]));
    img.save(path).expect("write image");
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fidelity"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("HOME", std::env::temp_dir().join("fidelity-test-home"))
        .output()
        .expect("run fidelity")
}

fn parse_stdout(output: &Output) -> FidelityOutput {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be a JSON payload")
}

const BUNDLE: &str = r#"{
  "dsl_json": {
    "meta": {"type": "FRAME"},
    "assets": {"image_refs": ["a", "b", "c"]},
    "children": [
      {"meta": {"type": "TEXT"}},
      {"meta": {"type": "TEXT"}},
      {"meta": {"type": "TEXT"}}
    ]
  },
  "plugin_snapshot": {
    "ok": true,
    "payload": {"children": [
      {"text": {"segments": [{"characters": "Title"}]}},
      {"text": {"segments": []}},
      {"text": {}}
    ]}
  },
  "image_fills": {"images": {"a": "<data>", "c": "<data>"}},
  "variables": {"error": "plugin timeout"}
}"#;

#[test]
fn evaluate_reports_bundle_coverages() {
    let dir = TempDir::new().expect("tempdir");
    let bundle = write_file(&dir, "bundle.json", BUNDLE);

    let output = run(&["evaluate", "--bundle", bundle.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "no gates configured besides the loop");

    match parse_stdout(&output) {
        FidelityOutput::Report(report) => {
            assert!(report.passed);
            assert_eq!(report.capture_ok, Some(true));
            let text = &report.coverages[&MetricKind::TextSegments];
            assert_eq!((text.total, text.matched, text.missing), (3, 2, 1));
            let fills = &report.coverages[&MetricKind::ImageFills];
            assert_eq!((fills.total, fills.matched, fills.missing), (3, 2, 1));
            let vars = &report.coverages[&MetricKind::Variables];
            assert_eq!((vars.total, vars.matched), (1, 0));
            assert_eq!(vars.error.as_deref(), Some("plugin timeout"));
            assert!(report.similarity.is_none());
        }
        other => panic!("expected report output, got {other:?}"),
    }
}

#[test]
fn evaluate_exit_code_fails_coverage_threshold() {
    let dir = TempDir::new().expect("tempdir");
    let bundle = write_file(&dir, "bundle.json", BUNDLE);

    let output = run(&[
        "evaluate",
        "--bundle",
        bundle.to_str().unwrap(),
        "--min-text-segments",
        "1.0",
    ]);
    assert_eq!(output.status.code(), Some(1));

    match parse_stdout(&output) {
        FidelityOutput::Report(report) => {
            assert!(!report.passed);
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].metric, "text_segments");
        }
        other => panic!("expected report output, got {other:?}"),
    }
}

#[test]
fn evaluate_exit_code_passes_for_matching_images() {
    let dir = TempDir::new().expect("tempdir");
    let ref_path = dir.path().join("ref.png");
    let impl_path = dir.path().join("impl.png");
    write_image(&ref_path, 128);
    write_image(&impl_path, 128);

    let output = run(&[
        "evaluate",
        "--ref-image",
        ref_path.to_str().unwrap(),
        "--impl-image",
        impl_path.to_str().unwrap(),
        "--target-ssim",
        "0.99",
    ]);
    assert_eq!(output.status.code(), Some(0));

    match parse_stdout(&output) {
        FidelityOutput::Report(report) => {
            let sim = report.similarity.expect("similarity");
            assert_eq!(sim.ssim, 1.0);
            assert_eq!(sim.mse, 0.0);
            assert_eq!(sim.psnr, 100.0);
        }
        other => panic!("expected report output, got {other:?}"),
    }
}

#[test]
fn evaluate_exit_code_fails_loop_target() {
    let dir = TempDir::new().expect("tempdir");
    let loop_result = write_file(
        &dir,
        "loop.json",
        r#"{"target_score": 0.95, "best_score": 0.91, "achieved": false, "attempts": [{}, {}, {}],
            "best": {"fidelity": {"ssim": 0.91}}}"#,
    );

    let output = run(&["evaluate", "--loop-result", loop_result.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    match parse_stdout(&output) {
        FidelityOutput::Report(report) => {
            let summary = report.fidelity_loop.expect("loop summary");
            assert_eq!(summary.attempts, Some(3));
            assert_eq!(report.failures[0].metric, "fidelity_loop");
        }
        other => panic!("expected report output, got {other:?}"),
    }

    let output = run(&[
        "evaluate",
        "--loop-result",
        loop_result.to_str().unwrap(),
        "--target-score",
        "0.9",
    ]);
    assert_eq!(output.status.code(), Some(0), "flag overrides default target");
}

#[test]
fn evaluate_without_inputs_is_a_fatal_error() {
    let output = run(&["evaluate"]);
    assert_eq!(output.status.code(), Some(2));

    match parse_stdout(&output) {
        FidelityOutput::Error(err) => {
            assert!(err.error.message.contains("Nothing to evaluate"));
            assert!(err
                .error
                .remediation
                .as_deref()
                .is_some_and(|r| r.contains("--bundle")));
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn missing_image_is_a_fatal_error() {
    let dir = TempDir::new().expect("tempdir");
    let ref_path = dir.path().join("ref.png");
    write_image(&ref_path, 10);

    let output = run(&[
        "evaluate",
        "--ref-image",
        ref_path.to_str().unwrap(),
        "--impl-image",
        dir.path().join("missing.png").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(matches!(parse_stdout(&output), FidelityOutput::Error(_)));
}

#[test]
fn config_file_sets_thresholds() {
    let dir = TempDir::new().expect("tempdir");
    let bundle = write_file(&dir, "bundle.json", BUNDLE);
    let cfg = write_file(
        &dir,
        "fidelity.toml",
        "[thresholds]\nmin_image_fills = 0.9\n",
    );

    let output = run(&[
        "evaluate",
        "--bundle",
        bundle.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn invalid_config_is_a_fatal_error() {
    let dir = TempDir::new().expect("tempdir");
    let bundle = write_file(&dir, "bundle.json", BUNDLE);
    let cfg = write_file(&dir, "fidelity.toml", "[thresholds]\ntarget_ssim = 3.0\n");

    let output = run(&[
        "evaluate",
        "--bundle",
        bundle.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn similarity_reports_darkened_image() {
    let dir = TempDir::new().expect("tempdir");
    let ref_path = dir.path().join("ref.png");
    let impl_path = dir.path().join("impl.png");
    write_image(&ref_path, 200);
    write_image(&impl_path, 150);

    let output = run(&[
        "similarity",
        "--ref",
        ref_path.to_str().unwrap(),
        "--impl",
        impl_path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0), "no target means no gate");

    match parse_stdout(&output) {
        FidelityOutput::Similarity(out) => {
            assert_eq!(out.result.mse, 2500.0);
            assert_eq!(out.result.psnr, 14.15);
            assert!(out.result.ssim < 1.0);
            assert!(out.passed.is_none());
        }
        other => panic!("expected similarity output, got {other:?}"),
    }

    let output = run(&[
        "similarity",
        "--ref",
        ref_path.to_str().unwrap(),
        "--impl",
        impl_path.to_str().unwrap(),
        "--target-ssim",
        "0.9999",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn pretty_format_writes_json_to_file() {
    let dir = TempDir::new().expect("tempdir");
    let ref_path = dir.path().join("ref.png");
    let impl_path = dir.path().join("impl.png");
    let out_path = dir.path().join("out.json");
    write_image(&ref_path, 30);
    write_image(&impl_path, 30);

    let output = run(&[
        "similarity",
        "--ref",
        ref_path.to_str().unwrap(),
        "--impl",
        impl_path.to_str().unwrap(),
        "--format",
        "pretty",
        "-o",
        out_path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));

    let written = std::fs::read_to_string(&out_path).expect("output file");
    let parsed: FidelityOutput = serde_json::from_str(&written).expect("pretty JSON in file");
    assert!(matches!(parsed, FidelityOutput::Similarity(_)));
}

#[test]
fn flag_overrides_invalid_config_value() {
    let dir = TempDir::new().expect("tempdir");
    let ref_path = dir.path().join("ref.png");
    let impl_path = dir.path().join("impl.png");
    write_image(&ref_path, 90);
    write_image(&impl_path, 90);
    let cfg = write_file(&dir, "fidelity.toml", "[similarity]\nwindow_size = 1\n");

    let base = [
        "similarity",
        "--ref",
        ref_path.to_str().unwrap(),
        "--impl",
        impl_path.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
    ];
    assert_eq!(run(&base).status.code(), Some(2));

    let mut with_flag = base.to_vec();
    with_flag.extend(["--window-size", "7"]);
    assert_eq!(run(&with_flag).status.code(), Some(0));
}
