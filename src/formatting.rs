use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fidelity_lib::output::FIDELITY_OUTPUT_VERSION;
use fidelity_lib::{CoverageRatio, ErrorOutput, FidelityError, FidelityOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &FidelityOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: FidelityError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = FidelityOutput::Error(ErrorOutput {
        version: FIDELITY_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Reserve exit code 2 for fatal/errors; threshold failures use 1.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(
    body: &FidelityOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &FidelityOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &FidelityOutput, colorize: bool) -> String {
    let status = |passed: bool| {
        color(
            if passed { "PASS" } else { "FAIL" },
            if passed { "32" } else { "31" },
            colorize,
        )
    };

    match body {
        FidelityOutput::Report(out) => {
            let mut buf = String::new();
            writeln!(buf, "{} Fidelity evaluation", status(out.passed)).ok();

            if !out.coverages.is_empty() {
                writeln!(buf, "Coverage:").ok();
                for (kind, ratio) in &out.coverages {
                    let styled = color(&format_ratio(ratio), ratio_color_code(ratio), colorize);
                    writeln!(buf, "- {:14} {}", kind.to_string(), styled).ok();
                }
            }
            if let Some(capture_ok) = out.capture_ok {
                writeln!(buf, "Capture: {}", if capture_ok { "ok" } else { "failed" }).ok();
            }
            if let Some(sim) = &out.similarity {
                writeln!(
                    buf,
                    "Similarity: ssim {:.6}, psnr {:.2} dB, mse {:.6}",
                    sim.ssim, sim.psnr, sim.mse
                )
                .ok();
            }
            if let Some(lp) = &out.fidelity_loop {
                let best = lp
                    .best_score
                    .map(|s| format!("{:.3}", s))
                    .unwrap_or_else(|| "-".to_string());
                let target = out
                    .target_score
                    .or(lp.target_score)
                    .map(|s| format!("{:.3}", s))
                    .unwrap_or_else(|| "-".to_string());
                let attempts = lp.attempts.unwrap_or(0);
                writeln!(
                    buf,
                    "Fidelity loop: best {best} (target {target}), {attempts} attempt(s)"
                )
                .ok();
            }
            if !out.failures.is_empty() {
                writeln!(buf, "Failures:").ok();
                for failure in &out.failures {
                    writeln!(
                        buf,
                        "- {} {:.3} < {:.3}",
                        failure.metric, failure.actual, failure.required
                    )
                    .ok();
                }
            }
            buf
        }
        FidelityOutput::Similarity(out) => {
            let mut buf = String::new();
            let header = match out.passed {
                Some(passed) => format!("{} Image similarity", status(passed)),
                None => format!("{} Image similarity", color("[SIMILARITY]", "36", colorize)),
            };
            writeln!(buf, "{header}").ok();
            writeln!(buf, "Ref:  {}", out.ref_path).ok();
            writeln!(buf, "Impl: {}", out.impl_path).ok();
            writeln!(buf, "SSIM ({}): {:.6}", out.ssim_mode, out.result.ssim).ok();
            writeln!(buf, "PSNR: {:.2} dB", out.result.psnr).ok();
            writeln!(buf, "MSE:  {:.6}", out.result.mse).ok();
            if let Some(target) = out.target_ssim {
                writeln!(buf, "Target SSIM: {:.3}", target).ok();
            }
            buf
        }
        FidelityOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn format_ratio(ratio: &CoverageRatio) -> String {
    let mut text = format!(
        "{}/{} ({:.1}%)",
        ratio.matched,
        ratio.total,
        ratio.ratio() * 100.0
    );
    if let Some(err) = &ratio.error {
        write!(text, " error: {err}").ok();
    }
    text
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Map coverage to ANSI color code.
fn ratio_color_code(ratio: &CoverageRatio) -> &'static str {
    if ratio.is_failed() {
        return "31";
    }
    let r = ratio.ratio();
    if r >= 1.0 {
        "32" // green
    } else if r >= 0.75 {
        "33" // yellow
    } else {
        "31" // red
    }
}

/// Exit code for a completed evaluation.
pub fn exit_code_for(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
