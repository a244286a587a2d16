use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, info};

use fidelity_lib::{evaluate, FidelityError, FidelityOutput};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for, render_error, write_output};
use crate::pipeline::{load_inputs, InputPaths};
use crate::settings::{
    format_effective_config, load_config, resolve_config, validate, ConfigOverrides,
};

/// Arguments of the evaluate command.
pub struct EvaluateArgs {
    pub inputs: InputPaths,
    pub overrides: ConfigOverrides,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Run the evaluate command.
pub fn run_evaluate(config_path: Option<PathBuf>, args: EvaluateArgs) -> ExitCode {
    let EvaluateArgs {
        inputs,
        overrides,
        format,
        output,
    } = args;

    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => resolve_config(cfg, &overrides),
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = validate(&config, config_path.as_deref()) {
        return render_error(err, format, output);
    }
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let inputs = match load_inputs(&inputs) {
        Ok(inputs) => inputs,
        Err(err) => return render_error(err, format, output),
    };

    let report = match evaluate(&inputs, &config) {
        Ok(report) => report,
        Err(err) => return render_error(err, format, output),
    };
    info!(
        passed = report.passed,
        metrics = report.coverages.len() + usize::from(report.similarity.is_some()),
        "evaluation complete"
    );

    let passed = report.passed;
    let body = FidelityOutput::Report(report);
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(FidelityError::Unknown(err.to_string()), format, output);
    }
    exit_code_for(passed)
}
