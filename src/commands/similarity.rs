use std::path::PathBuf;
use std::process::ExitCode;

use tracing::debug;

use fidelity_lib::output::FIDELITY_OUTPUT_VERSION;
use fidelity_lib::{
    load_pixel_matrix, FidelityError, FidelityOutput, ImageSimilarity, SimilarityOutput,
};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for, render_error, write_output};
use crate::settings::{
    format_effective_config, load_config, resolve_config, validate, ConfigOverrides,
};

/// Arguments of the similarity command.
pub struct SimilarityArgs {
    pub reference: PathBuf,
    pub candidate: PathBuf,
    pub overrides: ConfigOverrides,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Run the similarity command.
pub fn run_similarity(config_path: Option<PathBuf>, args: SimilarityArgs) -> ExitCode {
    let SimilarityArgs {
        reference,
        candidate,
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

    let result = load_pixel_matrix(&reference).and_then(|a| {
        let b = load_pixel_matrix(&candidate)?;
        ImageSimilarity::from(&config.similarity).compare(&a, &b)
    });
    let result = match result {
        Ok(result) => result,
        Err(err) => return render_error(err, format, output),
    };

    let target_ssim = config.thresholds.target_ssim;
    let passed = target_ssim.map(|target| result.ssim >= target);

    let body = FidelityOutput::Similarity(SimilarityOutput {
        version: FIDELITY_OUTPUT_VERSION.to_string(),
        ref_path: reference.display().to_string(),
        impl_path: candidate.display().to_string(),
        ssim_mode: config.similarity.mode,
        result: result.rounded(),
        target_ssim,
        passed,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(FidelityError::Unknown(err.to_string()), format, output);
    }
    exit_code_for(passed.unwrap_or(true))
}
