mod cli;
mod commands;
mod formatting;
mod pipeline;
mod settings;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cli::Commands;
use commands::{run_evaluate, run_similarity, EvaluateArgs, SimilarityArgs};
use pipeline::InputPaths;
use settings::ConfigOverrides;

fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Evaluate {
            bundle,
            ref_image,
            impl_image,
            loop_result,
            target_score,
            target_ssim,
            min_text_segments,
            min_image_fills,
            min_variables,
            ssim_mode,
            window_size,
            format,
            output,
        } => run_evaluate(
            args.config,
            EvaluateArgs {
                inputs: InputPaths {
                    bundle,
                    ref_image,
                    impl_image,
                    loop_result,
                },
                overrides: ConfigOverrides {
                    target_score,
                    target_ssim,
                    min_text_segments,
                    min_image_fills,
                    min_variables,
                    ssim_mode,
                    window_size,
                },
                format,
                output,
            },
        ),
        Commands::Similarity {
            r#ref,
            r#impl,
            ssim_mode,
            window_size,
            target_ssim,
            format,
            output,
        } => run_similarity(
            args.config,
            SimilarityArgs {
                reference: r#ref,
                candidate: r#impl,
                overrides: ConfigOverrides {
                    target_ssim,
                    ssim_mode,
                    window_size,
                    ..Default::default()
                },
                format,
                output,
            },
        ),
    }
}

/// Logs go to stderr so stdout stays a clean JSON payload. `RUST_LOG`
/// takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "fidelity=debug,fidelity_lib=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
