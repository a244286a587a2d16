use clap::{Parser, Subcommand, ValueEnum};
use fidelity_lib::SsimMode;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "fidelity")]
#[command(
    version,
    about = "Fidelity evaluator - Score how faithfully a design was reproduced",
    long_about = "Fidelity evaluator\n\nModes:\n- evaluate: coverage of text segments, image fills, and variables from a node bundle, plus optional image similarity and a fidelity-loop summary, checked against thresholds.\n- similarity: standalone SSIM/PSNR/MSE between two rendered images.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with [thresholds] and [similarity] defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a node bundle, rendered images, and/or a fidelity-loop result
    Evaluate {
        #[arg(
            long,
            value_name = "FILE",
            help = "Node bundle JSON (dsl_json, plugin_snapshot, image_fills, variables)"
        )]
        bundle: Option<PathBuf>,

        #[arg(
            long,
            value_name = "FILE",
            requires = "impl_image",
            help = "Reference rendering for image similarity"
        )]
        ref_image: Option<PathBuf>,

        #[arg(
            long,
            value_name = "FILE",
            requires = "ref_image",
            help = "Implementation rendering for image similarity"
        )]
        impl_image: Option<PathBuf>,

        #[arg(
            long,
            value_name = "FILE",
            help = "Fidelity-loop result JSON (target_score, best_score, achieved, attempts, best)"
        )]
        loop_result: Option<PathBuf>,

        #[arg(long, help = "Minimum best score of the fidelity loop")]
        target_score: Option<f64>,

        #[arg(long, help = "Minimum SSIM between the two renderings")]
        target_ssim: Option<f64>,

        #[arg(long, value_name = "RATIO", help = "Minimum text-segment coverage ratio")]
        min_text_segments: Option<f64>,

        #[arg(long, value_name = "RATIO", help = "Minimum image-fill coverage ratio")]
        min_image_fills: Option<f64>,

        #[arg(long, value_name = "RATIO", help = "Minimum variable coverage ratio")]
        min_variables: Option<f64>,

        #[arg(
            long,
            value_name = "MODE",
            value_parser = parse_ssim_mode,
            help = "SSIM estimate (global or windowed)"
        )]
        ssim_mode: Option<SsimMode>,

        #[arg(long, value_name = "PX", help = "Window size for windowed SSIM")]
        window_size: Option<usize>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Compare two rendered images (SSIM, PSNR, MSE)
    Similarity {
        #[arg(long, value_name = "FILE", help = "Reference image")]
        r#ref: PathBuf,

        #[arg(long, value_name = "FILE", help = "Implementation image")]
        r#impl: PathBuf,

        #[arg(
            long,
            value_name = "MODE",
            value_parser = parse_ssim_mode,
            help = "SSIM estimate (global or windowed)"
        )]
        ssim_mode: Option<SsimMode>,

        #[arg(long, value_name = "PX", help = "Window size for windowed SSIM")]
        window_size: Option<usize>,

        #[arg(long, help = "Fail (exit 1) when SSIM is below this value")]
        target_ssim: Option<f64>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

fn parse_ssim_mode(raw: &str) -> Result<SsimMode, String> {
    SsimMode::from_str(raw).map_err(|_| format!("expected `global` or `windowed`, got `{raw}`"))
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use fidelity_lib::SsimMode;
    use clap::Parser;

    #[test]
    fn evaluate_command_uses_defaults() {
        let cli = Cli::parse_from(["fidelity", "evaluate", "--bundle", "bundle.json"]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Evaluate {
                bundle,
                ref_image,
                impl_image,
                loop_result,
                target_score,
                target_ssim,
                ssim_mode,
                window_size,
                format,
                output,
                ..
            } => {
                assert_eq!(bundle.as_deref(), Some(std::path::Path::new("bundle.json")));
                assert!(ref_image.is_none());
                assert!(impl_image.is_none());
                assert!(loop_result.is_none());
                assert!(target_score.is_none(), "thresholds default from config");
                assert!(target_ssim.is_none());
                assert!(ssim_mode.is_none());
                assert!(window_size.is_none());
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected evaluate command"),
        }
    }

    #[test]
    fn evaluate_command_respects_overrides() {
        let cli = Cli::parse_from([
            "fidelity",
            "evaluate",
            "--ref-image",
            "ref.png",
            "--impl-image",
            "impl.png",
            "--loop-result",
            "loop.json",
            "--target-score",
            "0.9",
            "--target-ssim",
            "0.8",
            "--min-text-segments",
            "1.0",
            "--min-image-fills",
            "0.5",
            "--min-variables",
            "0.25",
            "--ssim-mode",
            "windowed",
            "--window-size",
            "7",
            "--format",
            "pretty",
            "-o",
            "report.json",
            "--config",
            "fidelity.toml",
        ]);

        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("fidelity.toml"))
        );
        match cli.command {
            Commands::Evaluate {
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
                ..
            } => {
                assert_eq!(ref_image.as_deref(), Some(std::path::Path::new("ref.png")));
                assert_eq!(impl_image.as_deref(), Some(std::path::Path::new("impl.png")));
                assert_eq!(loop_result.as_deref(), Some(std::path::Path::new("loop.json")));
                assert_eq!(target_score, Some(0.9));
                assert_eq!(target_ssim, Some(0.8));
                assert_eq!(min_text_segments, Some(1.0));
                assert_eq!(min_image_fills, Some(0.5));
                assert_eq!(min_variables, Some(0.25));
                assert_eq!(ssim_mode, Some(SsimMode::Windowed));
                assert_eq!(window_size, Some(7));
                assert!(matches!(format, OutputFormat::Pretty));
                assert_eq!(output.as_deref(), Some(std::path::Path::new("report.json")));
            }
            _ => panic!("expected evaluate command with overrides"),
        }
    }

    #[test]
    fn ssim_mode_is_case_insensitive_and_rejects_unknown_modes() {
        let cli = Cli::parse_from([
            "fidelity",
            "similarity",
            "--ref",
            "a.png",
            "--impl",
            "b.png",
            "--ssim-mode",
            "Windowed",
        ]);
        match cli.command {
            Commands::Similarity { ssim_mode, .. } => {
                assert_eq!(ssim_mode, Some(SsimMode::Windowed));
            }
            _ => panic!("expected similarity command"),
        }

        let result = Cli::try_parse_from([
            "fidelity",
            "evaluate",
            "--bundle",
            "bundle.json",
            "--ssim-mode",
            "pyramid",
        ]);
        assert!(result.is_err(), "unknown SSIM mode should be rejected");
    }

    #[test]
    fn evaluate_requires_both_images() {
        let result = Cli::try_parse_from(["fidelity", "evaluate", "--ref-image", "ref.png"]);
        assert!(result.is_err(), "--ref-image without --impl-image should be rejected");
    }

    #[test]
    fn similarity_command_sets_verbose() {
        let cli = Cli::parse_from([
            "fidelity",
            "--verbose",
            "similarity",
            "--ref",
            "a.png",
            "--impl",
            "b.png",
        ]);

        assert!(cli.verbose);

        match cli.command {
            Commands::Similarity {
                r#ref,
                r#impl,
                ssim_mode,
                target_ssim,
                format,
                output,
                ..
            } => {
                assert_eq!(r#ref, std::path::PathBuf::from("a.png"));
                assert_eq!(r#impl, std::path::PathBuf::from("b.png"));
                assert!(ssim_mode.is_none());
                assert!(target_ssim.is_none());
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected similarity command"),
        }
    }
}
