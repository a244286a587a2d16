use std::path::Path;

use fidelity_lib::{Config, FidelityError, SsimMode};

/// Flag values that take precedence over the config file when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub target_score: Option<f64>,
    pub target_ssim: Option<f64>,
    pub min_text_segments: Option<f64>,
    pub min_image_fills: Option<f64>,
    pub min_variables: Option<f64>,
    pub ssim_mode: Option<SsimMode>,
    pub window_size: Option<usize>,
}

/// Merge CLI flags into `config`, preferring flags that were passed.
pub fn resolve_config(mut config: Config, overrides: &ConfigOverrides) -> Config {
    let t = &mut config.thresholds;
    if overrides.target_score.is_some() {
        t.target_score = overrides.target_score;
    }
    if overrides.target_ssim.is_some() {
        t.target_ssim = overrides.target_ssim;
    }
    if overrides.min_text_segments.is_some() {
        t.min_text_segments = overrides.min_text_segments;
    }
    if overrides.min_image_fills.is_some() {
        t.min_image_fills = overrides.min_image_fills;
    }
    if overrides.min_variables.is_some() {
        t.min_variables = overrides.min_variables;
    }

    let s = &mut config.similarity;
    if let Some(mode) = overrides.ssim_mode {
        s.mode = mode;
    }
    if let Some(window_size) = overrides.window_size {
        s.window_size = window_size;
    }
    config
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/fidelity/config.toml > defaults
///
/// The result is not validated here; callers validate after merging flags.
pub fn load_config(path: Option<&Path>) -> Result<Config, FidelityError> {
    Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        FidelityError::Config(format!("Failed to read config {}: {}", loc, e))
    })
}

/// Validate a config after flags were merged in.
pub fn validate(cfg: &Config, path: Option<&Path>) -> Result<(), FidelityError> {
    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        FidelityError::Config(prefix)
    })
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let gate = |value: Option<f64>| {
        value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string())
    };
    let t = &config.thresholds;
    let s = &config.similarity;
    format!(
        "Effective config [{source}]: target_score={}, target_ssim={}, min_text_segments={}, min_image_fills={}, min_variables={}, ssim={} (window {}, identical psnr {})",
        gate(t.target_score),
        gate(t.target_ssim),
        gate(t.min_text_segments),
        gate(t.min_image_fills),
        gate(t.min_variables),
        s.mode,
        s.window_size,
        s.identical_psnr
    )
}
