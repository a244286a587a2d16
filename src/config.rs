use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::SsimMode;
use crate::types::metric_results::IDENTICAL_PSNR;

/// Evaluation configuration, loadable from TOML.
///
/// ```toml
/// [thresholds]
/// target_score = 0.95
/// target_ssim = 0.9
/// min_text_segments = 1.0
///
/// [similarity]
/// mode = "windowed"
/// window_size = 11
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub thresholds: Thresholds,
    pub similarity: SimilarityConfig,
}

/// Pass/fail gates. Each is optional; an unset gate is never checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Minimum best score of the remote fidelity loop
    pub target_score: Option<f64>,
    /// Minimum SSIM between the two renderings
    pub target_ssim: Option<f64>,
    pub min_text_segments: Option<f64>,
    pub min_image_fills: Option<f64>,
    pub min_variables: Option<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            target_score: Some(0.95),
            target_ssim: None,
            min_text_segments: None,
            min_image_fills: None,
            min_variables: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityConfig {
    pub mode: SsimMode,
    pub window_size: usize,
    /// PSNR reported when the images are pixel-identical
    pub identical_psnr: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            mode: SsimMode::Global,
            window_size: 11,
            identical_psnr: IDENTICAL_PSNR,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load config. Priority: explicit path > central config > defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };
        match resolved {
            Some(p) => {
                let content = std::fs::read_to_string(&p).map_err(|source| ConfigError::Read {
                    path: p.clone(),
                    source,
                })?;
                Self::from_toml_str(&content)
            }
            None => Ok(Config::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// `$HOME/.config/fidelity/config.toml`
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("fidelity")
                    .join("config.toml")
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        let t = &self.thresholds;
        for (name, value) in [
            ("min_text_segments", t.min_text_segments),
            ("min_image_fills", t.min_image_fills),
            ("min_variables", t.min_variables),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("thresholds.{name} must be a non-negative number, got {v}"));
                }
            }
        }
        if let Some(v) = t.target_ssim {
            if !(-1.0..=1.0).contains(&v) {
                return Err(format!("thresholds.target_ssim must be within [-1, 1], got {v}"));
            }
        }
        if let Some(v) = t.target_score {
            if !v.is_finite() {
                return Err(format!("thresholds.target_score must be finite, got {v}"));
            }
        }

        let s = &self.similarity;
        if s.window_size < 2 {
            return Err(format!(
                "similarity.window_size must be at least 2, got {}",
                s.window_size
            ));
        }
        if !s.identical_psnr.is_finite() || s.identical_psnr <= 0.0 {
            return Err(format!(
                "similarity.identical_psnr must be a positive finite number, got {}",
                s.identical_psnr
            ));
        }
        Ok(())
    }
}
