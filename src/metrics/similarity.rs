use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bundle::EvaluationInputs;
use crate::config::SimilarityConfig;
use crate::error::FidelityError;
use crate::types::metric_results::IDENTICAL_PSNR;
use crate::types::{PixelMatrix, SimilarityResult};
use crate::Result;

use super::{Metric, MetricKind, MetricResult};

/// SSIM luminance stabilizer, `(0.01 * 255)^2`.
pub const SSIM_C1: f64 = 6.5025;
/// SSIM contrast stabilizer, `(0.03 * 255)^2`.
pub const SSIM_C2: f64 = 58.5225;

const MAX_PIXEL: f64 = 255.0;
const GAUSSIAN_SIGMA: f64 = 1.5;

/// How SSIM is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SsimMode {
    /// One window spanning the whole compared region.
    #[default]
    Global,
    /// Mean over Gaussian-weighted square windows.
    Windowed,
}

impl fmt::Display for SsimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SsimMode::Global => "global",
            SsimMode::Windowed => "windowed",
        })
    }
}

impl FromStr for SsimMode {
    type Err = FidelityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "global" => Ok(SsimMode::Global),
            "windowed" => Ok(SsimMode::Windowed),
            _ => Err(FidelityError::Config(format!("Unknown SSIM mode: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSimilarity {
    pub mode: SsimMode,
    pub window_size: usize,
    pub identical_psnr: f64,
}

impl Default for ImageSimilarity {
    fn default() -> Self {
        Self {
            mode: SsimMode::Global,
            window_size: 11,
            identical_psnr: IDENTICAL_PSNR,
        }
    }
}

impl From<&SimilarityConfig> for ImageSimilarity {
    fn from(config: &SimilarityConfig) -> Self {
        Self {
            mode: config.mode,
            window_size: config.window_size,
            identical_psnr: config.identical_psnr,
        }
    }
}

impl ImageSimilarity {
    /// Compare two renderings. Differing sizes are reconciled by cropping
    /// both to their common top-left region; nothing is resampled.
    pub fn compare(&self, a: &PixelMatrix, b: &PixelMatrix) -> Result<SimilarityResult> {
        let (a, b) = reconcile(a, b);
        let mse = mean_squared_error(&a, &b);
        let psnr = if mse > 0.0 {
            10.0 * (MAX_PIXEL * MAX_PIXEL / mse).log10()
        } else {
            self.identical_psnr
        };
        let ssim = match self.mode {
            SsimMode::Global => global_ssim(&a, &b),
            SsimMode::Windowed => windowed_ssim(&a, &b, self.window_size),
        };

        if !(ssim.is_finite() && psnr.is_finite() && mse.is_finite()) {
            return Err(FidelityError::metric(format!(
                "Similarity overflowed (ssim {ssim}, psnr {psnr}, mse {mse}); samples must be luminance values"
            )));
        }
        Ok(SimilarityResult { ssim, psnr, mse })
    }
}

/// Score two renderings with the global SSIM estimate.
pub fn score(a: &PixelMatrix, b: &PixelMatrix) -> Result<SimilarityResult> {
    ImageSimilarity::default().compare(a, b)
}

fn reconcile<'a>(
    a: &'a PixelMatrix,
    b: &'a PixelMatrix,
) -> (Cow<'a, PixelMatrix>, Cow<'a, PixelMatrix>) {
    if a.dimensions() == b.dimensions() {
        return (Cow::Borrowed(a), Cow::Borrowed(b));
    }
    let h = a.height().min(b.height());
    let w = a.width().min(b.width());
    debug!(
        a = ?a.dimensions(),
        b = ?b.dimensions(),
        region = ?(h, w),
        "cropping to common top-left region"
    );
    (Cow::Owned(a.crop(h, w)), Cow::Owned(b.crop(h, w)))
}

fn mean_squared_error(a: &PixelMatrix, b: &PixelMatrix) -> f64 {
    let n = a.as_slice().len() as f64;
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        / n
}

fn ssim_formula(mu_x: f64, mu_y: f64, var_x: f64, var_y: f64, cov_xy: f64) -> f64 {
    let numerator = (2.0 * mu_x * mu_y + SSIM_C1) * (2.0 * cov_xy + SSIM_C2);
    let denominator = (mu_x * mu_x + mu_y * mu_y + SSIM_C1) * (var_x + var_y + SSIM_C2);
    numerator / denominator
}

fn global_ssim(a: &PixelMatrix, b: &PixelMatrix) -> f64 {
    let xs = a.as_slice();
    let ys = b.as_slice();
    let n = xs.len() as f64;

    let mu_x = xs.iter().sum::<f64>() / n;
    let mu_y = ys.iter().sum::<f64>() / n;

    let mut var_x = 0.0f64;
    let mut var_y = 0.0f64;
    let mut cov_xy = 0.0f64;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mu_x;
        let dy = y - mu_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov_xy += dx * dy;
    }

    ssim_formula(mu_x, mu_y, var_x / n, var_y / n, cov_xy / n)
}

fn gaussian_kernel(size: usize) -> Vec<f64> {
    let center = (size as f64 - 1.0) / 2.0;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * GAUSSIAN_SIGMA * GAUSSIAN_SIGMA)).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

/// Separable "valid" filtering: output has `(h - k + 1) x (w - k + 1)` samples.
fn filter_valid(data: &[f64], h: usize, w: usize, kernel: &[f64]) -> Vec<f64> {
    let k = kernel.len();
    let ow = w - k + 1;
    let oh = h - k + 1;

    let mut horizontal = vec![0.0f64; h * ow];
    for r in 0..h {
        let row = &data[r * w..(r + 1) * w];
        for c in 0..ow {
            horizontal[r * ow + c] = kernel
                .iter()
                .zip(&row[c..c + k])
                .map(|(kv, v)| kv * v)
                .sum::<f64>();
        }
    }

    let mut out = vec![0.0f64; oh * ow];
    for r in 0..oh {
        for c in 0..ow {
            out[r * ow + c] = kernel
                .iter()
                .enumerate()
                .map(|(i, kv)| kv * horizontal[(r + i) * ow + c])
                .sum::<f64>();
        }
    }
    out
}

fn windowed_ssim(a: &PixelMatrix, b: &PixelMatrix, window: usize) -> f64 {
    let (h, w) = a.dimensions();
    if window < 2 || h < window || w < window {
        debug!(
            window,
            region = ?(h, w),
            "region smaller than one window; using global SSIM"
        );
        return global_ssim(a, b);
    }

    let kernel = gaussian_kernel(window);
    let xs = a.as_slice();
    let ys = b.as_slice();
    let xx: Vec<f64> = xs.iter().map(|x| x * x).collect();
    let yy: Vec<f64> = ys.iter().map(|y| y * y).collect();
    let xy: Vec<f64> = xs.iter().zip(ys).map(|(x, y)| x * y).collect();

    let mu_x = filter_valid(xs, h, w, &kernel);
    let mu_y = filter_valid(ys, h, w, &kernel);
    let e_xx = filter_valid(&xx, h, w, &kernel);
    let e_yy = filter_valid(&yy, h, w, &kernel);
    let e_xy = filter_valid(&xy, h, w, &kernel);

    let count = mu_x.len() as f64;
    let total: f64 = (0..mu_x.len())
        .map(|i| {
            let (mx, my) = (mu_x[i], mu_y[i]);
            ssim_formula(
                mx,
                my,
                e_xx[i] - mx * mx,
                e_yy[i] - my * my,
                e_xy[i] - mx * my,
            )
        })
        .sum();
    total / count
}

impl Metric for ImageSimilarity {
    fn kind(&self) -> MetricKind {
        MetricKind::Similarity
    }

    fn is_available(&self, inputs: &EvaluationInputs) -> bool {
        inputs.images.is_some()
    }

    fn compute(&self, inputs: &EvaluationInputs) -> Result<MetricResult> {
        let pair = inputs
            .images
            .as_ref()
            .ok_or_else(|| FidelityError::metric("Image similarity requires an image pair"))?;
        let result = self.compare(&pair.reference, &pair.candidate)?;
        Ok(MetricResult::Similarity(result))
    }
}
