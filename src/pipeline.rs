use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use fidelity_lib::{load_pixel_matrix, EvaluationInputs, FidelityError, LoopSummary};

/// File paths that make up one evaluation.
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub bundle: Option<PathBuf>,
    pub ref_image: Option<PathBuf>,
    pub impl_image: Option<PathBuf>,
    pub loop_result: Option<PathBuf>,
}

impl InputPaths {
    pub fn is_empty(&self) -> bool {
        self.bundle.is_none()
            && self.loop_result.is_none()
            && (self.ref_image.is_none() || self.impl_image.is_none())
    }
}

/// Read every supplied file into evaluation inputs.
pub fn load_inputs(paths: &InputPaths) -> Result<EvaluationInputs, FidelityError> {
    if paths.is_empty() {
        return Err(FidelityError::Config(
            "Nothing to evaluate: no bundle, image pair, or loop result was supplied".to_string(),
        ));
    }

    let mut inputs = match &paths.bundle {
        Some(path) => {
            debug!(path = %path.display(), "reading node bundle");
            EvaluationInputs::from_bundle(&read_json(path, "bundle")?)
        }
        None => EvaluationInputs::default(),
    };

    if let (Some(ref_path), Some(impl_path)) = (&paths.ref_image, &paths.impl_image) {
        debug!(
            reference = %ref_path.display(),
            candidate = %impl_path.display(),
            "decoding renderings"
        );
        inputs = inputs.with_images(load_pixel_matrix(ref_path)?, load_pixel_matrix(impl_path)?);
    }

    if let Some(path) = &paths.loop_result {
        debug!(path = %path.display(), "reading fidelity-loop result");
        let summary = LoopSummary::from_value(&read_json(path, "loop result")?).ok_or_else(|| {
            FidelityError::Config(format!(
                "Invalid loop result {} (expected a JSON object)",
                path.display()
            ))
        })?;
        inputs = inputs.with_fidelity_loop(summary);
    }

    Ok(inputs)
}

/// Read and parse a JSON file.
fn read_json(path: &Path, what: &str) -> Result<Value, FidelityError> {
    if !path.exists() {
        return Err(FidelityError::Config(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| {
        FidelityError::Config(format!(
            "Invalid {what} JSON ({}): {e}",
            path.display()
        ))
    })
}
