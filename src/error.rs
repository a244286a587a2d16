use crate::image_loader::ImageLoadError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FidelityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Metric computation error: {0}")]
    Metric(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl FidelityError {
    pub fn metric(message: impl Into<String>) -> Self {
        FidelityError::Metric(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        FidelityError::Config(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            FidelityError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            FidelityError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify image path/format and readability.",
            ),
            FidelityError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check that bundle and loop-result files contain valid JSON.",
            ),
            FidelityError::Metric(msg) => ErrorPayload::new(
                ErrorCategory::Metric,
                msg.to_string(),
                "Rasterized inputs must be non-empty with finite luminance samples; rerun with --verbose.",
            ),
            FidelityError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Verify the file exists; use an absolute path or run from the working directory.",
                    )
                } else if lower.contains("toml") || lower.contains("config") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Fix the config file ([thresholds]/[similarity] sections) or pass --config with a valid path.",
                    )
                } else if lower.contains("nothing to evaluate") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass --bundle, --loop-result, or both --ref-image and --impl-image.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and threshold values.",
                    )
                }
            }
            FidelityError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

impl From<ImageLoadError> for FidelityError {
    fn from(err: ImageLoadError) -> Self {
        match err {
            ImageLoadError::Load(e) => FidelityError::Image(e),
            ImageLoadError::NotFound(path) => {
                FidelityError::Config(format!("File not found: {}", path))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FidelityError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Image,
    Metric,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
