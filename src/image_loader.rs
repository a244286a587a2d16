use std::path::Path;

use image::{DynamicImage, GrayImage, ImageError};
use thiserror::Error;

use crate::types::PixelMatrix;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to load image: {0}")]
    Load(#[from] ImageError),
    #[error("File not found: {0}")]
    NotFound(String),
}

pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, ImageLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImageLoadError::NotFound(path.display().to_string()));
    }
    Ok(image::open(path)?)
}

/// Convert an 8-bit grayscale image into luminance samples.
pub fn gray_to_pixel_matrix(gray: &GrayImage) -> crate::Result<PixelMatrix> {
    let data = gray.as_raw().iter().map(|&v| f64::from(v)).collect();
    PixelMatrix::new(gray.height() as usize, gray.width() as usize, data)
}

/// Decode an image file and convert it to single-channel luminance.
pub fn load_pixel_matrix(path: impl AsRef<Path>) -> crate::Result<PixelMatrix> {
    let img = load_image(path)?;
    gray_to_pixel_matrix(&img.to_luma8())
}
