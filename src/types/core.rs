//! Luminance pixel matrices handed to the similarity scorer.

use crate::error::FidelityError;
use crate::Result;

/// A row-major grid of luminance samples, nominally in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMatrix {
    height: usize,
    width: usize,
    data: Vec<f64>,
}

impl PixelMatrix {
    /// Build a matrix from row-major samples.
    ///
    /// Fails when the matrix is empty, when `data` does not hold exactly
    /// `height * width` samples, or when any sample is not finite.
    pub fn new(height: usize, width: usize, data: Vec<f64>) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(FidelityError::metric(format!(
                "Pixel matrix must be non-empty (got {height}x{width})"
            )));
        }
        let expected = height.checked_mul(width).ok_or_else(|| {
            FidelityError::metric(format!("Pixel matrix {height}x{width} is too large"))
        })?;
        if data.len() != expected {
            return Err(FidelityError::metric(format!(
                "Pixel matrix {height}x{width} expects {expected} samples, got {}",
                data.len()
            )));
        }
        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            return Err(FidelityError::metric(format!(
                "Non-finite luminance sample at row {}, column {}",
                idx / width,
                idx % width
            )));
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Build a matrix from rows; all rows must share one length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(FidelityError::metric(format!(
                "Ragged pixel matrix: row {bad} has {} samples, expected {width}",
                rows[bad].len()
            )));
        }
        Self::new(height, width, rows.concat())
    }

    /// A matrix with every sample set to `value`.
    pub fn filled(height: usize, width: usize, value: f64) -> Result<Self> {
        Self::new(height, width, vec![value; height.saturating_mul(width)])
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The top-left `height x width` region. Requested dimensions larger than
    /// the matrix are clamped.
    pub fn crop(&self, height: usize, width: usize) -> PixelMatrix {
        let height = height.min(self.height);
        let width = width.min(self.width);
        if height == self.height && width == self.width {
            return self.clone();
        }
        let mut data = Vec::with_capacity(height * width);
        for r in 0..height {
            data.extend_from_slice(&self.row(r)[..width]);
        }
        PixelMatrix {
            height,
            width,
            data,
        }
    }

    /// Apply `f` to every sample, keeping the shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Result<PixelMatrix> {
        PixelMatrix::new(
            self.height,
            self.width,
            self.data.iter().map(|&v| f(v)).collect(),
        )
    }
}

/// Reference and candidate renderings to compare.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair {
    pub reference: PixelMatrix,
    pub candidate: PixelMatrix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_mismatched_data() {
        assert!(PixelMatrix::new(0, 4, vec![]).is_err());
        assert!(PixelMatrix::new(2, 2, vec![1.0; 3]).is_err());
        assert!(PixelMatrix::new(1, 2, vec![1.0, f64::NAN]).is_err());
        assert!(PixelMatrix::from_rows(&[]).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = PixelMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().contains("Ragged"));
    }

    #[test]
    fn crop_keeps_top_left_region() {
        let m = PixelMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        let cropped = m.crop(2, 2);
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.as_slice(), &[1.0, 2.0, 4.0, 5.0]);

        let clamped = m.crop(10, 1);
        assert_eq!(clamped.dimensions(), (3, 1));
        assert_eq!(clamped.as_slice(), &[1.0, 4.0, 7.0]);
    }

    #[test]
    fn get_is_bounds_checked() {
        let m = PixelMatrix::filled(2, 3, 7.0).unwrap();
        assert_eq!(m.get(1, 2), Some(7.0));
        assert_eq!(m.get(2, 0), None);
    }
}
