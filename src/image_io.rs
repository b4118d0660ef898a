//! PNG artifact helpers.
//!
//! Two renderings of the intensity matrix leave the pipeline: an 8-bit
//! percentile-stretched view for humans and a 16-bit fixed-scale data image
//! for measurement. Both map non-finite values to 0.

use image::{ImageBuffer, Luma};
use ndarray::{Array2, ArrayView2};
use std::path::Path;

use crate::error::{OccultError, Result};

/// Stretch a real matrix into 8-bit gray between the given percentiles.
///
/// Finite values at or below the `p_low` percentile map to 0, values at or
/// above `p_high` map to 255, with linear interpolation between. At
/// (0, 100) this is a plain min–max stretch.
pub fn matrix_to_u8_percentile(
    matrix: ArrayView2<'_, f64>,
    p_low: f64,
    p_high: f64,
) -> Result<Array2<u8>> {
    if matrix.is_empty() {
        return Err(OccultError::InvalidInput("empty matrix".into()));
    }
    if !(0.0 <= p_low && p_low < p_high && p_high <= 100.0) {
        return Err(OccultError::InvalidInput(format!(
            "percentiles must satisfy 0 <= low < high <= 100, got ({p_low}, {p_high})"
        )));
    }

    let mut finite: Vec<f64> = matrix.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(OccultError::InvalidInput(
            "matrix has no finite values".into(),
        ));
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let percentile = |p: f64| -> f64 {
        if p <= 0.0 {
            return finite[0];
        }
        if p >= 100.0 {
            return finite[finite.len() - 1];
        }
        let pos = p / 100.0 * (finite.len() - 1) as f64;
        let i = pos.floor() as usize;
        let frac = pos - i as f64;
        if i >= finite.len() - 1 {
            finite[finite.len() - 1]
        } else {
            finite[i] * (1.0 - frac) + finite[i + 1] * frac
        }
    };

    let lo = percentile(p_low);
    let mut hi = percentile(p_high);
    if hi == lo {
        hi = lo + 1.0; // constant image maps to 0
    }

    Ok(matrix.mapv(|v| {
        if !v.is_finite() {
            return 0;
        }
        let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        (t * 255.0).round() as u8
    }))
}

/// Fixed physical scaling to 16-bit gray: round(v · scale) clamped to
/// [0, 65535].
pub fn matrix_to_u16_scaled(matrix: ArrayView2<'_, f64>, scale: f64) -> Result<Array2<u16>> {
    if matrix.is_empty() {
        return Err(OccultError::InvalidInput("empty matrix".into()));
    }
    if scale <= 0.0 {
        return Err(OccultError::InvalidInput(format!(
            "scale must be positive, got {scale}"
        )));
    }
    Ok(matrix.mapv(|v| {
        if !v.is_finite() {
            return 0;
        }
        (v * scale).round().clamp(0.0, 65535.0) as u16
    }))
}

/// Save an 8-bit grayscale image.
pub fn save_u8_image<P: AsRef<Path>>(image: &Array2<u8>, path: P) -> Result<()> {
    let (height, width) = image.dim();
    let mut buffer = ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        *pixel = Luma([image[[y as usize, x as usize]]]);
    }
    buffer.save(path)?;
    Ok(())
}

/// Save a 16-bit grayscale image.
pub fn save_u16_image<P: AsRef<Path>>(image: &Array2<u16>, path: P) -> Result<()> {
    let (height, width) = image.dim();
    let mut buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        *pixel = Luma([image[[y as usize, x as usize]]]);
    }
    buffer.save(path)?;
    Ok(())
}
