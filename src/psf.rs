//! Limb-darkened stellar disk point-spread function.
//!
//! A star of finite angular size smears the diffraction pattern: the
//! observed intensity is the point-source pattern convolved with the star's
//! disk projected onto the fundamental plane. The disk brightness follows
//! the linear limb-darkening law 1 − u·(1 − √(1 − (r/R)²)).

use ndarray::Array2;

use crate::error::{OccultError, Result};

/// Surface brightness of the stellar disk at radial distance `r_km` from
/// its center, for a disk of diameter `star_diam_km` and limb-darkening
/// coefficient `u`. Zero outside the disk.
pub fn star_brightness(r_km: f64, star_diam_km: f64, limb_darkening: f64) -> f64 {
    let radius = star_diam_km / 2.0;
    let x = r_km / radius;
    if x >= 1.0 {
        return 0.0;
    }
    1.0 - limb_darkening * (1.0 - (1.0 - x * x).sqrt())
}

/// Sample the stellar disk at the fundamental-plane resolution.
///
/// The grid is ⌈D/ρ⌉ pixels forced even, plus a 4-pixel border so the FFT
/// convolution has an empty margin to wrap into. Returns the PSF matrix and
/// its weight sum, which the convolver uses as the normalization divisor.
///
/// # Errors
/// `NumericalDegeneracy` when the sampled disk carries no weight, which
/// happens when the star diameter is below one resolution element.
pub fn build_star_psf(
    star_diam_km: f64,
    resolution_km_per_px: f64,
    limb_darkening: f64,
) -> Result<(Array2<f64>, f64)> {
    let mut width = (star_diam_km / resolution_km_per_px).ceil() as usize;
    if width % 2 != 0 {
        width += 1;
    }
    width += 4;

    let center = (width / 2) as isize;
    let mut psf = Array2::zeros((width, width));
    let mut sum_of_weights = 0.0;
    for row in 0..width {
        for col in 0..width {
            let dr = row as isize - center;
            let dc = col as isize - center;
            let r = ((dr * dr + dc * dc) as f64).sqrt() * resolution_km_per_px;
            let brightness = star_brightness(r, star_diam_km, limb_darkening);
            sum_of_weights += brightness;
            psf[[row, col]] = brightness;
        }
    }

    if sum_of_weights <= 0.0 {
        return Err(OccultError::NumericalDegeneracy(format!(
            "star PSF carries no weight (diameter {star_diam_km} km below resolution \
             {resolution_km_per_px} km/px)"
        )));
    }
    Ok((psf, sum_of_weights))
}
