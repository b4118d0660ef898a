//! Fresnel weight kernel for the sinc-basis propagator.
//!
//! The N×N weight matrix W is symmetric Toeplitz: W[i, j] depends only on
//! |i − j|, so a single length-N row fully describes it. The row is built
//! from the Fresnel integrals; the dense matrix is materialized only when it
//! is about to be multiplied.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::algo::fresnel;
use crate::error::{OccultError, Result};

/// Smallest fundamental plane the propagator accepts.
pub const MIN_GRID_POINTS: usize = 10;

fn validate(n: usize, l_km: f64, z_km: f64, wavelength_km: f64) -> Result<()> {
    if n < MIN_GRID_POINTS {
        return Err(OccultError::InvalidInput(format!(
            "fundamental plane needs at least {MIN_GRID_POINTS} points, got {n}"
        )));
    }
    if l_km <= 0.0 {
        return Err(OccultError::InvalidInput(format!(
            "fundamental plane width must be positive, got {l_km} km"
        )));
    }
    if z_km <= 0.0 {
        return Err(OccultError::InvalidInput(format!(
            "observer distance must be positive, got {z_km} km"
        )));
    }
    if wavelength_km <= 0.0 {
        return Err(OccultError::InvalidInput(format!(
            "wavelength must be positive, got {wavelength_km} km"
        )));
    }
    Ok(())
}

/// First row of the Fresnel weight matrix for an N-point plane of width
/// `l_km`, observed from `z_km` away at `wavelength_km`.
///
/// The sqrt(2/π) and sqrt(π/2) factors convert between the normalized
/// Fresnel integrals computed by [`fresnel`] and the unnormalized form the
/// sinc-basis derivation uses.
pub fn fresnel_weight_row(
    n: usize,
    l_km: f64,
    z_km: f64,
    wavelength_km: f64,
) -> Result<Vec<Complex64>> {
    validate(n, l_km, z_km, wavelength_km)?;

    let dx = l_km / n as f64;
    let band_limit = 1.0 / (2.0 * dx);
    let delta = dx;
    let k = 2.0 * PI / wavelength_km;

    // Factors independent of the row index.
    let t1 = -PI * (2.0 * z_km / k).sqrt() * band_limit;
    let t2 = (k / (2.0 * z_km)).sqrt();
    let t4 = (delta / PI) * (k / (2.0 * z_km)).sqrt() * (PI / 2.0).sqrt();
    let t5 = k / (2.0 * z_km);
    let t6 = (2.0 / PI).sqrt();

    let mut row = Vec::with_capacity(n);
    for m in 0..n {
        let slide = m as f64 * dx;
        let u1 = t1 - t2 * slide;
        let u2 = -t1 - t2 * slide;
        let (s1, c1) = fresnel(u1 * t6);
        let (s2, c2) = fresnel(u2 * t6);
        let phase = Complex64::new(0.0, slide * slide * t5).exp();
        row.push(t4 * phase * Complex64::new(c2 - c1, -(s2 - s1)));
    }
    Ok(row)
}

/// Materialize the full symmetric Toeplitz weight matrix from its first row.
pub fn fresnel_weights(
    n: usize,
    l_km: f64,
    z_km: f64,
    wavelength_km: f64,
) -> Result<Array2<Complex64>> {
    let row = fresnel_weight_row(n, l_km, z_km, wavelength_km)?;
    Ok(Array2::from_shape_fn((n, n), |(i, j)| {
        row[i.abs_diff(j)]
    }))
}
