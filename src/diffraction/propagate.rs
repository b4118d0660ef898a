//! Observation-plane field and intensity.
//!
//! The field is E = W · A · W, where A is the complex source plane and W the
//! Fresnel weight matrix. Babinet's principle then gives the occulter
//! intensity as I = |1 − E|²; the e^{ikZ} prefactor of the full solution is
//! omitted because it cancels in that modulus.

use log::warn;
use ndarray::linalg::general_mat_mul;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use crate::diffraction::weights::fresnel_weights;
use crate::error::{OccultError, Result};

/// Propagate the complex source plane to the observation plane.
///
/// Two dense complex matrix products with α = 1, β = 0, all in double
/// precision.
pub fn observation_field(
    l_km: f64,
    z_km: f64,
    wavelength_km: f64,
    source: ArrayView2<'_, Complex64>,
) -> Result<Array2<Complex64>> {
    let (rows, cols) = source.dim();
    if rows != cols {
        return Err(OccultError::InvalidInput(format!(
            "source plane must be square, got {rows}x{cols}"
        )));
    }

    let weights = fresnel_weights(rows, l_km, z_km, wavelength_km)?;

    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);

    let mut half = Array2::zeros((rows, rows));
    general_mat_mul(one, &weights, &source, zero, &mut half);

    let mut field = Array2::zeros((rows, rows));
    general_mat_mul(one, &half, &weights, zero, &mut field);
    Ok(field)
}

/// Occulter intensity from the observation field, I = |1 − E|².
///
/// The unit incident wave converts the aperture solution to the occulter
/// solution (Babinet).
pub fn intensity_from_field(field: ArrayView2<'_, Complex64>) -> Array2<f64> {
    field.mapv(|e| {
        let re = 1.0 - e.re;
        re * re + e.im * e.im
    })
}

/// Rescale the intensity for a fractional magnitude drop.
///
/// `percent` in (0, 100] maps I to s·I + (1 − s) with s = percent/100.
/// Values above 100 are clamped with a warning; values ≤ 0 leave the
/// intensity untouched.
pub fn apply_percent_mag_drop(intensity: &mut Array2<f64>, percent: f64) {
    if percent <= 0.0 {
        return;
    }
    let mut percent = percent;
    if percent > 100.0 {
        warn!("percent_mag_drop of {percent:.1} is too large; clamping to 100.0");
        percent = 100.0;
    }
    let scale = percent / 100.0;
    let shift = 1.0 - scale;
    intensity.mapv_inplace(|v| v * scale + shift);
}
