//! Camera spectral response and the polychromatic field combiner.
//!
//! A camera response table lists (wavelength_nm, weight) pairs; weights are
//! normalized to sum to one at construction. The combiner runs the
//! monochromatic propagator at each listed wavelength and accumulates the
//! weighted sum of the complex fields before the intensity step. A strictly
//! incoherent polychromatic composite would sum intensities instead.

use log::info;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use std::path::Path;
use std::time::Instant;

use crate::diffraction::propagate::observation_field;
use crate::error::{OccultError, Result};
use crate::units::NM_TO_KM;

/// Normalized camera spectral-response table.
#[derive(Debug, Clone)]
pub struct CameraResponse {
    /// (wavelength_nm, weight) with weights summing to 1.
    entries: Vec<(f64, f64)>,
}

impl CameraResponse {
    /// Build a response table from raw (wavelength_nm, weight) pairs.
    ///
    /// The table must be non-empty and every weight strictly positive;
    /// weights are normalized so they sum to one.
    pub fn from_pairs(pairs: Vec<(f64, f64)>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(OccultError::InvalidInput(
                "camera response table is empty".into(),
            ));
        }
        for &(wavelength, weight) in &pairs {
            if !(wavelength > 0.0) {
                return Err(OccultError::InvalidInput(format!(
                    "camera response wavelength must be positive, got {wavelength}"
                )));
            }
            if !(weight > 0.0) {
                return Err(OccultError::InvalidInput(format!(
                    "camera response weight must be positive, got {weight} at {wavelength} nm"
                )));
            }
        }

        let total: f64 = pairs.iter().map(|&(_, w)| w).sum();
        let entries = pairs
            .into_iter()
            .map(|(wavelength, weight)| (wavelength, weight / total))
            .collect();
        Ok(Self { entries })
    }

    /// Parse a JSON5 array of `[wavelength_nm, weight]` pairs.
    pub fn from_json5_str(text: &str) -> Result<Self> {
        let pairs: Vec<[f64; 2]> = json5::from_str(text).map_err(|e| {
            OccultError::InvalidInput(format!("camera response table parse error: {e}"))
        })?;
        Self::from_pairs(pairs.into_iter().map(|[w, q]| (w, q)).collect())
    }

    /// Load a response table file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json5_str(&text)
    }

    /// Normalized (wavelength_nm, weight) entries in file order.
    pub fn entries(&self) -> &[(f64, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Observation field for the camera's full spectral response.
///
/// With a response table, the propagator runs once per wavelength bin and the
/// complex fields accumulate with the normalized weights; without one, the
/// single-wavelength field is returned directly.
pub fn combined_observation_field(
    l_km: f64,
    z_km: f64,
    wavelength_km: f64,
    response: Option<&CameraResponse>,
    source: ArrayView2<'_, Complex64>,
) -> Result<Array2<Complex64>> {
    let Some(response) = response else {
        return observation_field(l_km, z_km, wavelength_km, source);
    };

    let mut combined: Option<Array2<Complex64>> = None;
    for &(wavelength_nm, weight) in response.entries() {
        let start = Instant::now();
        let field = observation_field(l_km, z_km, wavelength_nm * NM_TO_KM, source)?;
        info!(
            "e-field at {wavelength_nm:.1} nm took {:.2?}",
            start.elapsed()
        );

        let scale = Complex64::new(weight, 0.0);
        match combined.as_mut() {
            None => combined = Some(field.mapv(|e| e * scale)),
            Some(total) => total.zip_mut_with(&field, |t, &e| *t += scale * e),
        }
    }

    // from_pairs guarantees at least one entry.
    Ok(combined.expect("camera response table is never empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_are_normalized() {
        let response =
            CameraResponse::from_pairs(vec![(500.0, 2.0), (600.0, 6.0), (700.0, 2.0)]).unwrap();
        let total: f64 = response.entries().iter().map(|&(_, w)| w).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert_relative_eq!(response.entries()[1].1, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_empty_table() {
        assert!(CameraResponse::from_pairs(vec![]).is_err());
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        assert!(CameraResponse::from_pairs(vec![(500.0, 1.0), (600.0, 0.0)]).is_err());
        assert!(CameraResponse::from_pairs(vec![(500.0, -0.3)]).is_err());
    }

    #[test]
    fn test_json5_round_trip() {
        let response = CameraResponse::from_json5_str(
            "// camera response\n[[420.0, 0.1], [550.0, 0.7], [680.0, 0.2]]",
        )
        .unwrap();
        assert_eq!(response.len(), 3);
        assert_relative_eq!(response.entries()[1].0, 550.0);
        assert_relative_eq!(response.entries()[1].1, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_single_entry_matches_monochromatic() {
        use ndarray::Array2;

        let n = 24;
        let l_km = 40.0;
        let z_km = 2.243e9;
        let lambda_nm = 600.0;

        let mut source = Array2::<Complex64>::zeros((n, n));
        for y in 8..16 {
            for x in 8..16 {
                source[[y, x]] = Complex64::new(1.0, 0.0);
            }
        }

        let response = CameraResponse::from_pairs(vec![(lambda_nm, 3.0)]).unwrap();
        let combined = combined_observation_field(
            l_km,
            z_km,
            lambda_nm * NM_TO_KM,
            Some(&response),
            source.view(),
        )
        .unwrap();
        let direct =
            observation_field(l_km, z_km, lambda_nm * NM_TO_KM, source.view()).unwrap();

        for (a, b) in combined.iter().zip(direct.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }
}
