//! Fundamental-plane shadow mask and the matrices derived from it.
//!
//! The mask is an 8-bit grayscale image: 255 where the star is visible, 0
//! inside an occulting body. Occulters are rotated ellipses placed in
//! fundamental-plane coordinates (km from the center, x most positive at the
//! left edge, y most positive at the top, position angle CCW from north with
//! the builder absorbing the axis flips), or an arbitrary shape supplied as
//! an external PNG.
//!
//! Two derived matrices feed the rest of the pipeline. The complex source
//! plane holds 1+0i inside the occulters and 0 elsewhere: the propagator
//! diffracts this complementary aperture and Babinet's subtraction in the
//! intensity step turns it back into the occulter pattern. The geometric
//! matrix carries the same polarity as plain reals for edge detection.

use image::GenericImageView;
use ndarray::Array2;
use num_complex::Complex64;
use serde::Deserialize;
use std::path::Path;

use crate::error::{OccultError, Result};

/// Mask value for pixels the starlight reaches.
pub const ILLUMINATED: u8 = 255;
/// Mask value inside an occulting body.
pub const OCCULTED: u8 = 0;

/// An occulting body outline on the fundamental plane.
#[derive(Debug, Clone, Deserialize)]
pub struct Ellipse {
    pub x_center_km: f64,
    pub y_center_km: f64,
    pub major_axis_km: f64,
    pub minor_axis_km: f64,
    /// Position angle of the major axis, degrees CCW from north.
    pub major_axis_pa_degrees: f64,
}

impl Ellipse {
    /// Whether plane point (x, y) in km lies inside or on the ellipse.
    ///
    /// The fundamental-plane frame has y (row) pointing up and x (column)
    /// pointing left, so the configured center swaps axes relative to the
    /// sampled coordinates, and the position angle rotates a further 90
    /// degrees so it is measured CCW from north.
    pub fn contains(&self, x_km: f64, y_km: f64) -> bool {
        let xc = self.y_center_km;
        let yc = self.x_center_km;
        let theta = (self.major_axis_pa_degrees + 90.0).to_radians();
        let minor_semi = self.minor_axis_km / 2.0;
        let major_semi = self.major_axis_km / 2.0;
        let t1 = ((x_km - xc) * theta.cos() + (y_km + yc) * theta.sin()) / minor_semi;
        let t2 = ((-x_km + xc) * theta.sin() + (y_km + yc) * theta.cos()) / major_semi;
        t1 * t1 + t2 * t2 <= 1.0
    }
}

/// Paint an occulter into an existing mask.
///
/// Both axes run from +L/2 down to −L/2 across the image: x is most
/// positive at column 0 and y at row 0.
pub fn add_ellipse(mask: &mut Array2<u8>, l_km: f64, ellipse: &Ellipse) {
    let n = mask.nrows();
    let step = l_km / (n - 1) as f64;
    let half = l_km / 2.0;
    for r in 0..n {
        let y = half - r as f64 * step;
        for c in 0..n {
            let x = half - c as f64 * step;
            if ellipse.contains(x, y) {
                mask[[r, c]] = OCCULTED;
            }
        }
    }
}

/// Build the shadow mask for the given occulters on an N-point plane of
/// width `l_km`.
pub fn build_shadow_mask(
    n: usize,
    l_km: f64,
    main_body: Option<&Ellipse>,
    satellite: Option<&Ellipse>,
) -> Array2<u8> {
    let mut mask = Array2::from_elem((n, n), ILLUMINATED);
    if let Some(body) = main_body {
        add_ellipse(&mut mask, l_km, body);
    }
    if let Some(moon) = satellite {
        add_ellipse(&mut mask, l_km, moon);
    }
    mask
}

/// Load an externally drawn shadow mask.
///
/// The image must be square and 8-bit grayscale; its side length overrides
/// the configured plane point count.
pub fn load_external_mask<P: AsRef<Path>>(path: P) -> Result<Array2<u8>> {
    let img = image::open(path.as_ref())?;
    let (width, height) = img.dimensions();
    if width != height {
        return Err(OccultError::InvalidInput(format!(
            "external image {} is not square ({width}x{height})",
            path.as_ref().display()
        )));
    }
    let gray = match img {
        image::DynamicImage::ImageLuma8(buffer) => buffer,
        other => {
            return Err(OccultError::InvalidInput(format!(
                "external image {} must be 8-bit grayscale, got {:?}",
                path.as_ref().display(),
                other.color()
            )))
        }
    };
    let n = width as usize;
    Ok(Array2::from_shape_fn((n, n), |(y, x)| {
        gray.get_pixel(x as u32, y as u32)[0]
    }))
}

/// Complex source plane for the propagator: 1+0i inside the occulters,
/// 0 elsewhere (Babinet's complementary aperture).
pub fn source_plane_from_mask(mask: &Array2<u8>) -> Array2<Complex64> {
    mask.mapv(|v| {
        if v == OCCULTED {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// Real geometric matrix for edge detection: 1.0 inside the occulters,
/// 0.0 elsewhere.
pub fn geometric_matrix_from_mask(mask: &Array2<u8>) -> Array2<f64> {
    mask.mapv(|v| if v == OCCULTED { 1.0 } else { 0.0 })
}
