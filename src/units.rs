//! Physical conversion constants for the occultation pipeline.
//!
//! Inputs arrive in the units observers use (AU, nanometers, milliarcseconds,
//! degrees); everything internal is kilometers and radians.

/// Kilometers per astronomical unit.
pub const AU_KM: f64 = 1.495979e8;

/// Kilometers per nanometer.
pub const NM_TO_KM: f64 = 1e-9 * 1e-3;

/// Milliarcseconds per radian, via 206265 arcsec/radian.
const MAS_PER_RADIAN: f64 = 1000.0 * 206_265.0;

/// Solar parallax constant: distance_au = 8.79414 / parallax_arcsec.
pub const PARALLAX_AU_ARCSEC: f64 = 8.79414;

/// Fresnel scale sqrt(lambda * Z / 2) in km.
///
/// Diffraction fringes have roughly this spatial period at the observer;
/// the fundamental-plane resolution should be several times finer.
pub fn fresnel_scale_km(wavelength_nm: f64, distance_au: f64) -> f64 {
    let wavelength_km = wavelength_nm * NM_TO_KM;
    let z_km = distance_au * AU_KM;
    (wavelength_km * z_km / 2.0).sqrt()
}

/// Stellar diameter projected onto the fundamental plane, in km.
pub fn star_diameter_km(star_diam_mas: f64, distance_au: f64) -> f64 {
    1.496e8 * distance_au * star_diam_mas / MAS_PER_RADIAN
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fresnel_scale() {
        // 600 nm at 15 AU: sqrt(6e-10 * 15 * 1.495979e8 / 2) km
        let fs = fresnel_scale_km(600.0, 15.0);
        assert_relative_eq!(fs, (600.0e-12 * 15.0 * AU_KM / 2.0).sqrt(), epsilon = 1e-12);
        assert!(fs > 0.5 && fs < 2.0, "unexpected Fresnel scale {fs}");
    }

    #[test]
    fn test_star_diameter_projection() {
        // 1 mas at 1 AU is about 0.725 km on the fundamental plane.
        let d = star_diameter_km(1.0, 1.0);
        assert_relative_eq!(d, 1.496e8 / (1000.0 * 206_265.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_star_diameter() {
        assert_eq!(star_diameter_km(0.0, 15.0), 0.0);
    }
}
