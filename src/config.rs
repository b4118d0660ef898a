//! Occultation event parameters.
//!
//! Events are described by a JSON5 parameter file. Distances arrive in AU
//! (or as a parallax, which takes precedence), wavelengths in nm, the star
//! diameter in milliarcseconds; the accessors below hand out the derived
//! km-based quantities the pipeline works with.

use log::warn;
use serde::Deserialize;
use std::path::Path;

use crate::aperture::Ellipse;
use crate::error::{OccultError, Result};
use crate::units::{star_diameter_km, AU_KM, NM_TO_KM, PARALLAX_AU_ARCSEC};

/// Limb-darkening coefficient used when neither an explicit value nor a
/// recognized star class is given.
pub const DEFAULT_LIMB_DARKENING: f64 = 0.7;

fn default_window_size() -> u32 {
    500
}

/// Parsed parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    pub fundamental_plane_width_km: f64,
    pub fundamental_plane_width_num_points: usize,
    pub observation_wavelength_nm: f64,

    pub distance_au: Option<f64>,
    /// Overrides `distance_au` when present.
    pub parallax_arcsec: Option<f64>,

    #[serde(rename = "dX_km_per_sec", default)]
    pub dx_km_per_sec: f64,
    #[serde(rename = "dY_km_per_sec", default)]
    pub dy_km_per_sec: f64,
    #[serde(default)]
    pub path_perpendicular_offset_from_center_km: f64,

    /// 0 means a point source (no finite-source convolution).
    #[serde(default)]
    pub star_diam_on_plane_mas: f64,
    pub limb_darkening_coeff: Option<f64>,
    pub star_class: Option<String>,
    pub star_name: Option<String>,

    pub percent_mag_drop: Option<f64>,

    pub main_body: Option<Ellipse>,
    pub satellite: Option<Ellipse>,

    pub path_to_external_image: Option<String>,
    pub path_to_qe_table_file: Option<String>,

    #[serde(default)]
    pub show_input_bool: bool,
    #[serde(default = "default_window_size")]
    pub window_size_pixels: u32,
    pub title: Option<String>,
}

impl EventConfig {
    /// Parse a JSON5 parameter string.
    pub fn from_json5_str(text: &str) -> Result<Self> {
        let config: EventConfig = json5::from_str(text)
            .map_err(|e| OccultError::InvalidInput(format!("parameter file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a parameter file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json5_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.fundamental_plane_width_num_points < 10 {
            return Err(OccultError::InvalidInput(format!(
                "fundamental plane width must be at least 10 points, got {}",
                self.fundamental_plane_width_num_points
            )));
        }
        if self.fundamental_plane_width_km <= 0.0 {
            return Err(OccultError::InvalidInput(
                "fundamental plane width must be positive".into(),
            ));
        }
        if self.distance_au.is_none() && self.parallax_arcsec.is_none() {
            return Err(OccultError::InvalidInput(
                "either distance_au or parallax_arcsec is required".into(),
            ));
        }
        if self.main_body.is_none() && self.path_to_external_image.is_none() {
            return Err(OccultError::InvalidInput(
                "main_body is required unless an external image is supplied".into(),
            ));
        }
        if self.distance_km() <= 0.0 {
            return Err(OccultError::InvalidInput(
                "distance must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Observer-to-asteroid distance in AU; parallax takes precedence over
    /// a directly supplied distance.
    pub fn distance_au(&self) -> f64 {
        match self.parallax_arcsec {
            Some(parallax) if parallax > 0.0 => PARALLAX_AU_ARCSEC / parallax,
            _ => self.distance_au.unwrap_or(0.0),
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_au() * AU_KM
    }

    pub fn wavelength_km(&self) -> f64 {
        self.observation_wavelength_nm * NM_TO_KM
    }

    /// Stellar diameter projected onto the fundamental plane.
    pub fn star_diam_km(&self) -> f64 {
        star_diameter_km(self.star_diam_on_plane_mas, self.distance_au())
    }

    /// Resolve the limb-darkening coefficient: an explicit positive value
    /// wins, then the star-class table, then the default.
    pub fn limb_darkening(&self) -> f64 {
        if let Some(coeff) = self.limb_darkening_coeff {
            if coeff > 0.0 {
                return coeff;
            }
        }
        match self.star_class.as_deref() {
            None | Some("") => DEFAULT_LIMB_DARKENING,
            Some(class) => match class {
                "O" => 0.05,
                "B" => 0.2,
                "A" => 0.5,
                "F" => 0.6,
                "G" | "K" | "M" => 0.7,
                other => {
                    warn!("star class {other:?} is not recognized; using {DEFAULT_LIMB_DARKENING}");
                    DEFAULT_LIMB_DARKENING
                }
            },
        }
    }

    /// Whether a shadow path was requested.
    pub fn has_path(&self) -> bool {
        self.dx_km_per_sec != 0.0 || self.dy_km_per_sec != 0.0
    }
}
