//! The event pipeline: mask, field, intensity, convolution, chord outputs.
//!
//! Each stage is a pure transformation; this module only sequences them and
//! owns the intermediate buffers, so embedders can also call the stages
//! individually.

use log::info;
use ndarray::Array2;
use std::time::Instant;

use crate::aperture::{
    add_ellipse, geometric_matrix_from_mask, load_external_mask, source_plane_from_mask,
    ILLUMINATED,
};
use crate::config::EventConfig;
use crate::convolve::{convolve_psf_fft, ConvolveMode, PaddingMode};
use crate::diffraction::{
    apply_percent_mag_drop, combined_observation_field, intensity_from_field, CameraResponse,
};
use crate::error::Result;
use crate::path::{LightCurvePoint, ObservationPath};
use crate::psf::build_star_psf;
use crate::units::fresnel_scale_km;

/// Everything the pipeline produces for one event.
#[derive(Debug)]
pub struct EventOutputs {
    /// Shadow mask: 255 illuminated, 0 inside an occulter.
    pub shadow_mask: Array2<u8>,
    /// Diffraction intensity, convolved with the stellar disk when the star
    /// has finite size.
    pub intensity: Array2<f64>,
    /// The observation chord, when a shadow velocity was given.
    pub path: Option<ObservationPath>,
    /// Light curve along the chord (empty without a path).
    pub light_curve: Vec<LightCurvePoint>,
    /// Along-path pixel distances of geometric-shadow edges.
    pub shadow_edges_px: Vec<f64>,
    /// Loaded camera response table, when one was configured.
    pub camera_response: Option<CameraResponse>,
    /// Fundamental-plane resolution in km per pixel.
    pub resolution_km_per_px: f64,
    /// Projected stellar diameter in km (0 for a point source).
    pub star_diam_km: f64,
}

/// Run the full pipeline for one event.
pub fn run_event(config: &EventConfig) -> Result<EventOutputs> {
    let l_km = config.fundamental_plane_width_km;

    let mask_start = Instant::now();
    let mut mask = match &config.path_to_external_image {
        Some(image_path) => {
            let mask = load_external_mask(image_path)?;
            info!(
                "external image {} overrides the plane size: {} points",
                image_path,
                mask.nrows()
            );
            mask
        }
        None => {
            let n = config.fundamental_plane_width_num_points;
            Array2::from_elem((n, n), ILLUMINATED)
        }
    };
    if let Some(body) = &config.main_body {
        add_ellipse(&mut mask, l_km, body);
    }
    if let Some(moon) = &config.satellite {
        add_ellipse(&mut mask, l_km, moon);
    }
    info!("shadow mask built in {:.2?}", mask_start.elapsed());

    let n = mask.nrows();
    let resolution = l_km / n as f64;
    let z_km = config.distance_km();

    let fresnel_scale = fresnel_scale_km(config.observation_wavelength_nm, config.distance_au());
    let samples_per_scale = (fresnel_scale / resolution) as i64;
    info!("resolution in fundamental plane is {resolution:.3} km/pixel");
    info!("Fresnel scale is {fresnel_scale:.3} km");
    info!(
        "samples per Fresnel scale is {samples_per_scale} \
         (diffraction effects need at least 5)"
    );

    let source = source_plane_from_mask(&mask);
    let geometric = geometric_matrix_from_mask(&mask);

    let path = if config.has_path() {
        let path = ObservationPath::solve(
            n,
            l_km,
            config.dx_km_per_sec,
            config.dy_km_per_sec,
            config.path_perpendicular_offset_from_center_km,
        )?;
        info!(
            "shadow speed {:.3} km/s, path angle {:.1} degrees, direction {}",
            path.speed_km_per_sec, path.angle_degrees, path.direction
        );
        info!(
            "path start ({:.4}, {:.4}), end ({:.4}, {:.4}), {} samples",
            path.start.0,
            path.start.1,
            path.end.0,
            path.end.1,
            path.samples.len()
        );
        Some(path)
    } else {
        None
    };

    let camera_response = match &config.path_to_qe_table_file {
        Some(table_path) => {
            let response = CameraResponse::load(table_path)?;
            info!(
                "camera response table {} loaded with {} wavelength bins",
                table_path,
                response.len()
            );
            Some(response)
        }
        None => None,
    };

    let field_start = Instant::now();
    let field = combined_observation_field(
        l_km,
        z_km,
        config.wavelength_km(),
        camera_response.as_ref(),
        source.view(),
    )?;
    info!("observation e-field computed in {:.2?}", field_start.elapsed());

    let mut intensity = intensity_from_field(field.view());
    if let Some(percent) = config.percent_mag_drop {
        apply_percent_mag_drop(&mut intensity, percent);
    }

    let star_diam_km = config.star_diam_km();
    if star_diam_km > 0.0 {
        info!("star diameter projected at the asteroid plane is {star_diam_km:.3} km");
        let (psf, sum_of_weights) =
            build_star_psf(star_diam_km, resolution, config.limb_darkening())?;
        let convolve_start = Instant::now();
        intensity = convolve_psf_fft(
            intensity.view(),
            psf.view(),
            sum_of_weights,
            ConvolveMode::Same,
            PaddingMode::Replicate,
            false,
        )?;
        info!(
            "finite-source convolution took {:.2?}",
            convolve_start.elapsed()
        );
    }

    let (light_curve, shadow_edges_px) = match &path {
        Some(path) => (
            path.sample_light_curve(intensity.view(), resolution),
            path.find_shadow_edges(geometric.view()),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(EventOutputs {
        shadow_mask: mask,
        intensity,
        path,
        light_curve,
        shadow_edges_px,
        camera_response,
        resolution_km_per_px: resolution,
        star_diam_km,
    })
}
