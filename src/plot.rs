//! Chart rendering for the light curve and the camera response table.

use plotters::prelude::*;
use std::path::Path;

use crate::diffraction::CameraResponse;
use crate::error::{OccultError, Result};
use crate::path::LightCurvePoint;

fn plot_err<E: std::fmt::Display>(e: E) -> OccultError {
    OccultError::Plot(e.to_string())
}

/// Render the sampled light curve with the geometric-shadow edges marked as
/// vertical lines.
pub fn render_light_curve<P: AsRef<Path>>(
    output: P,
    curve: &[LightCurvePoint],
    edge_distances_km: &[f64],
    caption: &str,
) -> Result<()> {
    if curve.is_empty() {
        return Err(OccultError::InvalidInput("light curve is empty".into()));
    }

    let x_max = curve.last().unwrap().distance_km;
    let y_max = curve
        .iter()
        .map(|p| p.intensity)
        .fold(f64::NEG_INFINITY, f64::max)
        .max(1.0)
        * 1.05;

    let root = BitMapBackend::new(output.as_ref(), (1200, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Distance along path (km)")
        .y_desc("Relative intensity")
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            curve.iter().map(|p| (p.distance_km, p.intensity)),
            &BLUE,
        ))
        .map_err(plot_err)?
        .label("light curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    let mut edges = edge_distances_km.iter();
    if let Some(&first) = edges.next() {
        chart
            .draw_series(LineSeries::new(
                [(first, 0.0), (first, y_max)],
                RED.stroke_width(1),
            ))
            .map_err(plot_err)?
            .label("geometric shadow edge")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }
    for &edge in edges {
        chart
            .draw_series(LineSeries::new(
                [(edge, 0.0), (edge, y_max)],
                RED.stroke_width(1),
            ))
            .map_err(plot_err)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Render the normalized camera response weights against wavelength.
pub fn render_camera_response<P: AsRef<Path>>(
    output: P,
    response: &CameraResponse,
    caption: &str,
) -> Result<()> {
    let entries = response.entries();
    let mut x_min = entries.iter().map(|&(w, _)| w).fold(f64::INFINITY, f64::min);
    let mut x_max = entries
        .iter()
        .map(|&(w, _)| w)
        .fold(f64::NEG_INFINITY, f64::max);
    if x_min == x_max {
        x_min -= 10.0;
        x_max += 10.0;
    }
    let y_max = entries
        .iter()
        .map(|&(_, q)| q)
        .fold(f64::NEG_INFINITY, f64::max)
        * 1.1;

    let root = BitMapBackend::new(output.as_ref(), (1200, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc("Normalized response")
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(entries.iter().copied(), &GREEN))
        .map_err(plot_err)?;
    chart
        .draw_series(
            entries
                .iter()
                .map(|&(w, q)| Circle::new((w, q), 3, GREEN.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
