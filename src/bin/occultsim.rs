//! Command-line driver: read a JSON5 parameter file, run the diffraction
//! pipeline, and write the PNG artifacts.

use anyhow::Context;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use occultsim::image_io::{
    matrix_to_u16_scaled, matrix_to_u8_percentile, save_u16_image, save_u8_image,
};
use occultsim::plot::{render_camera_response, render_light_curve};
use occultsim::{run_event, EventConfig};

/// Pixel value scale of the 16-bit data image.
const DATA_IMAGE_SCALE: f64 = 4000.0;

#[derive(Parser, Debug)]
#[command(
    name = "occultsim",
    about = "Diffraction pattern and light curve of an asteroid occultation"
)]
struct Args {
    /// JSON5 parameter file describing the occultation event
    parameter_file: PathBuf,

    /// Directory the PNG artifacts are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let program_start = Instant::now();

    let text = std::fs::read_to_string(&args.parameter_file)
        .with_context(|| format!("reading {}", args.parameter_file.display()))?;
    let config = EventConfig::from_json5_str(&text)
        .with_context(|| format!("parsing {}", args.parameter_file.display()))?;
    if config.show_input_bool {
        info!("parameter file contents:\n{text}");
    }

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let outputs = run_event(&config)?;

    save_u8_image(&outputs.shadow_mask, args.output_dir.join("geometricShadow.png"))
        .context("writing geometricShadow.png")?;

    let display = matrix_to_u8_percentile(outputs.intensity.view(), 0.0, 100.0)?;
    save_u8_image(&display, args.output_dir.join("diffractionImage8bit.png"))
        .context("writing diffractionImage8bit.png")?;

    let data = matrix_to_u16_scaled(outputs.intensity.view(), DATA_IMAGE_SCALE)?;
    save_u16_image(&data, args.output_dir.join("occultImage16bit.png"))
        .context("writing occultImage16bit.png")?;

    if let Some(path) = &outputs.path {
        let edges_km: Vec<f64> = outputs
            .shadow_edges_px
            .iter()
            .map(|&px| px * outputs.resolution_km_per_px)
            .collect();
        let title = config.title.as_deref().unwrap_or("Occultation light curve");
        let caption = format!("{title} ({})", path.direction);
        render_light_curve(
            args.output_dir.join("lightcurve_plot.png"),
            &outputs.light_curve,
            &edges_km,
            &caption,
        )
        .context("writing lightcurve_plot.png")?;
    }

    if let Some(response) = &outputs.camera_response {
        render_camera_response(
            args.output_dir.join("camera_response.png"),
            response,
            "Camera response curve",
        )
        .context("writing camera_response.png")?;
    }

    info!("total run time {:.2?}", program_start.elapsed());
    Ok(())
}
