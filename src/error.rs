use thiserror::Error;

/// Errors produced by the occultation diffraction pipeline.
#[derive(Error, Debug)]
pub enum OccultError {
    /// A parameter or matrix failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The observation line misses the fundamental-plane square.
    #[error("path line does not intersect the image square at two distinct points")]
    NoIntersection,

    /// A path was requested but both shadow-velocity components are zero.
    #[error("shadow speed is zero but an observation path was requested")]
    ZeroShadowSpeed,

    /// A computed quantity collapsed below usable precision.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// Reading or writing an artifact failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a PNG failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Rendering a chart failed.
    #[error("plot error: {0}")]
    Plot(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OccultError>;
