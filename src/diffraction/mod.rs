//! Sinc-basis Fresnel propagation of the source plane to the observation
//! plane, monochromatic or weighted across a camera's spectral response.

pub mod propagate;
pub mod spectral;
pub mod weights;

pub use propagate::{apply_percent_mag_drop, intensity_from_field, observation_field};
pub use spectral::{combined_observation_field, CameraResponse};
pub use weights::{fresnel_weight_row, fresnel_weights};
