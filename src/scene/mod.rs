//! Scene parameters fed to the renderer each frame
//!
//! - Camera pose and projection
//! - Global render parameters (model transform, light, modes)
//! - RON load/save for parameter files

mod camera;
mod params;

pub use camera::*;
pub use params::*;
