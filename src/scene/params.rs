//! Per-frame render parameters and their RON persistence

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::rasterizer::{DrawMode, FrontFace, Mat4, NormalTransform, ShadingMode, Vec3};
use super::Camera;

/// Everything the pipeline reads at the start of a frame.
///
/// The viewer is the only writer; the renderer takes a shared reference for
/// the duration of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    pub camera: Camera,
    pub model_to_world: Mat4,
    /// Base color in [0, 1]
    pub model_color: Vec3,
    /// Point light, world space
    pub light_position: Vec3,
    pub front_face: FrontFace,
    pub draw_mode: DrawMode,
    pub shading: ShadingMode,
    pub cull_back_faces: bool,
    /// Use the mesh's per-vertex material color instead of `model_color`
    pub use_vertex_colors: bool,
    pub normal_transform: NormalTransform,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            model_to_world: Mat4::IDENTITY,
            model_color: Vec3::new(1.0, 0.55, 0.2),
            light_position: Vec3::new(2.0, 4.0, 6.0),
            front_face: FrontFace::Ccw,
            draw_mode: DrawMode::Fill,
            shading: ShadingMode::DiffuseSpecular,
            cull_back_faces: true,
            use_vertex_colors: false,
            normal_transform: NormalTransform::ModelMatrix,
        }
    }
}

/// Error type for parameter loading
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Load parameters from a RON file
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<GlobalParameters, ParamsError> {
    let contents = fs::read_to_string(path)?;
    load_params_from_str(&contents)
}

/// Load parameters from a RON string
pub fn load_params_from_str(s: &str) -> Result<GlobalParameters, ParamsError> {
    Ok(ron::from_str(s)?)
}

/// Save parameters to a RON file
pub fn save_params<P: AsRef<Path>>(params: &GlobalParameters, path: P) -> Result<(), ParamsError> {
    fs::write(path, params_to_string(params)?)?;
    Ok(())
}

pub fn params_to_string(params: &GlobalParameters) -> Result<String, ParamsError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(params, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let params = load_params_from_str(
            "(shading: Unlit, draw_mode: Wireframe, camera: (fov_y: 30.0))",
        )
        .unwrap();
        assert_eq!(params.shading, ShadingMode::Unlit);
        assert_eq!(params.draw_mode, DrawMode::Wireframe);
        assert_eq!(params.camera.fov_y, 30.0);
        assert_eq!(params.camera.near, Camera::default().near);
        assert_eq!(params.front_face, FrontFace::Ccw);
    }

    #[test]
    fn test_saved_params_load_back() {
        let mut params = GlobalParameters::default();
        params.front_face = FrontFace::Cw;
        params.model_to_world = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        let text = params_to_string(&params).unwrap();
        assert_eq!(load_params_from_str(&text).unwrap(), params);
    }

    #[test]
    fn test_bad_input_is_parse_error() {
        let err = load_params_from_str("(shading: Sparkly)").unwrap_err();
        assert!(matches!(err, ParamsError::Parse(_)));
    }
}
