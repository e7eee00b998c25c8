//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::{Vec3, Vec4};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    /// Frame background
    pub const DARK_BLUE: Color = Color { r: 12, g: 20, b: 64, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque color from floating point channels in [0, 1].
    /// Each channel is clamped to [0, 255] after scaling.
    pub fn from_unit(c: Vec3) -> Self {
        let channel = |v: f32| (v * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(channel(c.x), channel(c.y), channel(c.z))
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Mesh vertex: object-space position and normal plus the color resolved
/// from its material
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self { position, normal, color }
    }
}

/// Vertex as it travels between pipeline stages.
///
/// Before perspective division `position` is in clip space and `inv_w` is
/// 1.0. After it, `position` holds NDC (w = 1), `color` is divided by the
/// original w and `inv_w` carries 1/w for perspective-correct interpolation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipVertex {
    pub position: Vec4,
    pub color: Vec3,
    pub inv_w: f32,
}

/// Lighting model applied per vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Falls through to the full ambient + diffuse + specular model
    Flat,
    /// Ambient + diffuse + white specular highlight
    #[default]
    DiffuseSpecular,
    /// Ambient + diffuse
    Diffuse,
    /// Base color only
    Unlit,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 4] = [
        ShadingMode::Flat,
        ShadingMode::DiffuseSpecular,
        ShadingMode::Diffuse,
        ShadingMode::Unlit,
    ];

    pub fn from_index(i: usize) -> Option<ShadingMode> {
        ShadingMode::ALL.get(i).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShadingMode::Flat => "Flat",
            ShadingMode::DiffuseSpecular => "Diffuse + Specular",
            ShadingMode::Diffuse => "Diffuse",
            ShadingMode::Unlit => "Unlit",
        }
    }
}

/// Screen-space winding treated as the visible side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrontFace {
    #[default]
    Ccw,
    Cw,
}

impl FrontFace {
    pub fn toggled(self) -> FrontFace {
        match self {
            FrontFace::Ccw => FrontFace::Cw,
            FrontFace::Cw => FrontFace::Ccw,
        }
    }
}

/// Pixel emission policy of the scan converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    /// Only the triangle corners
    Points,
    /// Span boundary pixels only
    Wireframe,
    #[default]
    Fill,
}

impl DrawMode {
    pub fn next(self) -> DrawMode {
        match self {
            DrawMode::Points => DrawMode::Wireframe,
            DrawMode::Wireframe => DrawMode::Fill,
            DrawMode::Fill => DrawMode::Points,
        }
    }
}

/// How normals are brought into world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalTransform {
    /// Model matrix as-is; only exact for rotations and uniform scale
    #[default]
    ModelMatrix,
    /// Inverse-transpose of the model matrix
    InverseTranspose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unit_clamps() {
        let c = Color::from_unit(Vec3::new(-0.5, 0.5, 3.0));
        assert_eq!(c, Color::new(0, 127, 255));
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_clip_vertex_is_eight_floats() {
        assert_eq!(std::mem::size_of::<ClipVertex>(), 8 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_shading_mode_index() {
        assert_eq!(ShadingMode::from_index(0), Some(ShadingMode::Flat));
        assert_eq!(ShadingMode::from_index(3), Some(ShadingMode::Unlit));
        assert_eq!(ShadingMode::from_index(4), None);
    }
}
