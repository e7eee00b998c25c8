//! AlmostGL: a small software rasterizer
//!
//! Meshes are lit per vertex, clipped, projected, culled, and scan
//! converted into an RGBA framebuffer each frame. The `almostgl` binary
//! displays that framebuffer in a window.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod scene;
pub mod mesh;
