//! Software triangle rasterizer
//!
//! Fixed-function pipeline in the style of early OpenGL:
//! - Per-vertex lighting (ambient, diffuse, specular)
//! - Whole-triangle clipping against the view volume
//! - Back-face culling with selectable winding
//! - Scanline fill with perspective-correct color and a depth buffer
//! - Points, wireframe, and filled draw modes

mod math;
mod types;
mod framebuffer;
mod scanline;
mod pipeline;

pub use math::*;
pub use types::*;
pub use framebuffer::*;
pub use scanline::*;
pub use pipeline::*;

/// Initial window size for the viewer
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
