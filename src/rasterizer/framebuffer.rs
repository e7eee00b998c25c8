//! Color and depth buffers the rasterizer writes into

use std::path::Path;
use super::types::Color;

/// Depth every cell is reset to; farther than any NDC z in [-1, 1]
pub const DEPTH_CLEAR: f32 = 2.0;

/// Error type for framebuffer export
#[derive(Debug, thiserror::Error)]
pub enum FramebufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Framebuffer of {width}x{height} has no pixels")]
    Empty { width: usize, height: usize },
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,    // RGBA, 4 bytes per pixel, top row first
    pub zbuffer: Vec<f32>,  // Depth buffer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![DEPTH_CLEAR; width * height],
            width,
            height,
        }
    }

    /// Rebuild both buffers for a new size, discarding old contents
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        log::info!("Framebuffer resize {}x{} -> {}x{}", self.width, self.height, width, height);
        *self = Framebuffer::new(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(DEPTH_CLEAR);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Depth-tested write. Returns true when the fragment was nearer than the
    /// stored depth and got written.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if z < self.zbuffer[idx] {
                self.zbuffer[idx] = z;
                let pixel_idx = idx * 4;
                self.pixels[pixel_idx..pixel_idx + 4].copy_from_slice(&color.to_bytes());
                return true;
            }
        }
        false
    }

    /// Signed-coordinate entry point used by the scan converter.
    ///
    /// Clipping keeps NDC inside [-1, 1], which the viewport maps to
    /// [0, width] x [0, height]; the far edge is one past the last pixel and
    /// is dropped here. Anything further out means the clip stage let a
    /// triangle through that it should not have.
    pub fn plot(&mut self, x: i32, y: i32, z: f32, color: Color) -> bool {
        debug_assert!(
            x >= 0 && y >= 0 && x <= self.width as i32 && y <= self.height as i32,
            "pixel ({}, {}) outside {}x{} viewport",
            x,
            y,
            self.width,
            self.height
        );
        if x < 0 || y < 0 {
            return false;
        }
        self.set_pixel_with_depth(x as usize, y as usize, z, color)
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Color {
                r: self.pixels[idx],
                g: self.pixels[idx + 1],
                b: self.pixels[idx + 2],
                a: self.pixels[idx + 3],
            }
        } else {
            Color::BLACK
        }
    }

    pub fn get_depth(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.zbuffer[y * self.width + x]
        } else {
            DEPTH_CLEAR
        }
    }

    /// Write the color buffer to a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), FramebufferError> {
        if self.pixels.is_empty() {
            return Err(FramebufferError::Empty { width: self.width, height: self.height });
        }
        image::save_buffer(
            path.as_ref(),
            &self.pixels,
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        log::info!("Saved frame to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_color_and_depth() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set_pixel_with_depth(1, 1, 0.5, Color::WHITE);
        fb.clear(Color::DARK_BLUE);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(fb.get_pixel(x, y), Color::DARK_BLUE);
                assert_eq!(fb.get_depth(x, y), DEPTH_CLEAR);
            }
        }
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(Color::BLACK);
        assert!(fb.set_pixel_with_depth(0, 0, 0.5, Color::WHITE));
        assert!(!fb.set_pixel_with_depth(0, 0, 0.7, Color::new(255, 0, 0)));
        assert_eq!(fb.get_pixel(0, 0), Color::WHITE);
        assert!(fb.set_pixel_with_depth(0, 0, -0.2, Color::new(0, 255, 0)));
        assert_eq!(fb.get_pixel(0, 0), Color::new(0, 255, 0));
    }

    #[test]
    fn test_plot_drops_far_edge() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::BLACK);
        assert!(!fb.plot(4, 2, 0.0, Color::WHITE));
        assert!(!fb.plot(2, 4, 0.0, Color::WHITE));
        assert!(fb.plot(3, 3, 0.0, Color::WHITE));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(Color::WHITE);
        fb.resize(3, 2);
        assert_eq!(fb.pixels.len(), 3 * 2 * 4);
        assert_eq!(fb.zbuffer.len(), 3 * 2);
        assert!(fb.pixels.iter().all(|&b| b == 0));
    }
}
