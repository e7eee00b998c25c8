//! Scanline triangle rasterization
//!
//! Triangles arrive in NDC after perspective division. Each one is mapped to
//! pixel space, its vertices sorted by y, and filled row by row between a
//! long edge (v0 -> v2) and the two short edges (v0 -> v1, then v1 -> v2).
//! Every attribute (x, depth, w-divided color, 1/w) is stepped linearly per
//! row and per pixel; color is divided back by 1/w at each pixel, which makes
//! the result perspective-correct.

use std::ops::{Add, Mul, Sub};
use super::framebuffer::Framebuffer;
use super::math::{Mat4, Vec3};
use super::types::{ClipVertex, Color, DrawMode};

/// Vertex in pixel space, ready for scan conversion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterVertex {
    pub x: i32,
    pub y: i32,
    /// NDC depth
    pub z: f32,
    /// Color already divided by clip w
    pub color: Vec3,
    pub inv_w: f32,
}

impl RasterVertex {
    /// Apply the viewport transform, rounding to the nearest pixel
    pub fn from_ndc(v: &ClipVertex, viewport: &Mat4) -> Self {
        let p = *viewport * v.position;
        Self {
            x: p.x.round() as i32,
            y: p.y.round() as i32,
            z: v.position.z,
            color: v.color,
            inv_w: v.inv_w,
        }
    }

    fn varying(&self) -> Varying {
        Varying {
            x: self.x as f32,
            z: self.z,
            color: self.color,
            inv_w: self.inv_w,
        }
    }
}

/// Everything interpolated across the triangle
#[derive(Debug, Clone, Copy, Default)]
struct Varying {
    x: f32,
    z: f32,
    color: Vec3,
    inv_w: f32,
}

impl Add for Varying {
    type Output = Varying;
    fn add(self, o: Varying) -> Varying {
        Varying {
            x: self.x + o.x,
            z: self.z + o.z,
            color: self.color + o.color,
            inv_w: self.inv_w + o.inv_w,
        }
    }
}

impl Sub for Varying {
    type Output = Varying;
    fn sub(self, o: Varying) -> Varying {
        Varying {
            x: self.x - o.x,
            z: self.z - o.z,
            color: self.color - o.color,
            inv_w: self.inv_w - o.inv_w,
        }
    }
}

impl Mul<f32> for Varying {
    type Output = Varying;
    fn mul(self, s: f32) -> Varying {
        Varying {
            x: self.x * s,
            z: self.z * s,
            color: self.color * s,
            inv_w: self.inv_w * s,
        }
    }
}

/// Edge walker: current value plus the per-row step
#[derive(Debug, Clone, Copy)]
struct Edge {
    current: Varying,
    step: Varying,
}

impl Edge {
    fn new(from: &RasterVertex, to: &RasterVertex) -> Self {
        let dy = to.y - from.y;
        // Horizontal edges never advance
        let step = if dy == 0 {
            Varying::default()
        } else {
            (to.varying() - from.varying()) * (1.0 / dy as f32)
        };
        Self { current: from.varying(), step }
    }

    fn advance(&mut self) {
        self.current = self.current + self.step;
    }
}

/// Which span boundary the short edges drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShortSide {
    DrivesStart,
    DrivesEnd,
}

/// Whether the walk has passed the middle vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeMidpoint,
    AfterMidpoint,
}

/// Rasterize a list of NDC triangles (consecutive triples) into the framebuffer
pub fn rasterize(triangles: &[ClipVertex], mode: DrawMode, fb: &mut Framebuffer) {
    let viewport = Mat4::viewport(fb.width, fb.height);
    for tri in triangles.chunks_exact(3) {
        let verts = [
            RasterVertex::from_ndc(&tri[0], &viewport),
            RasterVertex::from_ndc(&tri[1], &viewport),
            RasterVertex::from_ndc(&tri[2], &viewport),
        ];
        rasterize_triangle(fb, verts, mode);
    }
}

/// Scan convert one triangle already in pixel space
pub fn rasterize_triangle(fb: &mut Framebuffer, mut v: [RasterVertex; 3], mode: DrawMode) {
    v.sort_by_key(|p| p.y);
    let [v0, v1, v2] = v;

    if mode == DrawMode::Points {
        for p in &v {
            shade_fragment(fb, p.x, p.y, &p.varying());
        }
        return;
    }

    // Sign tells which side of the long edge v1 sits on
    let cross = (v1.x - v0.x) as i64 * (v2.y - v0.y) as i64
        - (v1.y - v0.y) as i64 * (v2.x - v0.x) as i64;
    if cross == 0 {
        return;
    }
    let side = if cross > 0 {
        ShortSide::DrivesEnd
    } else {
        ShortSide::DrivesStart
    };

    let mut long = Edge::new(&v0, &v2);
    let mut short = Edge::new(&v0, &v1);
    let mut phase = Phase::BeforeMidpoint;

    for y in v0.y..=v2.y {
        // Switch before this row is stepped; flat-top triangles switch on the first row
        if phase == Phase::BeforeMidpoint && y == v1.y {
            short = Edge::new(&v1, &v2);
            phase = Phase::AfterMidpoint;
        }

        let (start, end) = match side {
            ShortSide::DrivesStart => (short.current, long.current),
            ShortSide::DrivesEnd => (long.current, short.current),
        };
        draw_span(fb, y, start, end, mode);

        long.advance();
        short.advance();
    }
}

fn draw_span(fb: &mut Framebuffer, y: i32, start: Varying, end: Varying, mode: DrawMode) {
    let x_start = start.x.round() as i32;
    let x_end = end.x.round() as i32;

    let dx = end.x - start.x;
    let step = if dx.abs() > f32::EPSILON {
        (end - start) * (1.0 / dx)
    } else {
        Varying::default()
    };

    let mut frag = start + step * (x_start as f32 - start.x);
    for x in x_start..=x_end {
        if mode == DrawMode::Fill || x == x_start || x == x_end {
            shade_fragment(fb, x, y, &frag);
        }
        frag = frag + step;
    }
}

fn shade_fragment(fb: &mut Framebuffer, x: i32, y: i32, frag: &Varying) {
    let color = frag.color * (1.0 / frag.inv_w);
    fb.plot(x, y, frag.z, Color::from_unit(color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vec4;

    const BG: Color = Color::BLACK;

    fn vertex(x: i32, y: i32, z: f32, color: Vec3) -> RasterVertex {
        RasterVertex { x, y, z, color, inv_w: 1.0 }
    }

    fn cleared(w: usize, h: usize) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h);
        fb.clear(BG);
        fb
    }

    #[test]
    fn test_right_triangle_exact_coverage() {
        let mut fb = cleared(100, 100);
        let white = Vec3::ONE;
        rasterize_triangle(
            &mut fb,
            [vertex(10, 10, 0.0, white), vertex(50, 10, 0.0, white), vertex(10, 50, 0.0, white)],
            DrawMode::Fill,
        );

        for y in 0..100 {
            for x in 0..100 {
                let inside = (10..=50).contains(&y) && x >= 10 && x <= 60 - y;
                let expected = if inside { Color::WHITE } else { BG };
                assert_eq!(fb.get_pixel(x as usize, y as usize), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_vertex_order_does_not_matter() {
        let white = Vec3::ONE;
        let a = vertex(10, 10, 0.0, white);
        let b = vertex(50, 10, 0.0, white);
        let c = vertex(10, 50, 0.0, white);

        let mut first = cleared(64, 64);
        rasterize_triangle(&mut first, [a, b, c], DrawMode::Fill);
        let mut second = cleared(64, 64);
        rasterize_triangle(&mut second, [c, b, a], DrawMode::Fill);
        let mut third = cleared(64, 64);
        rasterize_triangle(&mut third, [b, a, c], DrawMode::Fill);

        assert_eq!(first.pixels, second.pixels);
        assert_eq!(first.pixels, third.pixels);
    }

    #[test]
    fn test_general_triangle_switches_edges_at_midpoint() {
        // v1 sits left of the long edge, so the short edges drive the span start
        let mut fb = cleared(40, 40);
        let white = Vec3::ONE;
        rasterize_triangle(
            &mut fb,
            [vertex(20, 0, 0.0, white), vertex(0, 20, 0.0, white), vertex(30, 30, 0.0, white)],
            DrawMode::Fill,
        );

        // Below the midpoint the left boundary follows v1 -> v2, not v0 -> v1 extended
        assert_eq!(fb.get_pixel(0, 20), Color::WHITE);
        assert_eq!(fb.get_pixel(0, 21), BG);
        assert_eq!(fb.get_pixel(2, 21), BG);
        assert_eq!(fb.get_pixel(3, 21), Color::WHITE);
        assert_eq!(fb.get_pixel(30, 30), Color::WHITE);
        assert_eq!(fb.get_pixel(29, 30), BG);
        // Nothing past the bottom vertex
        assert!((0..40).all(|x| fb.get_pixel(x, 31) == BG));
    }

    #[test]
    fn test_wireframe_only_boundaries() {
        let mut fb = cleared(100, 100);
        let white = Vec3::ONE;
        rasterize_triangle(
            &mut fb,
            [vertex(10, 10, 0.0, white), vertex(50, 10, 0.0, white), vertex(10, 50, 0.0, white)],
            DrawMode::Wireframe,
        );
        // Row 20 spans [10, 40]
        assert_eq!(fb.get_pixel(10, 20), Color::WHITE);
        assert_eq!(fb.get_pixel(40, 20), Color::WHITE);
        assert_eq!(fb.get_pixel(25, 20), BG);
        assert_eq!(fb.get_pixel(30, 10), BG);
    }

    #[test]
    fn test_points_only_corners() {
        let mut fb = cleared(100, 100);
        let white = Vec3::ONE;
        rasterize_triangle(
            &mut fb,
            [vertex(10, 10, 0.0, white), vertex(50, 10, 0.0, white), vertex(10, 50, 0.0, white)],
            DrawMode::Points,
        );
        let lit = fb.pixels.chunks_exact(4).filter(|p| p[0] == 255).count();
        assert_eq!(lit, 3);
        assert_eq!(fb.get_pixel(50, 10), Color::WHITE);
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut fb = cleared(32, 32);
        let white = Vec3::ONE;
        // Collinear
        rasterize_triangle(
            &mut fb,
            [vertex(2, 2, 0.0, white), vertex(10, 10, 0.0, white), vertex(20, 20, 0.0, white)],
            DrawMode::Fill,
        );
        // Zero height
        rasterize_triangle(
            &mut fb,
            [vertex(2, 5, 0.0, white), vertex(10, 5, 0.0, white), vertex(20, 5, 0.0, white)],
            DrawMode::Fill,
        );
        assert!(fb.pixels.chunks_exact(4).all(|p| p == BG.to_bytes()));
    }

    #[test]
    fn test_depth_is_order_independent() {
        let red = Vec3::new(1.0, 0.0, 0.0);
        let green = Vec3::new(0.0, 1.0, 0.0);
        let far = [vertex(0, 0, 0.5, red), vertex(30, 0, 0.5, red), vertex(0, 30, 0.5, red)];
        let near = [vertex(0, 0, -0.5, green), vertex(30, 0, -0.5, green), vertex(0, 30, -0.5, green)];

        let mut fb = cleared(32, 32);
        rasterize_triangle(&mut fb, far, DrawMode::Fill);
        rasterize_triangle(&mut fb, near, DrawMode::Fill);
        assert_eq!(fb.get_pixel(5, 5), Color::new(0, 255, 0));

        let mut fb = cleared(32, 32);
        rasterize_triangle(&mut fb, near, DrawMode::Fill);
        rasterize_triangle(&mut fb, far, DrawMode::Fill);
        assert_eq!(fb.get_pixel(5, 5), Color::new(0, 255, 0));
        assert!((fb.get_depth(5, 5) + 0.5).abs() < 0.001);
    }

    #[test]
    fn test_perspective_correct_color() {
        // Near vertex at w = 1, far vertices at w = 10, colors pre-divided by w
        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let near = RasterVertex { x: 0, y: 0, z: 0.0, color: red, inv_w: 1.0 };
        let far_a = RasterVertex { x: 0, y: 80, z: 0.9, color: blue * 0.1, inv_w: 0.1 };
        let far_b = RasterVertex { x: 80, y: 80, z: 0.9, color: blue * 0.1, inv_w: 0.1 };

        let mut fb = cleared(100, 100);
        rasterize_triangle(&mut fb, [near, far_a, far_b], DrawMode::Fill);

        // Screen-space halfway down the left edge
        let c = fb.get_pixel(0, 40);
        let naive = Color::from_unit(red * 0.5 + blue * 0.5);
        assert_ne!(c, naive);
        // Perspective weighting keeps it close to the near color:
        // (1 * red + 0.1 * blue) / 1.1
        assert!(c.r >= 230, "red channel {}", c.r);
        assert!(c.b <= 25, "blue channel {}", c.b);
    }

    #[test]
    fn test_rasterize_from_ndc() {
        let mut fb = cleared(10, 10);
        let v = |x: f32, y: f32| ClipVertex {
            position: Vec4::new(x, y, 0.0, 1.0),
            color: Vec3::ONE,
            inv_w: 1.0,
        };
        // Upper-left quadrant, counter-clockwise in NDC
        rasterize(&[v(-1.0, 0.0), v(0.0, 0.0), v(-1.0, 1.0)], DrawMode::Fill, &mut fb);
        assert_eq!(fb.get_pixel(0, 0), Color::WHITE);
        assert_eq!(fb.get_pixel(1, 4), Color::WHITE);
        assert_eq!(fb.get_pixel(9, 9), BG);
        assert_eq!(fb.get_pixel(0, 9), BG);
    }
}
