//! Per-frame pipeline: vertex processing, clipping, perspective division,
//! back-face culling, then scan conversion into the framebuffer.
//!
//! Each stage reads the previous stage's buffer and writes a compacted copy
//! into its own. Buffers are sized to the mesh vertex count once and reused;
//! a stage can only keep or drop vertices, never add them.

use std::time::{Duration, Instant};
use crate::mesh::Mesh;
use crate::scene::GlobalParameters;
use super::framebuffer::Framebuffer;
use super::math::{Vec3, Vec4};
use super::scanline::rasterize;
use super::types::{ClipVertex, Color, FrontFace, NormalTransform, ShadingMode, Vertex};

/// Constant ambient term
pub const AMBIENT: f32 = 0.2;
/// Specular exponent
pub const SHININESS: f32 = 15.0;
/// Frame background
pub const BACKGROUND: Color = Color::DARK_BLUE;

/// Preallocated vertex buffer with a used-length counter
#[derive(Debug, Clone, Default)]
pub struct StageBuffer {
    data: Vec<ClipVertex>,
    last: usize,
}

impl StageBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![ClipVertex::default(); capacity],
            last: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }

    pub fn push(&mut self, v: ClipVertex) {
        debug_assert!(self.last < self.data.len(), "stage buffer overflow");
        self.data[self.last] = v;
        self.last += 1;
    }

    fn extend_from_slice(&mut self, vs: &[ClipVertex]) {
        let end = self.last + vs.len();
        debug_assert!(end <= self.data.len(), "stage buffer overflow");
        self.data[self.last..end].copy_from_slice(vs);
        self.last = end;
    }

    /// Grow to at least `capacity` slots, dropping contents
    fn reserve_slots(&mut self, capacity: usize) {
        if self.data.len() < capacity {
            self.data = vec![ClipVertex::default(); capacity];
        }
        self.last = 0;
    }

    pub fn as_slice(&self) -> &[ClipVertex] {
        &self.data[..self.last]
    }
}

/// Transform every vertex to clip space and light it
pub fn process_vertices(vertices: &[Vertex], params: &GlobalParameters, out: &mut StageBuffer) {
    out.reset();

    let camera = &params.camera;
    let model = params.model_to_world;
    let normal_matrix = match params.normal_transform {
        NormalTransform::ModelMatrix => model,
        NormalTransform::InverseTranspose => model.normal_matrix().unwrap_or_else(|| {
            log::debug!("Model matrix is singular, transforming normals with it directly");
            model
        }),
    };
    let view_projection = camera.projection_matrix() * camera.view_matrix();

    for v in vertices {
        let world = model * v.position.to_point();
        let normal = (normal_matrix * v.normal.to_direction()).xyz().unit();
        let base = if params.use_vertex_colors { v.color } else { params.model_color };
        let color = shade(world.xyz(), normal, base, camera.eye, params.light_position, params.shading);

        out.push(ClipVertex {
            position: view_projection * world,
            color,
            inv_w: 1.0,
        });
    }
}

/// Blinn-Phong style lighting at one vertex.
///
/// Lit sides face away from the stored normal direction: diffuse and
/// specular use the negated normal.
pub fn shade(position: Vec3, normal: Vec3, base: Vec3, eye: Vec3, light: Vec3, mode: ShadingMode) -> Vec3 {
    let to_light = (light - position).unit();
    let to_eye = (eye - position).unit();
    let half = (to_light + to_eye).unit();

    let diffuse = to_light.dot(-normal).max(0.0);
    let specular = half.dot(-normal).max(0.0).powf(SHININESS);

    match mode {
        ShadingMode::Diffuse => base * (AMBIENT + diffuse),
        ShadingMode::Unlit => base,
        ShadingMode::DiffuseSpecular | ShadingMode::Flat => {
            base * (AMBIENT + diffuse) + Vec3::ONE * specular
        }
    }
}

fn inside_clip_volume(p: &Vec4) -> bool {
    p.w > 0.0 && p.x.abs() <= p.w && p.y.abs() <= p.w && p.z.abs() <= p.w
}

/// Keep only triangles with every vertex inside the canonical clip volume.
/// Triangles crossing any plane are dropped whole.
pub fn clip_triangles(input: &[ClipVertex], out: &mut StageBuffer) {
    out.reset();
    for tri in input.chunks_exact(3) {
        if tri.iter().all(|v| inside_clip_volume(&v.position)) {
            out.extend_from_slice(tri);
        }
    }
}

/// Divide position and color by w, carrying 1/w forward
pub fn perspective_divide(input: &[ClipVertex], out: &mut StageBuffer) {
    out.reset();
    for v in input {
        let inv_w = 1.0 / v.position.w;
        let p = v.position;
        out.push(ClipVertex {
            position: Vec4::new(p.x * inv_w, p.y * inv_w, p.z * inv_w, 1.0),
            color: v.color * inv_w,
            inv_w,
        });
    }
}

/// Twice the signed NDC area; positive for counter-clockwise triangles
pub fn signed_area(a: &Vec4, b: &Vec4, c: &Vec4) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Drop triangles facing away from the viewer under the given winding
pub fn cull_back_faces(input: &[ClipVertex], front_face: FrontFace, enabled: bool, out: &mut StageBuffer) {
    out.reset();
    for tri in input.chunks_exact(3) {
        let area = signed_area(&tri[0].position, &tri[1].position, &tri[2].position);
        let front = match front_face {
            FrontFace::Ccw => area > 0.0,
            FrontFace::Cw => area < 0.0,
        };
        if front || !enabled {
            out.extend_from_slice(tri);
        }
    }
}

/// Timing and triangle counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub elapsed: Duration,
    pub triangles_in: usize,
    pub triangles_clipped: usize,
    pub triangles_culled: usize,
    pub triangles_drawn: usize,
}

impl FrameStats {
    pub fn fps(&self) -> f32 {
        let secs = self.elapsed.as_secs_f32();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}

/// Finished frame handed to the display
pub struct Frame<'a> {
    /// RGBA, row-major, top row first
    pub pixels: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub stats: FrameStats,
}

/// Owns the stage buffers and the framebuffer
pub struct Renderer {
    raw: StageBuffer,
    clipped: StageBuffer,
    projected: StageBuffer,
    culled: StageBuffer,
    framebuffer: Framebuffer,
    last_frame: FrameStats,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            raw: StageBuffer::default(),
            clipped: StageBuffer::default(),
            projected: StageBuffer::default(),
            culled: StageBuffer::default(),
            framebuffer: Framebuffer::new(width, height),
            last_frame: FrameStats::default(),
        }
    }

    /// Size stage buffers for a mesh
    pub fn load_mesh(&mut self, mesh: &Mesh) {
        log::info!(
            "Sizing pipeline for '{}' ({} vertices)",
            mesh.name,
            mesh.vertex_count()
        );
        self.reserve(mesh.vertex_count());
    }

    fn reserve(&mut self, vertex_count: usize) {
        if self.raw.capacity() < vertex_count {
            log::debug!("Growing stage buffers {} -> {}", self.raw.capacity(), vertex_count);
        }
        self.raw.reserve_slots(vertex_count);
        self.clipped.reserve_slots(vertex_count);
        self.projected.reserve_slots(vertex_count);
        self.culled.reserve_slots(vertex_count);
    }

    /// Rebuild the pixel buffers for a new display size
    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer.resize(width, height);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Render one frame of `mesh` with the given parameter snapshot
    pub fn render(&mut self, mesh: &Mesh, params: &GlobalParameters) -> Frame<'_> {
        let started = Instant::now();

        if self.raw.capacity() < mesh.vertex_count() {
            self.reserve(mesh.vertex_count());
        }
        self.framebuffer.clear(BACKGROUND);

        process_vertices(mesh.vertices(), params, &mut self.raw);
        clip_triangles(self.raw.as_slice(), &mut self.clipped);
        perspective_divide(self.clipped.as_slice(), &mut self.projected);
        cull_back_faces(
            self.projected.as_slice(),
            params.front_face,
            params.cull_back_faces,
            &mut self.culled,
        );
        rasterize(self.culled.as_slice(), params.draw_mode, &mut self.framebuffer);

        let triangles_in = self.raw.len() / 3;
        let after_clip = self.clipped.len() / 3;
        let drawn = self.culled.len() / 3;
        self.last_frame = FrameStats {
            elapsed: started.elapsed(),
            triangles_in,
            triangles_clipped: triangles_in - after_clip,
            triangles_culled: after_clip - drawn,
            triangles_drawn: drawn,
        };
        log::trace!("{:?}", self.last_frame);

        Frame {
            pixels: &self.framebuffer.pixels,
            width: self.framebuffer.width,
            height: self.framebuffer.height,
            stats: self.last_frame,
        }
    }
}
