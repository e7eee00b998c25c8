//! Triangle meshes handed to the renderer
//!
//! A mesh is an immutable triangle soup: every triangle owns its three
//! vertices, so shared corners are duplicated. Vertices carry the diffuse
//! color of their material.

mod loader;

pub use loader::*;

use crate::rasterizer::{Mat4, Vec3, Vertex};

/// Surface material as stored in mesh files
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ONE * 0.2,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 15.0,
        }
    }
}

/// A triangle face with its three vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    /// Face normal as given by the source, may be zero
    pub normal: Vec3,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Immutable triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    materials: Vec<Material>,
    triangles: Vec<Triangle>,
    /// Triangle vertices flattened in submission order, 3 per triangle
    vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>, materials: Vec<Material>) -> Self {
        let vertices = triangles.iter().flat_map(|t| t.vertices).collect();
        Self {
            name: name.into(),
            materials,
            triangles,
            vertices,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// All vertices, three consecutive entries per triangle
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of all vertex positions, None for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?.position;
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(v.position), hi.max(v.position)));
        Some(Bounds { min, max })
    }

    /// Model-to-world transform that centers the mesh on the origin and
    /// scales its largest extent to 2 units
    pub fn centering_transform(&self) -> Mat4 {
        let Some(bounds) = self.bounds() else {
            return Mat4::IDENTITY;
        };
        let extent = bounds.extent();
        let largest = extent.x.max(extent.y).max(extent.z);
        let scale = if largest > f32::EPSILON { 2.0 / largest } else { 1.0 };
        Mat4::scaling(Vec3::ONE * scale) * Mat4::translation(-bounds.center())
    }

    /// Cube spanning [-1, 1] on every axis, faces counter-clockwise from outside
    pub fn cube() -> Mesh {
        let material = Material::default();

        let corners = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];

        // Quads as corner indices, counter-clockwise seen from outside
        let faces: [([usize; 4], Vec3); 6] = [
            ([4, 5, 6, 7], Vec3::new(0.0, 0.0, 1.0)),  // Front
            ([1, 0, 3, 2], Vec3::new(0.0, 0.0, -1.0)), // Back
            ([3, 7, 6, 2], Vec3::new(0.0, 1.0, 0.0)),  // Top
            ([0, 1, 5, 4], Vec3::new(0.0, -1.0, 0.0)), // Bottom
            ([5, 1, 2, 6], Vec3::new(1.0, 0.0, 0.0)),  // Right
            ([0, 4, 7, 3], Vec3::new(-1.0, 0.0, 0.0)), // Left
        ];

        let mut triangles = Vec::with_capacity(12);
        for (quad, normal) in faces {
            let v = |i: usize| Vertex::new(corners[quad[i]], normal, material.diffuse);
            triangles.push(Triangle { vertices: [v(0), v(1), v(2)], normal });
            triangles.push(Triangle { vertices: [v(0), v(2), v(3)], normal });
        }

        Mesh::new("cube", triangles, vec![material])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.vertices()[3], cube.triangles()[1].vertices[0]);
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        for tri in Mesh::cube().triangles() {
            let [a, b, c] = tri.vertices;
            let n = (b.position - a.position).cross(c.position - a.position);
            assert!(n.dot(tri.normal) > 0.0);
        }
    }

    #[test]
    fn test_centering_transform() {
        let v = |x, y, z| Vertex::new(Vec3::new(x, y, z), Vec3::UP, Vec3::ONE);
        let tri = Triangle {
            vertices: [v(10.0, 0.0, 0.0), v(14.0, 0.0, 0.0), v(10.0, 2.0, 0.0)],
            normal: Vec3::ZERO,
        };
        let mesh = Mesh::new("offset", vec![tri], Vec::new());
        let m = mesh.centering_transform();

        let lo = m * Vec3::new(10.0, 0.0, 0.0).to_point();
        let hi = m * Vec3::new(14.0, 2.0, 0.0).to_point();
        assert!((lo.x + 1.0).abs() < 0.001 && (lo.y + 0.5).abs() < 0.001);
        assert!((hi.x - 1.0).abs() < 0.001 && (hi.y - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::default();
        assert!(mesh.bounds().is_none());
        assert_eq!(mesh.centering_transform(), Mat4::IDENTITY);
    }
}
