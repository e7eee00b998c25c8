//! Mesh file loading
//!
//! Plain-text triangle format:
//!
//! ```text
//! Object name = cube
//! # triangles = 12
//! Material count = 1
//! ambient color 0.2 0.2 0.2
//! diffuse color 0.8 0.1 0.1
//! specular color 1.0 1.0 1.0
//! material shine 15.0
//! -- 3*[pos(x,y,z) normal(x,y,z) color_index] face_normal(x,y,z)
//! v0 -1.0 -1.0 1.0 0.0 0.0 1.0 0
//! v1 1.0 -1.0 1.0 0.0 0.0 1.0 0
//! v2 1.0 1.0 1.0 0.0 0.0 1.0 0
//! face normal 0.0 0.0 1.0
//! ...
//! ```
//!
//! Blank lines and lines starting with `--` are ignored.

use std::fs;
use std::path::Path;
use crate::rasterizer::{Vec3, Vertex};
use super::{Material, Mesh, Triangle};

/// Error type for mesh loading
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected '{expected}'")]
    Syntax { line: usize, expected: &'static str },
    #[error("line {line}: invalid number '{token}'")]
    Number { line: usize, token: String },
    #[error("line {line}: expected {expected} values, found {found}")]
    FieldCount { line: usize, expected: usize, found: usize },
    #[error("unexpected end of file, expected '{expected}'")]
    UnexpectedEof { expected: &'static str },
    #[error("triangle {triangle}: material index {index} out of range ({count} materials)")]
    MaterialIndex { triangle: usize, index: usize, count: usize },
}

/// Load a mesh from a file
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let mesh = parse_mesh(&contents)?;
    log::info!(
        "Loaded mesh '{}' from {}: {} triangles, {} materials",
        mesh.name,
        path.as_ref().display(),
        mesh.triangle_count(),
        mesh.materials().len()
    );
    Ok(mesh)
}

/// Parse a mesh from its text contents
pub fn parse_mesh(src: &str) -> Result<Mesh, MeshError> {
    let mut reader = Reader::new(src);

    let (_, name) = reader.field("Object name =")?;
    let (line, n_tris) = reader.field("# triangles =")?;
    let n_tris = parse_count(line, n_tris)?;
    let (line, n_mats) = reader.field("Material count =")?;
    let n_mats = parse_count(line, n_mats)?;

    let mut materials = Vec::with_capacity(n_mats);
    for _ in 0..n_mats {
        let ambient = reader.vec3("ambient color")?;
        let diffuse = reader.vec3("diffuse color")?;
        let specular = reader.vec3("specular color")?;
        let (line, shine) = reader.field("material shine")?;
        let [shininess] = parse_floats::<1>(line, shine)?;
        materials.push(Material { ambient, diffuse, specular, shininess });
    }

    let mut triangles = Vec::with_capacity(n_tris);
    for triangle in 0..n_tris {
        let mut vertices = [Vertex::default(); 3];
        for (slot, prefix) in ["v0", "v1", "v2"].into_iter().enumerate() {
            let (line, rest) = reader.field(prefix)?;
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if tokens.len() != 7 {
                return Err(MeshError::FieldCount { line, expected: 7, found: tokens.len() });
            }
            let f = tokens[..6]
                .iter()
                .map(|t| parse_float(line, t))
                .collect::<Result<Vec<f32>, _>>()?;
            let index = parse_count(line, tokens[6])?;
            let material = materials.get(index).ok_or(MeshError::MaterialIndex {
                triangle,
                index,
                count: materials.len(),
            })?;

            vertices[slot] = Vertex::new(
                Vec3::new(f[0], f[1], f[2]),
                Vec3::new(f[3], f[4], f[5]),
                material.diffuse,
            );
        }
        let normal = reader.vec3("face normal")?;
        triangles.push(Triangle { vertices, normal });
    }

    Ok(Mesh::new(name, triangles, materials))
}

/// Line cursor that skips blanks and `--` comments and tracks line numbers
struct Reader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self { lines: src.lines().enumerate() }
    }

    /// Next meaningful line, which must start with `prefix`; returns the rest
    fn field(&mut self, prefix: &'static str) -> Result<(usize, &'a str), MeshError> {
        for (i, raw) in self.lines.by_ref() {
            let text = raw.trim();
            if text.is_empty() || text.starts_with("--") {
                continue;
            }
            let line = i + 1;
            return text
                .strip_prefix(prefix)
                .map(|rest| (line, rest.trim()))
                .ok_or(MeshError::Syntax { line, expected: prefix });
        }
        Err(MeshError::UnexpectedEof { expected: prefix })
    }

    fn vec3(&mut self, prefix: &'static str) -> Result<Vec3, MeshError> {
        let (line, rest) = self.field(prefix)?;
        let [x, y, z] = parse_floats::<3>(line, rest)?;
        Ok(Vec3::new(x, y, z))
    }
}

fn parse_float(line: usize, token: &str) -> Result<f32, MeshError> {
    token.parse().map_err(|_| MeshError::Number { line, token: token.to_string() })
}

fn parse_count(line: usize, token: &str) -> Result<usize, MeshError> {
    token.parse().map_err(|_| MeshError::Number { line, token: token.to_string() })
}

fn parse_floats<const N: usize>(line: usize, text: &str) -> Result<[f32; N], MeshError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != N {
        return Err(MeshError::FieldCount { line, expected: N, found: tokens.len() });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = parse_float(line, token)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRIANGLES: &str = "\
Object name = quad
# triangles = 2
Material count = 2
ambient color 0.1 0.1 0.1
diffuse color 1.0 0.0 0.0
specular color 1.0 1.0 1.0
material shine 10.0
ambient color 0.1 0.1 0.1
diffuse color 0.0 0.0 1.0
specular color 0.5 0.5 0.5
material shine 20.0
-- 3*[pos(x,y,z) normal(x,y,z) color_index] face_normal(x,y,z)
v0 -1.0 -1.0 0.0 0.0 0.0 1.0 0
v1 1.0 -1.0 0.0 0.0 0.0 1.0 0
v2 1.0 1.0 0.0 0.0 0.0 1.0 0
face normal 0.0 0.0 1.0

v0 -1.0 -1.0 0.0 0.0 0.0 1.0 1
v1 1.0 1.0 0.0 0.0 0.0 1.0 1
v2 -1.0 1.0 0.0 0.0 0.0 1.0 1
face normal 0.0 0.0 1.0
";

    #[test]
    fn test_parse_mesh() {
        let mesh = parse_mesh(TWO_TRIANGLES).unwrap();
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.materials().len(), 2);
        assert_eq!(mesh.materials()[1].shininess, 20.0);

        let v = mesh.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(v[1].position, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(v[1].normal, Vec3::new(0.0, 0.0, 1.0));
        // Vertex color comes from its material's diffuse term
        assert_eq!(v[0].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(v[5].color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_material_index_out_of_range() {
        let src = TWO_TRIANGLES.replace("1.0 1.0 0.0 0.0 0.0 1.0 1", "1.0 1.0 0.0 0.0 0.0 1.0 7");
        let err = parse_mesh(&src).unwrap_err();
        assert!(matches!(err, MeshError::MaterialIndex { triangle: 1, index: 7, count: 2 }));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let src = TWO_TRIANGLES.replace("material shine 10.0", "material shine ten");
        match parse_mesh(&src).unwrap_err() {
            MeshError::Number { line, token } => {
                assert_eq!(line, 7);
                assert_eq!(token, "ten");
            }
            e => panic!("unexpected error {}", e),
        }
    }

    #[test]
    fn test_truncated_file() {
        let cut = &TWO_TRIANGLES[..TWO_TRIANGLES.find("face normal").unwrap()];
        assert!(matches!(
            parse_mesh(cut).unwrap_err(),
            MeshError::UnexpectedEof { expected: "face normal" }
        ));
    }

    #[test]
    fn test_missing_header() {
        let err = parse_mesh("# triangles = 0\n").unwrap_err();
        assert!(matches!(err, MeshError::Syntax { line: 1, expected: "Object name =" }));
    }

    #[test]
    fn test_empty_mesh_file() {
        let mesh = parse_mesh("Object name = nothing\n# triangles = 0\nMaterial count = 0\n").unwrap();
        assert_eq!(mesh.vertex_count(), 0);
    }
}
