//! Vector and matrix math for the pipeline
//!
//! Small value types sized for what the stages need: 3/4 component vectors
//! and a column-major 4x4 matrix with view, projection and viewport builders.

use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// Zero-length input is a caller error and yields NaN components.
    pub fn unit(self) -> Vec3 {
        self * (1.0 / self.len())
    }

    /// Component-wise product (color modulation)
    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Homogeneous point (w = 1)
    pub fn to_point(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 1.0)
    }

    /// Homogeneous direction (w = 0), unaffected by translation
    pub fn to_direction(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 0.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

/// Homogeneous 4D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Drop w without dividing
    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    fn get(self, i: usize) -> f32 {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => self.w,
        }
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4::new(self.x - other.x, self.y - other.y, self.z - other.z, self.w - other.w)
    }
}

impl Neg for Vec4 {
    type Output = Vec4;
    fn neg(self) -> Vec4 {
        Vec4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

/// 4x4 matrix, column-major storage.
///
/// `m[(i, j)]` is row `i`, column `j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    e: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;
    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        &self.e[i + 4 * j]
    }
}

impl IndexMut<(usize, usize)> for Mat4 {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        &mut self.e[i + 4 * j]
    }
}

impl Mat4 {
    pub const ZERO: Mat4 = Mat4 { e: [0.0; 16] };
    pub const IDENTITY: Mat4 = Mat4 {
        e: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_columns(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        let mut m = Mat4::ZERO;
        for i in 0..4 {
            m[(i, 0)] = c0.get(i);
            m[(i, 1)] = c1.get(i);
            m[(i, 2)] = c2.get(i);
            m[(i, 3)] = c3.get(i);
        }
        m
    }

    /// Column-major float slice, as a GPU would expect it
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.e
    }

    pub fn transpose(&self) -> Mat4 {
        let mut out = Mat4::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                out[(i, j)] = self[(j, i)];
            }
        }
        out
    }

    pub fn translation(t: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m[(0, 3)] = t.x;
        m[(1, 3)] = t.y;
        m[(2, 3)] = t.z;
        m
    }

    pub fn scaling(s: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m[(0, 0)] = s.x;
        m[(1, 1)] = s.y;
        m[(2, 2)] = s.z;
        m
    }

    /// Rotation about the x axis (radians)
    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut m = Mat4::IDENTITY;
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        m
    }

    /// Rotation about the y axis (radians)
    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut m = Mat4::IDENTITY;
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        m
    }

    /// Inverse-transpose of the upper 3x3 block, embedded in a 4x4.
    /// Returns None when that block is singular.
    pub fn normal_matrix(&self) -> Option<Mat4> {
        let a = Vec3::new(self[(0, 0)], self[(1, 0)], self[(2, 0)]);
        let b = Vec3::new(self[(0, 1)], self[(1, 1)], self[(2, 1)]);
        let c = Vec3::new(self[(0, 2)], self[(1, 2)], self[(2, 2)]);

        let det = a.dot(b.cross(c));
        if det.abs() < f32::EPSILON {
            return None;
        }

        // Rows of the inverse are (b x c, c x a, a x b) / det, so they are
        // the columns of the inverse-transpose.
        let inv_det = 1.0 / det;
        let c0 = b.cross(c) * inv_det;
        let c1 = c.cross(a) * inv_det;
        let c2 = a.cross(b) * inv_det;

        Some(Mat4::from_columns(
            c0.to_direction(),
            c1.to_direction(),
            c2.to_direction(),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ))
    }

    /// Right-handed look-at matrix.
    ///
    /// Takes the eye position and a viewing direction; the target point is
    /// `eye + look_dir`. `look_dir` and `up` must not be zero or parallel.
    pub fn view(eye: Vec3, look_dir: Vec3, up: Vec3) -> Mat4 {
        let target = eye + look_dir;
        let w = (eye - target).unit();
        let u = up.cross(w).unit();
        let v = w.cross(u);

        Mat4::from_columns(
            Vec4::new(u.x, v.x, w.x, 0.0),
            Vec4::new(u.y, v.y, w.y, 0.0),
            Vec4::new(u.z, v.z, w.z, 0.0),
            Vec4::new(-eye.dot(u), -eye.dot(v), -eye.dot(w), 1.0),
        )
    }

    /// Perspective projection from independent vertical and horizontal
    /// fields of view (degrees). Clip w = -z_view; view z = -near maps to
    /// NDC -1 and z = -far to +1. Requires `far > near > 0`.
    pub fn perspective(fov_y: f32, fov_x: f32, near: f32, far: f32) -> Mat4 {
        let t = (fov_y * 0.5).to_radians().tan() * near;
        let b = -t;
        let r = (fov_x * 0.5).to_radians().tan() * near;
        let l = -r;

        // Shear centers skewed frustums; zero for symmetric bounds.
        let g = (l + r) / (2.0 * near);
        let h = (t + b) / (2.0 * near);
        let shear = Mat4::from_columns(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(g, h, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        );

        // Scale the view plane corners to (+-near, +-near): a 90 degree frustum.
        let sx = (2.0 * near) / (r - l);
        let sy = (2.0 * near) / (t - b);
        let scale = Mat4::scaling(Vec3::new(sx, sy, 1.0));

        let alpha = (near + far) / (near - far);
        let beta = (2.0 * near * far) / (near - far);
        let norm = Mat4::from_columns(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, alpha, -1.0),
            Vec4::new(0.0, 0.0, beta, 0.0),
        );

        norm * scale * shear
    }

    /// NDC to pixel space. x in [-1, 1] maps to [0, width]; y is flipped so
    /// NDC +1 is row 0 (top of the color buffer) and -1 is row `height`.
    /// z passes through.
    pub fn viewport(width: usize, height: usize) -> Mat4 {
        let hw = width as f32 * 0.5;
        let hh = height as f32 * 0.5;
        let mut m = Mat4::IDENTITY;
        m[(0, 0)] = hw;
        m[(0, 3)] = hw;
        m[(1, 1)] = -hh;
        m[(1, 3)] = hh;
        m
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = Mat4::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    out[(i, j)] += self[(i, k)] * rhs[(k, j)];
                }
            }
        }
        out
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let row = |i: usize| {
            self[(i, 0)] * v.x + self[(i, 1)] * v.y + self[(i, 2)] * v.z + self[(i, 3)] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}
