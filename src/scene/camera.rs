//! Camera pose and projection parameters

use serde::{Serialize, Deserialize};
use crate::rasterizer::{Mat4, Vec3};

/// Camera state.
///
/// `look_dir` is not renormalized by the pipeline and `up`/`right` are only
/// basis hints; keeping them well-formed is up to whoever mutates the camera.
/// Requires `far > near > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vec3,
    pub look_dir: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub near: f32,
    pub far: f32,
    /// Movement per key press (viewer only)
    pub step: f32,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Horizontal field of view in degrees
    pub fov_x: f32,
    /// Keep looking at the origin while moving (viewer only)
    pub lock_view: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 4.0),
            look_dir: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::UP,
            right: Vec3::new(1.0, 0.0, 0.0),
            near: 0.5,
            far: 50.0,
            step: 0.1,
            fov_y: 45.0,
            fov_x: 60.0,
            lock_view: false,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::view(self.eye, self.look_dir, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.fov_x, self.near, self.far)
    }

    /// Move along the view direction
    pub fn advance(&mut self, amount: f32) {
        self.eye = self.eye + self.look_dir * (amount * self.step);
        self.retarget();
    }

    /// Move sideways along `right`
    pub fn strafe(&mut self, amount: f32) {
        self.eye = self.eye + self.right * (amount * self.step);
        self.retarget();
    }

    /// Move along `up`
    pub fn rise(&mut self, amount: f32) {
        self.eye = self.eye + self.up * (amount * self.step);
        self.retarget();
    }

    /// Turn by yaw (around `up`) and pitch (around `right`), in radians.
    /// Ignored while the view is locked.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        if self.lock_view {
            return;
        }
        let (sy, cy) = yaw.sin_cos();
        let dir = self.look_dir * cy + self.right * sy;
        let right = self.right * cy - self.look_dir * sy;

        let (sp, cp) = pitch.sin_cos();
        let look_dir = dir * cp + self.up * sp;
        let up = self.up * cp - dir * sp;

        self.look_dir = look_dir.unit();
        self.up = up.unit();
        self.right = right.unit();
    }

    /// Point at the origin when the view is locked
    pub fn retarget(&mut self) {
        if !self.lock_view {
            return;
        }
        let to_origin = -self.eye;
        if to_origin.len() < f32::EPSILON {
            return;
        }
        self.look_dir = to_origin.unit();
        let right = self.look_dir.cross(self.up);
        if right.len() < f32::EPSILON {
            return;
        }
        self.right = right.unit();
        self.up = self.right.cross(self.look_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 0.001
    }

    #[test]
    fn test_default_sees_origin() {
        let cam = Camera::default();
        let clip = cam.projection_matrix() * cam.view_matrix() * Vec3::ZERO.to_point();
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 0.001 && (clip.y / clip.w).abs() < 0.001);
    }

    #[test]
    fn test_rotate_keeps_basis_orthonormal() {
        let mut cam = Camera::default();
        cam.rotate(0.3, -0.2);
        assert!((cam.look_dir.len() - 1.0).abs() < 0.001);
        assert!(cam.look_dir.dot(cam.up).abs() < 0.001);
        assert!(cam.look_dir.dot(cam.right).abs() < 0.001);
        assert!(cam.up.dot(cam.right).abs() < 0.001);
    }

    #[test]
    fn test_yaw_turns_toward_right() {
        let mut cam = Camera::default();
        cam.rotate(std::f32::consts::FRAC_PI_2, 0.0);
        assert!(close(cam.look_dir, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_locked_view_tracks_origin() {
        let mut cam = Camera::default();
        cam.lock_view = true;
        cam.strafe(10.0);
        let expected = (-cam.eye).unit();
        assert!(close(cam.look_dir, expected));
        // Rotation is ignored while locked
        cam.rotate(1.0, 0.0);
        assert!(close(cam.look_dir, expected));
    }
}
