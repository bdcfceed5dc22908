use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use crate::coords::{Ray, Viewport};

/// Perspective camera defined by eye position, target, and projection
/// parameters, in internal coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye (camera) position.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 3.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: 50_f32.to_radians(),
            znear: 0.01,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj =
            Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Camera orientation: the camera looks down its local -Z with +Y up.
    ///
    /// Falls back to identity when the view direction is degenerate or
    /// parallel to `up`.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        let Some(forward) = (self.target - self.eye).try_normalize() else {
            return Quat::IDENTITY;
        };
        let Some(right) = forward.cross(self.up).try_normalize() else {
            return Quat::IDENTITY;
        };
        let up = right.cross(forward);
        Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
    }

    /// Pick ray through a pixel of the viewport.
    #[must_use]
    pub fn pick_ray(&self, pixel: Vec2, viewport: Viewport) -> Ray {
        let [u, v] = viewport.normalize(pixel);
        let ndc = Vec2::new(u.mul_add(2.0, -1.0), 1.0 - v * 2.0);
        let inverse = self.build_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: self.eye,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_looks_down_negative_z() {
        let camera = Camera {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            ..Camera::default()
        };
        let forward = camera.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5), "{forward}");

        let side = Camera {
            eye: Vec3::new(5.0, 0.0, 0.0),
            ..camera
        };
        let forward = side.orientation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-5), "{forward}");
    }

    #[test]
    fn center_pixel_ray_points_at_target() {
        let camera = Camera {
            eye: Vec3::new(0.0, 2.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            ..Camera::default()
        };
        let viewport = Viewport {
            width: 640,
            height: 480,
        };
        let ray = camera.pick_ray(Vec2::new(320.0, 240.0), viewport);
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Y, 1e-4), "{ray:?}");
    }
}
