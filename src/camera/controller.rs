use glam::{Quat, Vec2, Vec3};

use super::core::Camera;

/// Camera state the synchronization layer reads and writes.
///
/// Implementations own whatever navigation model drives the camera. All
/// values are in internal coordinates; `fov` is the vertical field of view
/// in radians.
pub trait CameraControls {
    /// Eye position.
    fn position(&self) -> Vec3;
    /// Move the eye, keeping the target.
    fn set_position(&mut self, position: Vec3);
    /// Look-at target.
    fn target(&self) -> Vec3;
    /// Move the target, keeping the eye.
    fn set_target(&mut self, target: Vec3);
    /// Up direction.
    fn up(&self) -> Vec3;
    /// Change the up direction. Implementations may move the eye.
    fn set_up(&mut self, up: Vec3);
    /// Vertical field of view.
    fn fov(&self) -> f32;
    /// Set the vertical field of view.
    fn set_fov(&mut self, fov: f32);
    /// Viewport aspect ratio.
    fn aspect(&self) -> f32;
    /// Set the viewport aspect ratio.
    fn set_aspect(&mut self, aspect: f32);
    /// Camera orientation; the camera looks down its local -Z.
    fn orientation(&self) -> Quat;
}

/// Orbit navigation around a target point.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Underlying perspective camera.
    pub camera: Camera,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl OrbitCamera {
    /// Orbit controls around an existing camera.
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            rotate_speed: 0.01,
            pan_speed: 0.01,
            zoom_speed: 0.05,
        }
    }

    fn offset(&self) -> Vec3 {
        self.camera.eye - self.camera.target
    }

    /// Orbit around the target by a pointer delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        let up = self.camera.up.normalize_or_zero();
        let horizontal = Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
        let mut offset = horizontal * self.offset();

        let right = offset.cross(up).try_normalize().unwrap_or(Vec3::X);
        let vertical = Quat::from_axis_angle(right, delta.y * self.rotate_speed);
        let candidate = vertical * offset;
        // Stop short of flipping over the pole.
        if candidate.normalize_or_zero().dot(up).abs() < 0.999 {
            offset = candidate;
        }
        self.camera.eye = self.camera.target + offset;
    }

    /// Translate eye and target together, in the view plane.
    pub fn pan(&mut self, delta: Vec2) {
        let orientation = self.camera.orientation();
        let right = orientation * Vec3::X;
        let up = orientation * Vec3::Y;
        let scale = self.offset().length() * self.pan_speed;
        let translation = right * (-delta.x * scale) + up * (delta.y * scale);
        self.camera.eye += translation;
        self.camera.target += translation;
    }

    /// Dolly towards (positive) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        let distance = (self.offset().length() * (1.0 - delta * self.zoom_speed))
            .clamp(self.camera.znear, self.camera.zfar);
        let direction = self.offset().try_normalize().unwrap_or(Vec3::Z);
        self.camera.eye = self.camera.target + direction * distance;
    }
}

impl CameraControls for OrbitCamera {
    fn position(&self) -> Vec3 {
        self.camera.eye
    }

    fn set_position(&mut self, position: Vec3) {
        self.camera.eye = position;
    }

    fn target(&self) -> Vec3 {
        self.camera.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.camera.target = target;
    }

    fn up(&self) -> Vec3 {
        self.camera.up
    }

    /// The orbit is expressed relative to `up`, so re-basing it carries the
    /// eye along with the new up axis.
    fn set_up(&mut self, up: Vec3) {
        let Some(up) = up.try_normalize() else {
            log::warn!("ignoring zero camera up direction");
            return;
        };
        let from = self.camera.up.normalize_or(Vec3::Y);
        let offset = Quat::from_rotation_arc(from, up) * self.offset();
        self.camera.up = up;
        self.camera.eye = self.camera.target + offset;
    }

    fn fov(&self) -> f32 {
        self.camera.fovy
    }

    fn set_fov(&mut self, fov: f32) {
        self.camera.fovy = fov;
    }

    fn aspect(&self) -> f32 {
        self.camera.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }

    fn orientation(&self) -> Quat {
        self.camera.orientation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_keeps_distance_to_target() {
        let mut orbit = OrbitCamera::default();
        let before = orbit.offset().length();
        orbit.rotate(Vec2::new(40.0, -25.0));
        assert!((orbit.offset().length() - before).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut orbit = OrbitCamera::default();
        let offset = orbit.offset();
        orbit.pan(Vec2::new(10.0, 5.0));
        assert!(orbit.offset().abs_diff_eq(offset, 1e-4));
        assert_ne!(orbit.target(), Vec3::ZERO);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::default();
        for _ in 0..200 {
            orbit.zoom(1.0);
        }
        assert!(orbit.offset().length() >= orbit.camera.znear - 1e-6);
    }

    #[test]
    fn changing_up_moves_the_eye() {
        let mut orbit = OrbitCamera::default();
        let eye = orbit.position();
        orbit.set_up(Vec3::Z);
        assert_eq!(orbit.up(), Vec3::Z);
        assert!(!orbit.position().abs_diff_eq(eye, 1e-3));
    }
}
