//! Coordinate conversion between the wire convention and the internal
//! renderer convention.
//!
//! The wire world frame is defined by the pose of the root scene node `""`:
//! that pose *is* the rigid transform from wire-world coordinates into the
//! internal basis. The server may redefine it at any time (for example to
//! change which axis is up), so callers build a [`WorldTransform`] from the
//! current root pose every time they need one and never cache it across
//! ticks.
//!
//! Orientations cross the boundary as scalar-first `[w, x, y, z]` arrays and
//! live internally as [`glam::Quat`] (`x, y, z, w` storage). Every crossing
//! goes through [`quat_from_wxyz`] / [`quat_to_wxyz`].

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec2, Vec3};

use crate::protocol::{WireVec3, WireWxyz};

/// Orientation and position of a node (relative to its parent) or camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Unit quaternion.
    pub orientation: Quat,
    /// Translation.
    pub position: Vec3,
}

impl Pose {
    /// Identity pose.
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Pose from wire orientation and position.
    #[must_use]
    pub fn from_wire(wxyz: WireWxyz, position: WireVec3) -> Self {
        Self {
            orientation: quat_from_wxyz(wxyz),
            position: Vec3::from_array(position),
        }
    }

    /// Wire orientation and position of this pose.
    #[must_use]
    pub fn to_wire(&self) -> (WireWxyz, WireVec3) {
        (quat_to_wxyz(self.orientation), self.position.to_array())
    }

    /// Whether two poses agree within `tolerance`, treating `q` and `-q` as
    /// the same orientation.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        let dot = self.orientation.dot(other.orientation).abs();
        (1.0 - dot) <= tolerance
            && self.position.abs_diff_eq(other.position, tolerance)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Quaternion from scalar-first wire order.
#[must_use]
pub fn quat_from_wxyz([w, x, y, z]: WireWxyz) -> Quat {
    Quat::from_xyzw(x, y, z, w)
}

/// Scalar-first wire order from a quaternion.
#[must_use]
pub fn quat_to_wxyz(q: Quat) -> WireWxyz {
    [q.w, q.x, q.y, q.z]
}

/// Root orientation used until the server sends one: rotates the wire
/// world's +Z up axis onto the internal +Y up axis.
#[must_use]
pub fn default_root_orientation() -> Quat {
    Quat::from_rotation_x(FRAC_PI_2)
        * Quat::from_rotation_y(PI)
        * Quat::from_rotation_z(FRAC_PI_2)
}

/// Rigid transform from wire-world coordinates into the internal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    rotation: Quat,
    translation: Vec3,
}

impl WorldTransform {
    /// Transform that leaves coordinates unchanged.
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// World-to-internal transform for the given root node pose.
    #[must_use]
    pub fn from_root_pose(root: &Pose) -> Self {
        Self {
            rotation: root.orientation.normalize(),
            translation: root.position,
        }
    }

    /// The internal-to-world transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Rotation part of the transform.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Map a point.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Map a direction (rotation only).
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Map a pose expressed in the source frame into the target frame.
    #[must_use]
    pub fn transform_pose(&self, pose: &Pose) -> Pose {
        Pose {
            orientation: (self.rotation * pose.orientation).normalize(),
            position: self.transform_point(pose.position),
        }
    }
}

/// A pick ray in internal coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Express this internal-space ray in wire coordinates.
    #[must_use]
    pub fn to_wire(&self, world: &WorldTransform) -> (WireVec3, WireVec3) {
        let internal_to_world = world.inverse();
        let origin = internal_to_world.transform_point(self.origin);
        let direction = internal_to_world
            .transform_vector(self.direction)
            .normalize_or_zero();
        (origin.to_array(), direction.to_array())
    }
}

/// Size of the drawing surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Width over height, or 1 for a degenerate surface.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Normalized screen position in OpenCV convention: origin at the top
    /// left, `[0, 1]` across the surface.
    #[must_use]
    pub fn normalize(&self, pixel: Vec2) -> [f32; 2] {
        let size = Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32);
        (pixel / size).to_array()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const EPS: f32 = 1e-4;

    fn random_pose(rng: &mut impl Rng) -> Pose {
        let axis = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::Z);
        Pose {
            orientation: Quat::from_axis_angle(
                axis,
                rng.random_range(-PI..PI),
            ),
            position: Vec3::new(
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
            ),
        }
    }

    #[test]
    fn wxyz_reorders_axis_components() {
        let q = quat_from_wxyz([0.5, 0.1, 0.2, 0.3]);
        assert_eq!((q.x, q.y, q.z, q.w), (0.1, 0.2, 0.3, 0.5));
        assert_eq!(quat_to_wxyz(q), [0.5, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn default_root_maps_z_up_to_y_up() {
        let world = WorldTransform::from_root_pose(&Pose {
            orientation: default_root_orientation(),
            position: Vec3::ZERO,
        });
        let up = world.transform_vector(Vec3::Z);
        assert!(up.abs_diff_eq(Vec3::Y, EPS), "{up}");
    }

    #[test]
    fn pose_round_trips_for_random_world_bases() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let world = WorldTransform::from_root_pose(&random_pose(&mut rng));
            let internal = random_pose(&mut rng);
            let wire = world.inverse().transform_pose(&internal);
            let back = world.transform_pose(&wire);
            assert!(internal.approx_eq(&back, EPS), "{internal:?} {back:?}");

            let (wxyz, position) = wire.to_wire();
            assert!(Pose::from_wire(wxyz, position).approx_eq(&wire, EPS));
        }
    }

    #[test]
    fn ray_conversion_inverts_world_transform() {
        let root = Pose {
            orientation: Quat::from_rotation_z(FRAC_PI_2),
            position: Vec3::new(1.0, 0.0, 0.0),
        };
        let world = WorldTransform::from_root_pose(&root);
        let ray = Ray {
            origin: Vec3::new(1.0, 2.0, 0.0),
            direction: Vec3::X,
        };
        let (origin, direction) = ray.to_wire(&world);
        // Rz(90) maps wire +Y onto internal -X, offset by +1 along X.
        let origin = Vec3::from_array(origin);
        let direction = Vec3::from_array(direction);
        assert!(origin.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS), "{origin}");
        assert!(direction.abs_diff_eq(Vec3::NEG_Y, EPS), "{direction}");
        assert!(world.transform_point(origin).abs_diff_eq(ray.origin, EPS));
    }

    #[test]
    fn screen_positions_are_normalized_top_left() {
        let viewport = Viewport {
            width: 200,
            height: 100,
        };
        assert_eq!(viewport.normalize(Vec2::new(100.0, 25.0)), [0.5, 0.25]);
        assert_eq!(viewport.aspect(), 2.0);
    }
}
