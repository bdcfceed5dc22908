//! Camera state, server camera commands, and camera telemetry.
//!
//! The camera lives in internal coordinates. Inbound `SetCamera*` commands
//! are converted wire to internal through the current
//! [`WorldTransform`](crate::coords::WorldTransform) and outbound
//! [`ViewerCameraMessage`]s go the other way. Telemetry is not sent from
//! here: [`CameraSync`] only records that the camera changed, and the
//! engine sends through its throttle on the next tick.

/// Orbital camera controls and the [`CameraControls`] trait.
pub mod controller;
/// Perspective camera and pick rays.
pub mod core;

use std::f32::consts::PI;

use glam::{Quat, Vec3};

pub use self::controller::{CameraControls, OrbitCamera};
pub use self::core::Camera;
use crate::coords::{quat_to_wxyz, Pose, WorldTransform};
use crate::protocol::camera::{
    SetCameraFovMessage, SetCameraLookAtMessage, SetCameraPositionMessage,
    SetCameraUpDirectionMessage, ViewerCameraMessage,
};

/// How soon pending telemetry should go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryDue {
    /// Through the camera throttle.
    Throttled,
    /// Right away, bypassing the throttle.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InitialView {
    position: Vec3,
    target: Vec3,
    up: Vec3,
}

/// Camera controls plus telemetry bookkeeping.
#[derive(Debug, Clone)]
pub struct CameraSync<C = OrbitCamera> {
    controls: C,
    initial: Option<InitialView>,
    due: Option<TelemetryDue>,
}

impl<C: CameraControls> CameraSync<C> {
    /// Wrap camera controls. Nothing is due until the camera changes.
    #[must_use]
    pub fn new(controls: C) -> Self {
        Self {
            controls,
            initial: None,
            due: None,
        }
    }

    /// Current camera.
    #[must_use]
    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// Change the camera locally; telemetry follows through the throttle.
    pub fn update(&mut self, change: impl FnOnce(&mut C)) {
        change(&mut self.controls);
        self.mark_changed();
    }

    /// Viewport aspect changed.
    pub fn set_aspect(&mut self, aspect: f32) {
        if self.controls.aspect() != aspect {
            self.controls.set_aspect(aspect);
            self.mark_changed();
        }
    }

    /// Request telemetry through the throttle.
    pub fn mark_changed(&mut self) {
        if self.due.is_none() {
            self.due = Some(TelemetryDue::Throttled);
        }
    }

    /// Take the pending telemetry request.
    pub fn take_due(&mut self) -> Option<TelemetryDue> {
        self.due.take()
    }

    // -- Server commands --

    /// Move the eye, keeping the target. The view direction follows.
    pub fn apply_position(&mut self, world: &WorldTransform, msg: &SetCameraPositionMessage) {
        let position = world.transform_point(Vec3::from_array(msg.position));
        self.controls.set_position(position);
        self.mark_changed();
    }

    /// Move the look-at target.
    pub fn apply_look_at(&mut self, world: &WorldTransform, msg: &SetCameraLookAtMessage) {
        let target = world.transform_point(Vec3::from_array(msg.look_at));
        self.controls.set_target(target);
        self.mark_changed();
    }

    /// Change the up direction. The eye position is the same afterwards.
    pub fn apply_up_direction(
        &mut self,
        world: &WorldTransform,
        msg: &SetCameraUpDirectionMessage,
    ) {
        let Some(up) = Vec3::from_array(msg.position).try_normalize() else {
            log::warn!("ignoring zero camera up direction");
            return;
        };
        let position = self.controls.position();
        self.controls.set_up(world.transform_vector(up));
        self.controls.set_position(position);
        self.mark_changed();
    }

    /// Change the field of view; telemetry goes out on the next tick.
    pub fn apply_fov(&mut self, msg: &SetCameraFovMessage) {
        self.controls.set_fov(msg.fov);
        self.due = Some(TelemetryDue::Immediate);
    }

    // -- Telemetry --

    /// Camera telemetry in wire coordinates.
    ///
    /// The first call remembers the current view for
    /// [`reset_view`](Self::reset_view).
    pub fn telemetry(&mut self, world: &WorldTransform) -> ViewerCameraMessage {
        if self.initial.is_none() {
            self.initial = Some(InitialView {
                position: self.controls.position(),
                target: self.controls.target(),
                up: self.controls.up(),
            });
        }
        let to_wire = world.inverse();
        let internal = Pose {
            orientation: self.controls.orientation(),
            position: self.controls.position(),
        };
        let mut pose = to_wire.transform_pose(&internal);
        // Internal cameras look down -Z with +Y up; the wire uses +Z forward
        // with +Y down.
        pose.orientation = (pose.orientation * Quat::from_rotation_x(PI)).normalize();
        ViewerCameraMessage {
            wxyz: quat_to_wxyz(pose.orientation),
            position: pose.position.to_array(),
            fov: self.controls.fov(),
            aspect: self.controls.aspect(),
            look_at: to_wire.transform_point(self.controls.target()).to_array(),
            up_direction: to_wire.transform_vector(self.controls.up()).to_array(),
        }
    }

    /// Return to the view of the first telemetry sent. Returns whether a
    /// view was remembered.
    pub fn reset_view(&mut self) -> bool {
        let Some(initial) = self.initial else {
            return false;
        };
        self.controls.set_target(initial.target);
        self.controls.set_up(initial.up);
        self.controls.set_position(initial.position);
        self.mark_changed();
        true
    }
}

impl Default for CameraSync<OrbitCamera> {
    fn default() -> Self {
        Self::new(OrbitCamera::default())
    }
}
