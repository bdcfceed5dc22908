//! Per-node attributes: pose, visibility, and the pose-update state machine.
//!
//! Attributes are keyed by node name and live beside the node table rather
//! than inside it, since poses change far more often than nodes do.

use glam::{Quat, Vec3};

use crate::coords::Pose;

/// Where a node's pose stands relative to its renderable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoseUpdateState {
    /// No renderable object yet; pose writes are stored but not applied.
    #[default]
    WaitForMakeObject,
    /// The renderable exists but has not received the current pose.
    NeedsUpdate,
    /// The current pose has been applied.
    Updated,
}

/// Out-of-band state for one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeAttributes {
    pose: Pose,
    visibility: Option<bool>,
    override_visibility: Option<bool>,
    pose_state: PoseUpdateState,
}

impl NodeAttributes {
    /// Attributes with the given initial pose.
    #[must_use]
    pub fn with_pose(pose: Pose) -> Self {
        Self {
            pose,
            ..Self::default()
        }
    }

    /// Fresh attributes for a newly registered payload. Only the local
    /// override survives a re-registration.
    #[must_use]
    pub(crate) fn for_new_payload(previous: Option<&Self>) -> Self {
        Self {
            override_visibility: previous.and_then(|a| a.override_visibility),
            ..Self::default()
        }
    }

    /// Current pose relative to the parent.
    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Pose-update state.
    #[must_use]
    pub fn pose_state(&self) -> PoseUpdateState {
        self.pose_state
    }

    /// Server-set visibility, if any.
    #[must_use]
    pub fn visibility(&self) -> Option<bool> {
        self.visibility
    }

    /// Locally forced visibility, if any.
    #[must_use]
    pub fn override_visibility(&self) -> Option<bool> {
        self.override_visibility
    }

    /// Override, else server value, else visible.
    #[must_use]
    pub fn effective_visibility(&self) -> bool {
        self.override_visibility.or(self.visibility).unwrap_or(true)
    }

    pub(crate) fn set_orientation(&mut self, orientation: Quat) {
        self.pose.orientation = orientation;
        self.pose_changed();
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.pose.position = position;
        self.pose_changed();
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.pose_changed();
    }

    pub(crate) fn set_visibility(&mut self, visible: bool) {
        self.visibility = Some(visible);
    }

    pub(crate) fn set_override_visibility(&mut self, visible: Option<bool>) {
        self.override_visibility = visible;
    }

    /// An applied pose went stale. Poses written before the object exists
    /// are picked up when it is built.
    fn pose_changed(&mut self) {
        if self.pose_state == PoseUpdateState::Updated {
            self.pose_state = PoseUpdateState::NeedsUpdate;
        }
    }

    /// A renderable was (re)built and has not seen any pose.
    pub(crate) fn object_built(&mut self) {
        self.pose_state = PoseUpdateState::NeedsUpdate;
    }

    /// Take the pending pose write, moving `NeedsUpdate` to `Updated`.
    pub(crate) fn take_pose_update(&mut self) -> Option<Pose> {
        (self.pose_state == PoseUpdateState::NeedsUpdate).then(|| {
            self.pose_state = PoseUpdateState::Updated;
            self.pose
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_server_visibility() {
        let mut attrs = NodeAttributes::default();
        assert!(attrs.effective_visibility());
        attrs.set_visibility(false);
        assert!(!attrs.effective_visibility());
        attrs.set_override_visibility(Some(true));
        assert!(attrs.effective_visibility());
        attrs.set_override_visibility(None);
        assert!(!attrs.effective_visibility());
    }

    #[test]
    fn pose_writes_wait_for_the_object() {
        let mut attrs = NodeAttributes::default();
        attrs.set_position(Vec3::X);
        assert_eq!(attrs.pose_state(), PoseUpdateState::WaitForMakeObject);
        assert!(attrs.take_pose_update().is_none());

        attrs.object_built();
        assert_eq!(attrs.take_pose_update().map(|p| p.position), Some(Vec3::X));
        assert_eq!(attrs.pose_state(), PoseUpdateState::Updated);
        assert!(attrs.take_pose_update().is_none());
    }

    #[test]
    fn each_pose_change_passes_through_needs_update_once() {
        let mut attrs = NodeAttributes::default();
        attrs.object_built();
        let _ = attrs.take_pose_update();

        attrs.set_orientation(Quat::from_rotation_y(1.0));
        attrs.set_position(Vec3::Y);
        assert_eq!(attrs.pose_state(), PoseUpdateState::NeedsUpdate);
        assert!(attrs.take_pose_update().is_some());
        assert!(attrs.take_pose_update().is_none());
    }

    #[test]
    fn re_registration_keeps_only_the_override() {
        let mut previous = NodeAttributes::default();
        previous.set_visibility(false);
        previous.set_override_visibility(Some(true));
        previous.set_position(Vec3::Z);
        let fresh = NodeAttributes::for_new_payload(Some(&previous));
        assert_eq!(fresh.override_visibility(), Some(true));
        assert_eq!(fresh.visibility(), None);
        assert_eq!(fresh.pose().position, Vec3::ZERO);
        assert_eq!(fresh.pose_state(), PoseUpdateState::WaitForMakeObject);
    }
}
