//! Camera control, camera telemetry, and pointer event message shapes.
//!
//! Field names mirror the wire schema one-to-one.
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use super::{WireVec3, WireWxyz};

/// Client-to-server camera telemetry, in wire coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerCameraMessage {
    pub wxyz: WireWxyz,
    pub position: WireVec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub look_at: WireVec3,
    pub up_direction: WireVec3,
}

/// Move the camera, keeping its look-at target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCameraPositionMessage {
    pub position: WireVec3,
}

/// Change the camera up direction. The field is named `position` on the
/// wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCameraUpDirectionMessage {
    pub position: WireVec3,
}

/// Move the camera's look-at target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCameraLookAtMessage {
    pub look_at: WireVec3,
}

/// Change the vertical field of view (radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCameraFovMessage {
    pub fov: f32,
}

/// Kind of scene-wide pointer reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenePointerEventType {
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "rect-select")]
    RectSelect,
}

/// Enable or disable scene-wide pointer reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePointerEnableMessage {
    pub enable: bool,
    pub event_type: ScenePointerEventType,
}

/// Client-to-server scene-wide pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePointerMessage {
    pub event_type: ScenePointerEventType,
    pub ray_origin: Option<WireVec3>,
    pub ray_direction: Option<WireVec3>,
    pub screen_pos: Vec<[f32; 2]>,
}

/// Client-to-server click on a clickable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeClickMessage {
    pub name: String,
    pub instance_index: Option<u32>,
    pub ray_origin: WireVec3,
    pub ray_direction: WireVec3,
    pub screen_pos: [f32; 2],
}
