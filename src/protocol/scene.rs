//! Scene-object and scene-mutation message shapes.
//!
//! Field names mirror the wire schema one-to-one.
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::{MediaType, WireVec3, WireWxyz};

/// Coordinate frame with optional axes gizmo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    pub name: String,
    pub show_axes: bool,
    pub axes_length: f32,
    pub axes_radius: f32,
    pub origin_radius: f32,
}

/// Many axes gizmos drawn as one instanced primitive.
///
/// `wxyzs_batched` and `positions_batched` are little-endian `f32`
/// buffers of shape `(N, 4)` and `(N, 3)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedAxesMessage {
    pub name: String,
    pub wxyzs_batched: ByteBuf,
    pub positions_batched: ByteBuf,
    pub axes_length: f32,
    pub axes_radius: f32,
}

/// Ground grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMessage {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub plane: String,
    pub cell_color: u32,
    pub cell_thickness: f32,
    pub cell_size: f32,
    pub section_color: u32,
    pub section_thickness: f32,
    pub section_size: f32,
}

/// Screen-facing text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMessage {
    pub name: String,
    pub text: String,
}

/// GUI container anchored in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gui3DMessage {
    pub order: f64,
    pub name: String,
    pub container_id: String,
}

/// Point cloud; `points` is `f32` xyz, `colors` is `u8` rgb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMessage {
    pub name: String,
    pub points: ByteBuf,
    pub colors: ByteBuf,
    pub point_size: f32,
    pub point_ball_norm: f32,
}

/// Bone attachment point of a skinned mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBoneMessage {
    pub name: String,
}

/// Triangle mesh; `vertices` is `f32` xyz, `faces` is `u32` triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshMessage {
    pub name: String,
    pub vertices: ByteBuf,
    pub faces: ByteBuf,
    pub color: Option<u32>,
    pub vertex_colors: Option<ByteBuf>,
    pub wireframe: bool,
    pub opacity: Option<f32>,
    pub flat_shading: bool,
    pub side: String,
    pub material: String,
}

/// Triangle mesh deformed by a bone hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinnedMeshMessage {
    pub name: String,
    pub vertices: ByteBuf,
    pub faces: ByteBuf,
    pub color: Option<u32>,
    pub vertex_colors: Option<ByteBuf>,
    pub wireframe: bool,
    pub opacity: Option<f32>,
    pub flat_shading: bool,
    pub side: String,
    pub material: String,
    pub bone_wxyzs: Vec<WireWxyz>,
    pub bone_positions: Vec<WireVec3>,
    pub skin_indices: ByteBuf,
    pub skin_weights: ByteBuf,
}

/// Set the orientation of one bone of a skinned mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBoneOrientationMessage {
    pub name: String,
    pub bone_index: usize,
    pub wxyz: WireWxyz,
}

/// Set the position of one bone of a skinned mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBonePositionMessage {
    pub name: String,
    pub bone_index: usize,
    pub position: WireVec3,
}

/// Camera frustum wireframe with an optional image on the far plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFrustumMessage {
    pub name: String,
    pub fov: f32,
    pub aspect: f32,
    pub scale: f32,
    pub color: u32,
    pub thickness: f32,
    pub image_media_type: Option<MediaType>,
    pub image_binary: Option<ByteBuf>,
}

/// Interactive translate/rotate gizmo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformControlsMessage {
    pub name: String,
    pub scale: f32,
    pub line_width: f32,
    pub fixed: bool,
    pub auto_transform: bool,
    pub active_axes: [bool; 3],
    pub disable_axes: bool,
    pub disable_sliders: bool,
    pub disable_rotations: bool,
    pub translation_limits: [[f32; 2]; 3],
    pub rotation_limits: [[f32; 2]; 3],
    pub depth_test: bool,
    pub opacity: f32,
}

/// Client-to-server report of a transform-control drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformControlsUpdateMessage {
    pub name: String,
    pub wxyz: WireWxyz,
    pub position: WireVec3,
}

/// Textured quad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub name: String,
    pub media_type: MediaType,
    pub data: ByteBuf,
    pub render_width: f32,
    pub render_height: f32,
}

/// Binary glTF asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlbMessage {
    pub name: String,
    pub glb_data: ByteBuf,
    pub scale: f32,
}

/// Catmull-Rom spline polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatmullRomSplineMessage {
    pub name: String,
    pub positions: Vec<WireVec3>,
    pub curve_type: String,
    pub tension: f32,
    pub closed: bool,
    pub line_width: f32,
    pub color: u32,
    pub segments: Option<u32>,
}

/// Cubic Bezier spline polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicBezierSplineMessage {
    pub name: String,
    pub positions: Vec<WireVec3>,
    pub control_points: Vec<WireVec3>,
    pub line_width: f32,
    pub color: u32,
    pub segments: Option<u32>,
}

/// Packed gaussian splat buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianSplatsMessage {
    pub name: String,
    pub buffer: ByteBuf,
}

/// Set a node's orientation relative to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOrientationMessage {
    pub name: String,
    pub wxyz: WireWxyz,
}

/// Set a node's position relative to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPositionMessage {
    pub name: String,
    pub position: WireVec3,
}

/// Remove a node and all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSceneNodeMessage {
    pub name: String,
}

/// Server-set visibility of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSceneNodeVisibilityMessage {
    pub name: String,
    pub visible: bool,
}

/// Whether pointer events on a node produce click messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSceneNodeClickableMessage {
    pub name: String,
    pub clickable: bool,
}

/// Viewport background, optionally with a depth image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImageMessage {
    pub media_type: MediaType,
    pub rgb_bytes: ByteBuf,
    pub depth_bytes: Option<ByteBuf>,
}
