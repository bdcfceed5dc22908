//! Scene nodes and their payload descriptions.

use glam::{Quat, Vec3};
use indexmap::IndexSet;

use crate::coords::Pose;
use crate::protocol::scene::{
    BatchedAxesMessage, CameraFrustumMessage, CatmullRomSplineMessage,
    CubicBezierSplineMessage, FrameMessage, GaussianSplatsMessage, GlbMessage,
    Gui3DMessage, GridMessage, ImageMessage, LabelMessage, MeshBoneMessage,
    MeshMessage, PointCloudMessage, SkinnedMeshMessage,
    TransformControlsMessage,
};

/// Each batched axes instance is drawn as three line-segment instances.
const SEGMENTS_PER_AXES: u32 = 3;

/// Identity of one registration of a node.
///
/// Re-adding a node under the same name yields a new id, which is how the
/// renderer side tells a replacement apart from the node it already built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

/// What a node renders as. The renderer builds its object from this.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// Empty transform group: the root and synthesized parents.
    Group,
    /// Coordinate frame.
    Frame(FrameMessage),
    /// Instanced axes.
    BatchedAxes(BatchedAxesMessage),
    /// Grid.
    Grid(GridMessage),
    /// Text label.
    Label(LabelMessage),
    /// In-scene GUI container.
    Gui3D(Gui3DMessage),
    /// Point cloud.
    PointCloud(PointCloudMessage),
    /// Skinned mesh bone.
    MeshBone(MeshBoneMessage),
    /// Mesh.
    Mesh(MeshMessage),
    /// Skinned mesh.
    SkinnedMesh(SkinnedMeshMessage),
    /// Camera frustum.
    CameraFrustum(CameraFrustumMessage),
    /// Transform gizmo.
    TransformControls(TransformControlsMessage),
    /// Image quad.
    Image(ImageMessage),
    /// GLB asset.
    Glb(GlbMessage),
    /// Catmull-Rom spline.
    CatmullRomSpline(CatmullRomSplineMessage),
    /// Cubic Bezier spline.
    CubicBezierSpline(CubicBezierSplineMessage),
    /// Gaussian splats.
    GaussianSplats(GaussianSplatsMessage),
}

impl NodePayload {
    /// Short name of the payload kind, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Frame(_) => "frame",
            Self::BatchedAxes(_) => "batched axes",
            Self::Grid(_) => "grid",
            Self::Label(_) => "label",
            Self::Gui3D(_) => "3d gui",
            Self::PointCloud(_) => "point cloud",
            Self::MeshBone(_) => "mesh bone",
            Self::Mesh(_) => "mesh",
            Self::SkinnedMesh(_) => "skinned mesh",
            Self::CameraFrustum(_) => "camera frustum",
            Self::TransformControls(_) => "transform controls",
            Self::Image(_) => "image",
            Self::Glb(_) => "glb",
            Self::CatmullRomSpline(_) => "catmull-rom spline",
            Self::CubicBezierSpline(_) => "cubic bezier spline",
            Self::GaussianSplats(_) => "gaussian splats",
        }
    }

    /// Overlay-style payloads have no hidden-but-alive state and are torn
    /// down while not displayed.
    #[must_use]
    pub fn unmount_when_invisible(&self) -> bool {
        matches!(
            self,
            Self::Label(_) | Self::Gui3D(_) | Self::TransformControls(_)
        )
    }

    /// Map a low-level instance id reported by the renderer to the logical
    /// click index sent to the server. `None` for non-instanced payloads.
    #[must_use]
    pub fn click_instance_index(&self, instance_id: Option<u32>) -> Option<u32> {
        match self {
            Self::BatchedAxes(axes) => {
                let index = instance_id? / SEGMENTS_PER_AXES;
                (index < batched_axes_count(axes) as u32).then_some(index)
            }
            _ => None,
        }
    }

    /// Per-instance poses of a batched axes payload.
    #[must_use]
    pub fn batched_axes_poses(&self) -> Vec<Pose> {
        let Self::BatchedAxes(axes) = self else {
            return Vec::new();
        };
        let wxyzs: Vec<f32> =
            bytemuck::pod_collect_to_vec(axes.wxyzs_batched.as_slice());
        let positions: Vec<f32> =
            bytemuck::pod_collect_to_vec(axes.positions_batched.as_slice());
        wxyzs
            .chunks_exact(4)
            .zip(positions.chunks_exact(3))
            .map(|(q, p)| Pose {
                orientation: Quat::from_xyzw(q[1], q[2], q[3], q[0]),
                position: Vec3::new(p[0], p[1], p[2]),
            })
            .collect()
    }
}

fn batched_axes_count(axes: &BatchedAxesMessage) -> usize {
    axes.positions_batched.len() / (3 * size_of::<f32>())
}

/// One entry of the node table.
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    payload: NodePayload,
    pub(crate) children: IndexSet<String>,
    pub(crate) clickable: bool,
}

impl SceneNode {
    pub(crate) fn new(id: NodeId, name: String, payload: NodePayload) -> Self {
        Self {
            id,
            name,
            payload,
            children: IndexSet::new(),
            clickable: false,
        }
    }

    /// Registration id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Full slash-separated path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renderable description.
    #[must_use]
    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &IndexSet<String> {
        &self.children
    }

    /// Whether pointer events on this node produce clicks.
    #[must_use]
    pub fn clickable(&self) -> bool {
        self.clickable
    }
}

/// Parent path of a node name: everything before the last `/`.
///
/// Top-level names (`"/a"` or `"a"`) have the root `""` as their parent.
#[must_use]
pub fn parent_name(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use serde_bytes::ByteBuf;

    use super::*;

    fn axes(count: usize) -> NodePayload {
        let mut wxyzs = Vec::new();
        let mut positions = Vec::new();
        for i in 0..count {
            for v in [1.0_f32, 0.0, 0.0, 0.0] {
                wxyzs.extend_from_slice(&v.to_le_bytes());
            }
            for v in [i as f32, 0.0, 0.0] {
                positions.extend_from_slice(&v.to_le_bytes());
            }
        }
        NodePayload::BatchedAxes(BatchedAxesMessage {
            name: "/axes".to_owned(),
            wxyzs_batched: ByteBuf::from(wxyzs),
            positions_batched: ByteBuf::from(positions),
            axes_length: 1.0,
            axes_radius: 0.1,
        })
    }

    #[test]
    fn parent_of_nested_and_top_level_names() {
        assert_eq!(parent_name("/a/b/c"), "/a/b");
        assert_eq!(parent_name("/a"), "");
        assert_eq!(parent_name("a"), "");
        assert_eq!(parent_name(""), "");
    }

    #[test]
    fn batched_axes_map_three_segments_per_instance() {
        let payload = axes(4);
        assert_eq!(payload.click_instance_index(Some(0)), Some(0));
        assert_eq!(payload.click_instance_index(Some(5)), Some(1));
        assert_eq!(payload.click_instance_index(Some(11)), Some(3));
        assert_eq!(payload.click_instance_index(Some(12)), None);
        assert_eq!(payload.click_instance_index(None), None);
        assert_eq!(NodePayload::Group.click_instance_index(Some(7)), None);
    }

    #[test]
    fn batched_axes_poses_read_little_endian_floats() {
        let poses = axes(3).batched_axes_poses();
        assert_eq!(poses.len(), 3);
        assert_eq!(poses[2].position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(poses[0].orientation, Quat::IDENTITY);
    }

    #[test]
    fn overlays_unmount_when_invisible() {
        let label = NodePayload::Label(LabelMessage {
            name: "/l".to_owned(),
            text: "hi".to_owned(),
        });
        assert!(label.unmount_when_invisible());
        assert!(!NodePayload::Group.unmount_when_invisible());
    }
}
