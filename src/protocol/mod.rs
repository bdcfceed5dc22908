//! Wire schema and batch codec.
//!
//! Every frame on the socket is a msgpack array of records. Each record is a
//! map whose `type` entry names one of the shapes of [`Message`]; the
//! remaining entries are that shape's fields. Byte-buffer fields travel as
//! msgpack `bin` and decode into [`serde_bytes::ByteBuf`].
//!
//! Vectors are `[x, y, z]` and orientations are scalar-first `[w, x, y, z]`
//! unit quaternions, both in the wire coordinate convention. See
//! [`crate::coords`] for the mapping into the internal convention.

pub mod camera;
pub mod codec;
pub mod gui;
pub mod scene;
pub mod transfer;

use camera::{
    SceneNodeClickMessage, ScenePointerEnableMessage, ScenePointerMessage,
    SetCameraFovMessage, SetCameraLookAtMessage, SetCameraPositionMessage,
    SetCameraUpDirectionMessage, ViewerCameraMessage,
};
use gui::{
    GuiAddButtonGroupMessage, GuiAddButtonMessage, GuiAddCheckboxMessage,
    GuiAddDropdownMessage, GuiAddFolderMessage, GuiAddMarkdownMessage,
    GuiAddMultiSliderMessage, GuiAddNumberMessage, GuiAddPlotlyMessage,
    GuiAddProgressBarMessage, GuiAddRgbMessage, GuiAddRgbaMessage,
    GuiAddSliderMessage, GuiAddTabGroupMessage, GuiAddTextMessage,
    GuiAddUploadButtonMessage, GuiAddVector2Message, GuiAddVector3Message,
    GuiCloseModalMessage, GuiModalMessage, GuiRemoveMessage, GuiUpdateMessage,
    NotificationMessage, RemoveNotificationMessage, RunJavascriptMessage,
    SetGuiPanelLabelMessage, ShareUrlUpdated, ThemeConfigurationMessage,
};
use scene::{
    BackgroundImageMessage, BatchedAxesMessage, CameraFrustumMessage,
    CatmullRomSplineMessage, CubicBezierSplineMessage, FrameMessage,
    GaussianSplatsMessage, GlbMessage, Gui3DMessage, GridMessage,
    ImageMessage, LabelMessage, MeshBoneMessage, MeshMessage,
    PointCloudMessage, RemoveSceneNodeMessage, SetBoneOrientationMessage,
    SetBonePositionMessage, SetOrientationMessage, SetPositionMessage,
    SetSceneNodeClickableMessage, SetSceneNodeVisibilityMessage,
    SkinnedMeshMessage, TransformControlsMessage,
    TransformControlsUpdateMessage,
};
use serde::{Deserialize, Serialize};
use transfer::{
    FileTransferPart, FileTransferPartAck, FileTransferStart,
    GetRenderRequestMessage, GetRenderResponseMessage,
};

/// `[x, y, z]` in wire coordinates.
pub type WireVec3 = [f32; 3];

/// Scalar-first unit quaternion `[w, x, y, z]` in wire coordinates.
pub type WireWxyz = [f32; 4];

/// Image encoding named by its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// `image/jpeg`
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// `image/png`
    #[serde(rename = "image/png")]
    Png,
}

/// One tagged record of the wire protocol.
///
/// The serde tag is the record's `type` entry, so each variant's rename is
/// exactly the shape name the server uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    // ── Scene objects ──
    /// Coordinate frame.
    #[serde(rename = "FrameMessage")]
    Frame(FrameMessage),
    /// Instanced axes.
    #[serde(rename = "BatchedAxesMessage")]
    BatchedAxes(BatchedAxesMessage),
    /// Grid.
    #[serde(rename = "GridMessage")]
    Grid(GridMessage),
    /// Text label.
    #[serde(rename = "LabelMessage")]
    Label(LabelMessage),
    /// In-scene GUI container.
    #[serde(rename = "Gui3DMessage")]
    Gui3D(Gui3DMessage),
    /// Point cloud.
    #[serde(rename = "PointCloudMessage")]
    PointCloud(PointCloudMessage),
    /// Skinned mesh bone.
    #[serde(rename = "MeshBoneMessage")]
    MeshBone(MeshBoneMessage),
    /// Mesh.
    #[serde(rename = "MeshMessage")]
    Mesh(MeshMessage),
    /// Skinned mesh.
    #[serde(rename = "SkinnedMeshMessage")]
    SkinnedMesh(SkinnedMeshMessage),
    /// Camera frustum.
    #[serde(rename = "CameraFrustumMessage")]
    CameraFrustum(CameraFrustumMessage),
    /// Transform gizmo.
    #[serde(rename = "TransformControlsMessage")]
    TransformControls(TransformControlsMessage),
    /// Image quad.
    #[serde(rename = "ImageMessage")]
    Image(ImageMessage),
    /// GLB asset.
    #[serde(rename = "GlbMessage")]
    Glb(GlbMessage),
    /// Catmull-Rom spline.
    #[serde(rename = "CatmullRomSplineMessage")]
    CatmullRomSpline(CatmullRomSplineMessage),
    /// Cubic Bezier spline.
    #[serde(rename = "CubicBezierSplineMessage")]
    CubicBezierSpline(CubicBezierSplineMessage),
    /// Gaussian splats.
    #[serde(rename = "GaussianSplatsMessage")]
    GaussianSplats(GaussianSplatsMessage),

    // ── Scene mutations ──
    /// Node orientation.
    #[serde(rename = "SetOrientationMessage")]
    SetOrientation(SetOrientationMessage),
    /// Node position.
    #[serde(rename = "SetPositionMessage")]
    SetPosition(SetPositionMessage),
    /// Bone orientation.
    #[serde(rename = "SetBoneOrientationMessage")]
    SetBoneOrientation(SetBoneOrientationMessage),
    /// Bone position.
    #[serde(rename = "SetBonePositionMessage")]
    SetBonePosition(SetBonePositionMessage),
    /// Node removal.
    #[serde(rename = "RemoveSceneNodeMessage")]
    RemoveSceneNode(RemoveSceneNodeMessage),
    /// Node visibility.
    #[serde(rename = "SetSceneNodeVisibilityMessage")]
    SetSceneNodeVisibility(SetSceneNodeVisibilityMessage),
    /// Node clickability.
    #[serde(rename = "SetSceneNodeClickableMessage")]
    SetSceneNodeClickable(SetSceneNodeClickableMessage),
    /// Background image.
    #[serde(rename = "BackgroundImageMessage")]
    BackgroundImage(BackgroundImageMessage),
    /// Clear the scene.
    #[serde(rename = "ResetSceneMessage")]
    ResetScene,
    /// Transform gizmo drag report.
    #[serde(rename = "TransformControlsUpdateMessage")]
    TransformControlsUpdate(TransformControlsUpdateMessage),

    // ── Camera and pointer ──
    /// Camera telemetry.
    #[serde(rename = "ViewerCameraMessage")]
    ViewerCamera(ViewerCameraMessage),
    /// Camera position.
    #[serde(rename = "SetCameraPositionMessage")]
    SetCameraPosition(SetCameraPositionMessage),
    /// Camera up direction.
    #[serde(rename = "SetCameraUpDirectionMessage")]
    SetCameraUpDirection(SetCameraUpDirectionMessage),
    /// Camera look-at target.
    #[serde(rename = "SetCameraLookAtMessage")]
    SetCameraLookAt(SetCameraLookAtMessage),
    /// Camera field of view.
    #[serde(rename = "SetCameraFovMessage")]
    SetCameraFov(SetCameraFovMessage),
    /// Scene pointer mode.
    #[serde(rename = "ScenePointerEnableMessage")]
    ScenePointerEnable(ScenePointerEnableMessage),
    /// Scene pointer event.
    #[serde(rename = "ScenePointerMessage")]
    ScenePointer(ScenePointerMessage),
    /// Node click.
    #[serde(rename = "SceneNodeClickMessage")]
    SceneNodeClick(SceneNodeClickMessage),

    // ── GUI components ──
    /// Folder.
    #[serde(rename = "GuiAddFolderMessage")]
    GuiAddFolder(GuiAddFolderMessage),
    /// Markdown.
    #[serde(rename = "GuiAddMarkdownMessage")]
    GuiAddMarkdown(GuiAddMarkdownMessage),
    /// Progress bar.
    #[serde(rename = "GuiAddProgressBarMessage")]
    GuiAddProgressBar(GuiAddProgressBarMessage),
    /// Plotly figure.
    #[serde(rename = "GuiAddPlotlyMessage")]
    GuiAddPlotly(GuiAddPlotlyMessage),
    /// Tab group.
    #[serde(rename = "GuiAddTabGroupMessage")]
    GuiAddTabGroup(GuiAddTabGroupMessage),
    /// Button.
    #[serde(rename = "GuiAddButtonMessage")]
    GuiAddButton(GuiAddButtonMessage),
    /// Upload button.
    #[serde(rename = "GuiAddUploadButtonMessage")]
    GuiAddUploadButton(GuiAddUploadButtonMessage),
    /// Slider.
    #[serde(rename = "GuiAddSliderMessage")]
    GuiAddSlider(GuiAddSliderMessage),
    /// Multi-slider.
    #[serde(rename = "GuiAddMultiSliderMessage")]
    GuiAddMultiSlider(GuiAddMultiSliderMessage),
    /// Number input.
    #[serde(rename = "GuiAddNumberMessage")]
    GuiAddNumber(GuiAddNumberMessage),
    /// RGB picker.
    #[serde(rename = "GuiAddRgbMessage")]
    GuiAddRgb(GuiAddRgbMessage),
    /// RGBA picker.
    #[serde(rename = "GuiAddRgbaMessage")]
    GuiAddRgba(GuiAddRgbaMessage),
    /// Checkbox.
    #[serde(rename = "GuiAddCheckboxMessage")]
    GuiAddCheckbox(GuiAddCheckboxMessage),
    /// Vector2 input.
    #[serde(rename = "GuiAddVector2Message")]
    GuiAddVector2(GuiAddVector2Message),
    /// Vector3 input.
    #[serde(rename = "GuiAddVector3Message")]
    GuiAddVector3(GuiAddVector3Message),
    /// Text input.
    #[serde(rename = "GuiAddTextMessage")]
    GuiAddText(GuiAddTextMessage),
    /// Dropdown.
    #[serde(rename = "GuiAddDropdownMessage")]
    GuiAddDropdown(GuiAddDropdownMessage),
    /// Button group.
    #[serde(rename = "GuiAddButtonGroupMessage")]
    GuiAddButtonGroup(GuiAddButtonGroupMessage),

    // ── GUI state ──
    /// Open a modal.
    #[serde(rename = "GuiModalMessage")]
    GuiModal(GuiModalMessage),
    /// Close a modal.
    #[serde(rename = "GuiCloseModalMessage")]
    GuiCloseModal(GuiCloseModalMessage),
    /// Remove a component.
    #[serde(rename = "GuiRemoveMessage")]
    GuiRemove(GuiRemoveMessage),
    /// Partial component update.
    #[serde(rename = "GuiUpdateMessage")]
    GuiUpdate(GuiUpdateMessage),
    /// Clear all components.
    #[serde(rename = "ResetGuiMessage")]
    ResetGui,
    /// Theme.
    #[serde(rename = "ThemeConfigurationMessage")]
    ThemeConfiguration(ThemeConfigurationMessage),
    /// Panel label.
    #[serde(rename = "SetGuiPanelLabelMessage")]
    SetGuiPanelLabel(SetGuiPanelLabelMessage),
    /// Show or update a notification.
    #[serde(rename = "NotificationMessage")]
    Notification(NotificationMessage),
    /// Dismiss a notification.
    #[serde(rename = "RemoveNotificationMessage")]
    RemoveNotification(RemoveNotificationMessage),
    /// Browser script.
    #[serde(rename = "RunJavascriptMessage")]
    RunJavascript(RunJavascriptMessage),

    // ── Share link ──
    /// Ask the server for a share link.
    #[serde(rename = "ShareUrlRequest")]
    ShareUrlRequest,
    /// Share link changed.
    #[serde(rename = "ShareUrlUpdated")]
    ShareUrlUpdated(ShareUrlUpdated),
    /// Revoke the share link.
    #[serde(rename = "ShareUrlDisconnect")]
    ShareUrlDisconnect,

    // ── Transfers and capture ──
    /// Transfer start.
    #[serde(rename = "FileTransferStart")]
    FileTransferStart(FileTransferStart),
    /// Transfer chunk.
    #[serde(rename = "FileTransferPart")]
    FileTransferPart(FileTransferPart),
    /// Upload progress.
    #[serde(rename = "FileTransferPartAck")]
    FileTransferPartAck(FileTransferPartAck),
    /// Render capture request.
    #[serde(rename = "GetRenderRequestMessage")]
    GetRenderRequest(GetRenderRequestMessage),
    /// Render capture response.
    #[serde(rename = "GetRenderResponseMessage")]
    GetRenderResponse(GetRenderResponseMessage),
}

impl Message {
    /// Whether this is a render capture request, the one kind of message
    /// the dispatcher treats as a barrier.
    #[must_use]
    pub fn is_render_request(&self) -> bool {
        matches!(self, Self::GetRenderRequest(_))
    }
}
