//! Tag-to-mutation table for inbound messages.

use glam::Vec3;

use super::DispatchContext;
use crate::camera::CameraControls;
use crate::coords::quat_from_wxyz;
use crate::gui::notification::Notification;
use crate::gui::GuiComponent;
use crate::protocol::Message;
use crate::scene::NodePayload;
use crate::transfer::DownloadUpdate;

/// Split a scene-object message into the node name and payload it adds.
macro_rules! scene_object {
    ($msg:expr; $($variant:ident),* $(,)?) => {
        match $msg {
            $(Message::$variant(m) => Ok((m.name.clone(), NodePayload::$variant(m))),)*
            other => Err(other),
        }
    };
}

/// Turn a GUI add message into the component it stores.
macro_rules! gui_component {
    ($msg:expr; $($message:ident => $component:ident),* $(,)?) => {
        match $msg {
            $(Message::$message(m) => Ok(GuiComponent::$component(m)),)*
            other => Err(other),
        }
    };
}

/// Apply one message. Everything except render requests, which the
/// dispatcher intercepts, lands here.
pub(super) fn apply<C: CameraControls>(message: Message, ctx: &mut DispatchContext<'_, C>) {
    let message = match scene_object!(message;
        Frame, BatchedAxes, Grid, Label, Gui3D, PointCloud, MeshBone, Mesh,
        SkinnedMesh, CameraFrustum, TransformControls, Image, Glb,
        CatmullRomSpline, CubicBezierSpline, GaussianSplats,
    ) {
        Ok((name, payload)) => {
            let _ = ctx.scene.add_node(&name, payload);
            return;
        }
        Err(other) => other,
    };

    let message = match gui_component!(message;
        GuiAddFolder => Folder,
        GuiAddTabGroup => TabGroup,
        GuiAddMarkdown => Markdown,
        GuiAddProgressBar => ProgressBar,
        GuiAddPlotly => Plotly,
        GuiAddButton => Button,
        GuiAddUploadButton => UploadButton,
        GuiAddSlider => Slider,
        GuiAddMultiSlider => MultiSlider,
        GuiAddNumber => Number,
        GuiAddRgb => Rgb,
        GuiAddRgba => Rgba,
        GuiAddCheckbox => Checkbox,
        GuiAddVector2 => Vector2,
        GuiAddVector3 => Vector3,
        GuiAddText => Text,
        GuiAddDropdown => Dropdown,
        GuiAddButtonGroup => ButtonGroup,
    ) {
        Ok(component) => {
            ctx.gui.add_component(component);
            return;
        }
        Err(other) => other,
    };

    match message {
        // ── Scene ──
        Message::SetOrientation(m) => {
            ctx.scene.set_orientation(&m.name, quat_from_wxyz(m.wxyz));
        }
        Message::SetPosition(m) => {
            ctx.scene.set_position(&m.name, Vec3::from_array(m.position));
        }
        Message::SetBoneOrientation(m) => {
            ctx.scene
                .set_bone_orientation(&m.name, m.bone_index, quat_from_wxyz(m.wxyz));
        }
        Message::SetBonePosition(m) => {
            ctx.scene
                .set_bone_position(&m.name, m.bone_index, Vec3::from_array(m.position));
        }
        Message::RemoveSceneNode(m) => {
            if ctx.scene.remove_node(&m.name) {
                ctx.pointer.retain_live(ctx.scene);
            }
        }
        Message::SetSceneNodeVisibility(m) => ctx.scene.set_visibility(&m.name, m.visible),
        Message::SetSceneNodeClickable(m) => {
            ctx.scene.set_clickable(&m.name, m.clickable);
            if !m.clickable {
                ctx.pointer.forget(&m.name);
            }
        }
        Message::BackgroundImage(m) => ctx.scene.set_background(m),
        Message::ResetScene => {
            ctx.scene.reset();
            ctx.pointer.retain_live(ctx.scene);
        }

        // ── Camera and pointer ──
        Message::SetCameraPosition(m) => {
            let world = ctx.scene.world_transform();
            ctx.camera.apply_position(&world, &m);
        }
        Message::SetCameraLookAt(m) => {
            let world = ctx.scene.world_transform();
            ctx.camera.apply_look_at(&world, &m);
        }
        Message::SetCameraUpDirection(m) => {
            let world = ctx.scene.world_transform();
            ctx.camera.apply_up_direction(&world, &m);
        }
        Message::SetCameraFov(m) => ctx.camera.apply_fov(&m),
        Message::ScenePointerEnable(m) => ctx.pointer.set_scene_pointer(m.event_type, m.enable),

        // ── GUI ──
        Message::GuiModal(m) => ctx.gui.open_modal(m),
        Message::GuiCloseModal(m) => ctx.gui.close_modal(&m.id),
        Message::GuiRemove(m) => ctx.gui.remove_component(&m.id),
        Message::GuiUpdate(m) => match ctx.gui.update_component(&m.id, &m.updates) {
            Ok(true) => {}
            Ok(false) => log::debug!("update for unknown component {:?}", m.id),
            Err(e) => log::warn!("component {:?}: {e}", m.id),
        },
        Message::ResetGui => ctx.gui.reset(),
        Message::ThemeConfiguration(m) => ctx.gui.set_theme(m),
        Message::SetGuiPanelLabel(m) => ctx.gui.set_label(m.label),
        Message::Notification(m) => ctx.gui.apply_notification(m),
        Message::RemoveNotification(m) => ctx.gui.remove_notification(&m.id),
        Message::ShareUrlUpdated(m) => ctx.gui.set_share_url(m.share_url),
        Message::RunJavascript(m) => {
            log::warn!("ignoring script from server ({} bytes)", m.source.len());
        }

        // ── Transfers ──
        Message::FileTransferStart(m) => {
            let update = ctx.downloads.start(&m);
            finish_download_step(ctx, update);
        }
        Message::FileTransferPart(m) => {
            if let Some(update) = ctx.downloads.part(&m) {
                finish_download_step(ctx, update);
            }
        }
        Message::FileTransferPartAck(m) => match m.source_component_id {
            Some(id) => ctx
                .gui
                .record_upload_ack(&id, m.transferred_bytes, m.total_bytes),
            None => log::debug!("ack for transfer {:?} without a source", m.transfer_uuid),
        },

        // Client-to-server only.
        Message::TransformControlsUpdate(_) => unexpected("TransformControlsUpdateMessage"),
        Message::ViewerCamera(_) => unexpected("ViewerCameraMessage"),
        Message::ScenePointer(_) => unexpected("ScenePointerMessage"),
        Message::SceneNodeClick(_) => unexpected("SceneNodeClickMessage"),
        Message::ShareUrlRequest => unexpected("ShareUrlRequest"),
        Message::ShareUrlDisconnect => unexpected("ShareUrlDisconnect"),
        Message::GetRenderResponse(_) => unexpected("GetRenderResponseMessage"),

        Message::GetRenderRequest(_) => {
            log::warn!("render request reached the apply table; ignoring");
        }

        // Consumed by the tables above.
        Message::Frame(_)
        | Message::BatchedAxes(_)
        | Message::Grid(_)
        | Message::Label(_)
        | Message::Gui3D(_)
        | Message::PointCloud(_)
        | Message::MeshBone(_)
        | Message::Mesh(_)
        | Message::SkinnedMesh(_)
        | Message::CameraFrustum(_)
        | Message::TransformControls(_)
        | Message::Image(_)
        | Message::Glb(_)
        | Message::CatmullRomSpline(_)
        | Message::CubicBezierSpline(_)
        | Message::GaussianSplats(_)
        | Message::GuiAddFolder(_)
        | Message::GuiAddTabGroup(_)
        | Message::GuiAddMarkdown(_)
        | Message::GuiAddProgressBar(_)
        | Message::GuiAddPlotly(_)
        | Message::GuiAddButton(_)
        | Message::GuiAddUploadButton(_)
        | Message::GuiAddSlider(_)
        | Message::GuiAddMultiSlider(_)
        | Message::GuiAddNumber(_)
        | Message::GuiAddRgb(_)
        | Message::GuiAddRgba(_)
        | Message::GuiAddCheckbox(_)
        | Message::GuiAddVector2(_)
        | Message::GuiAddVector3(_)
        | Message::GuiAddText(_)
        | Message::GuiAddDropdown(_)
        | Message::GuiAddButtonGroup(_) => {}
    }
}

fn unexpected(kind: &str) {
    log::warn!("ignoring client-to-server {kind} received from the server");
}

fn finish_download_step<C>(ctx: &mut DispatchContext<'_, C>, update: DownloadUpdate) {
    match update {
        DownloadUpdate::InProgress(progress) => {
            ctx.gui
                .upsert_notification(Notification::for_download(&progress));
        }
        DownloadUpdate::Complete { progress, file } => {
            ctx.gui
                .upsert_notification(Notification::for_download(&progress));
            let filename = file.filename.clone();
            if let Err(e) = ctx.sink.store(file) {
                log::error!("could not store download {filename:?}: {e}");
            }
        }
        DownloadUpdate::Failed(progress) => {
            ctx.gui
                .remove_notification(&Notification::download_id(&progress.transfer_uuid));
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use serde_bytes::ByteBuf;
    use serde_json::{json, Map};

    use super::*;
    use crate::camera::CameraSync;
    use crate::gui::GuiStore;
    use crate::coords::Viewport;
    use crate::input::{PointerEvent, PointerState};
    use crate::protocol::camera::SetCameraFovMessage;
    use crate::protocol::gui::{GuiAddCheckboxMessage, GuiUpdateMessage};
    use crate::protocol::scene::{
        FrameMessage, RemoveSceneNodeMessage, SetPositionMessage,
        SetSceneNodeClickableMessage, SetSceneNodeVisibilityMessage,
    };
    use crate::protocol::transfer::{FileTransferPart, FileTransferPartAck, FileTransferStart};
    use crate::scene::SceneGraph;
    use crate::transfer::{Downloads, MemorySink};

    struct Harness {
        scene: SceneGraph,
        gui: GuiStore,
        camera: CameraSync,
        pointer: PointerState,
        downloads: Downloads,
        sink: MemorySink,
        outbox: Vec<Message>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                scene: SceneGraph::new(),
                gui: GuiStore::new(),
                camera: CameraSync::default(),
                pointer: PointerState::new(),
                downloads: Downloads::new(),
                sink: MemorySink::default(),
                outbox: Vec::new(),
            }
        }

        fn apply(&mut self, message: Message) {
            let mut ctx = DispatchContext {
                scene: &mut self.scene,
                gui: &mut self.gui,
                camera: &mut self.camera,
                pointer: &mut self.pointer,
                downloads: &mut self.downloads,
                sink: &mut self.sink,
                outbox: &mut self.outbox,
            };
            apply(message, &mut ctx);
        }
    }

    fn frame(name: &str) -> Message {
        Message::Frame(FrameMessage {
            name: name.to_owned(),
            show_axes: true,
            axes_length: 0.5,
            axes_radius: 0.025,
            origin_radius: 0.05,
        })
    }

    #[test]
    fn scene_messages_mutate_the_node_table() {
        let mut h = Harness::new();
        h.apply(frame("/robot/arm"));
        assert!(h.scene.contains("/robot"));
        h.apply(Message::SetPosition(SetPositionMessage {
            name: "/robot/arm".to_owned(),
            position: [1.0, 2.0, 3.0],
        }));
        assert_eq!(
            h.scene.attributes("/robot/arm").unwrap().pose().position,
            Vec3::new(1.0, 2.0, 3.0)
        );
        h.apply(Message::SetSceneNodeVisibility(SetSceneNodeVisibilityMessage {
            name: "/robot".to_owned(),
            visible: false,
        }));
        assert!(!h.scene.is_displayed("/robot/arm"));
        h.apply(Message::RemoveSceneNode(RemoveSceneNodeMessage {
            name: "/robot".to_owned(),
        }));
        assert!(!h.scene.contains("/robot/arm"));
        assert!(h.scene.attributes("/robot/arm").is_none());
    }

    #[test]
    fn reset_scene_keeps_only_the_root() {
        let mut h = Harness::new();
        h.apply(frame("/a"));
        h.apply(frame("/b"));
        h.apply(Message::ResetScene);
        assert_eq!(h.scene.len(), 1);
    }

    #[test]
    fn gui_add_then_partial_update() {
        let mut h = Harness::new();
        h.apply(Message::GuiAddCheckbox(GuiAddCheckboxMessage {
            order: 1.0,
            id: "cb".to_owned(),
            label: "Enabled".to_owned(),
            hint: None,
            container_id: "root".to_owned(),
            visible: true,
            disabled: false,
            value: false,
        }));
        let mut updates = Map::new();
        drop(updates.insert("value".to_owned(), json!(true)));
        h.apply(Message::GuiUpdate(GuiUpdateMessage {
            id: "cb".to_owned(),
            updates,
        }));
        assert_eq!(h.gui.component("cb").unwrap().value(), Some(json!(true)));
    }

    #[test]
    fn fov_change_requests_immediate_telemetry() {
        let mut h = Harness::new();
        h.apply(Message::SetCameraFov(SetCameraFovMessage { fov: 1.0 }));
        assert_eq!(h.camera.take_due(), Some(crate::camera::TelemetryDue::Immediate));
    }

    #[test]
    fn download_lands_in_the_sink_with_a_toast() {
        let mut h = Harness::new();
        h.apply(Message::FileTransferStart(FileTransferStart {
            source_component_id: None,
            transfer_uuid: "t1".to_owned(),
            filename: "scan.ply".to_owned(),
            mime_type: "application/octet-stream".to_owned(),
            part_count: 3,
            size_bytes: 300_000,
        }));
        let toast_id = Notification::download_id("t1");
        assert!(h.gui.notification(&toast_id).unwrap().loading);

        for part in 0..3 {
            h.apply(Message::FileTransferPart(FileTransferPart {
                source_component_id: None,
                transfer_uuid: "t1".to_owned(),
                part,
                content: ByteBuf::from(vec![7; 100_000]),
            }));
        }
        assert_eq!(h.sink.files.len(), 1);
        assert_eq!(h.sink.files[0].data.len(), 300_000);
        let toast = h.gui.notification(&toast_id).unwrap();
        assert!(!toast.loading);
        assert!(toast.title.starts_with("Downloaded scan.ply"));
    }

    #[test]
    fn oversized_part_drops_the_download_and_its_toast() {
        let mut h = Harness::new();
        h.apply(Message::FileTransferStart(FileTransferStart {
            source_component_id: None,
            transfer_uuid: "t2".to_owned(),
            filename: "liar.bin".to_owned(),
            mime_type: "application/octet-stream".to_owned(),
            part_count: 1,
            size_bytes: 8,
        }));
        h.apply(Message::FileTransferPart(FileTransferPart {
            source_component_id: None,
            transfer_uuid: "t2".to_owned(),
            part: 0,
            content: ByteBuf::from(vec![1; 64]),
        }));
        assert!(h.sink.files.is_empty());
        assert!(h.gui.notification(&Notification::download_id("t2")).is_none());
        assert_eq!(h.downloads.in_flight(), 0);
    }

    #[test]
    fn disabling_clicks_drops_the_pending_press() {
        let mut h = Harness::new();
        h.apply(frame("/box"));
        h.apply(Message::SetSceneNodeClickable(SetSceneNodeClickableMessage {
            name: "/box".to_owned(),
            clickable: true,
        }));
        let _ = h.pointer.handle(
            &h.scene,
            "/box",
            PointerEvent::Down {
                position: Vec2::ZERO,
            },
            Viewport {
                width: 100,
                height: 100,
            },
            3.0,
        );
        assert!(h.pointer.is_pressed("/box"));
        h.apply(Message::SetSceneNodeClickable(SetSceneNodeClickableMessage {
            name: "/box".to_owned(),
            clickable: false,
        }));
        assert!(!h.pointer.is_pressed("/box"));
    }

    #[test]
    fn acks_without_an_upload_are_ignored() {
        let mut h = Harness::new();
        h.apply(Message::FileTransferPartAck(FileTransferPartAck {
            source_component_id: Some("nobody".to_owned()),
            transfer_uuid: "x".to_owned(),
            transferred_bytes: 1,
            total_bytes: 2,
        }));
        assert!(h.gui.upload("nobody").is_none());
        assert_eq!(h.gui.notifications().count(), 0);
    }

    #[test]
    fn outbound_only_messages_change_nothing() {
        let mut h = Harness::new();
        h.apply(Message::ShareUrlRequest);
        assert!(h.outbox.is_empty());
        assert_eq!(h.scene.len(), 1);
    }
}
