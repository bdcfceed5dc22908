//! Local interactions that report back to the server.

use glam::Vec2;
use serde_json::Value;
use web_time::Instant;

use super::SceneClient;
use crate::camera::OrbitCamera;
use crate::coords::Pose;
use crate::error::ClientError;
use crate::gui::UploadProgress;
use crate::input::PointerEvent;
use crate::protocol::scene::TransformControlsUpdateMessage;
use crate::protocol::Message;
use crate::scene::backend::SceneBackend;
use crate::scene::NodePayload;
use crate::transfer::UploadPlan;
use crate::transport::Transport;

// ── Pointer ──

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    /// Feed a pointer event the renderer hit-tested against node `name`.
    /// Returns whether it completed a click.
    pub fn pointer_event(&mut self, name: &str, event: PointerEvent) -> bool {
        let threshold = self.options.interaction.click_drag_threshold_px;
        let Some(click) = self
            .pointer
            .handle(&self.scene, name, event, self.viewport, threshold)
        else {
            return false;
        };
        log::debug!("click on {name:?}");
        let message = Message::SceneNodeClick(click);
        self.outbox
            .extend(self.throttles.clicks.offer(message, Instant::now()));
        true
    }

    /// A click on empty space at `pixel`. Reported only while the server
    /// has enabled scene click events.
    pub fn scene_click(&mut self, pixel: Vec2) -> bool {
        let ray = self.pixel_ray(pixel);
        let Some(message) =
            self.pointer
                .scene_click(&self.scene, &ray, pixel, self.viewport)
        else {
            return false;
        };
        self.outbox.push(Message::ScenePointer(message));
        true
    }

    /// A rectangle dragged from `start` to `end`. Reported only while the
    /// server has enabled rect-select events.
    pub fn scene_rect(&mut self, start: Vec2, end: Vec2) -> bool {
        let Some(message) = self.pointer.scene_rect(start, end, self.viewport) else {
            return false;
        };
        self.outbox.push(Message::ScenePointer(message));
        true
    }
}

// ── Camera ──

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    /// Move the camera locally. Telemetry follows through its throttle.
    pub fn update_camera(&mut self, change: impl FnOnce(&mut OrbitCamera)) {
        self.camera.update(change);
    }

    /// Return the camera to where it was when telemetry was first sent.
    pub fn reset_camera(&mut self) -> bool {
        self.camera.reset_view()
    }
}

// ── GUI ──

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    /// Change a component's value from the control panel. Returns whether
    /// the component exists.
    ///
    /// # Errors
    ///
    /// [`ClientError::GuiUpdate`] when the value does not fit the
    /// component.
    pub fn set_gui_value(&mut self, id: &str, value: Value) -> Result<bool, ClientError> {
        let Some(update) = self.gui.set_value(id, value)? else {
            return Ok(false);
        };
        let message = Message::GuiUpdate(update);
        self.outbox
            .extend(self.throttles.gui.offer(id.to_owned(), message, Instant::now()));
        Ok(true)
    }

    /// Upload a file on behalf of an upload button. All parts are queued
    /// at once; acks only drive the progress display. Returns the transfer
    /// id, or `None` while disconnected.
    pub fn upload_file(
        &mut self,
        component_id: &str,
        filename: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Option<String> {
        if !self.connected {
            log::warn!("cannot upload {filename:?}: not connected");
            return None;
        }
        let plan = UploadPlan::new(
            component_id,
            filename,
            mime_type,
            data,
            self.options.transfer.upload_chunk_bytes,
        );
        let transfer_uuid = plan.transfer_uuid().to_owned();
        log::debug!(
            "uploading {filename:?}: {} bytes in {} parts",
            plan.size_bytes(),
            plan.part_count()
        );
        self.gui.start_upload(
            component_id,
            UploadProgress {
                uploaded_bytes: 0,
                total_bytes: plan.size_bytes(),
                filename: filename.to_owned(),
                transfer_uuid: transfer_uuid.clone(),
            },
        );
        self.outbox.extend(plan);
        Some(transfer_uuid)
    }

    /// Ask the server for a share link.
    pub fn request_share_url(&mut self) {
        self.outbox.push(Message::ShareUrlRequest);
    }

    /// Revoke the share link.
    pub fn disconnect_share_url(&mut self) {
        self.outbox.push(Message::ShareUrlDisconnect);
    }
}

// ── Transform gizmos ──

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    /// Apply a local drag of the transform gizmo `name`. `pose` is
    /// relative to the gizmo's parent, as the server addresses it.
    /// Returns whether `name` is a gizmo.
    pub fn drag_transform_controls(&mut self, name: &str, pose: Pose) -> bool {
        let is_gizmo = self
            .scene
            .node(name)
            .is_some_and(|node| matches!(node.payload(), NodePayload::TransformControls(_)));
        if !is_gizmo {
            log::warn!("drag on {name:?}, which is not a transform control");
            return false;
        }
        self.scene.set_pose(name, pose);
        let (wxyz, position) = pose.to_wire();
        let message = Message::TransformControlsUpdate(TransformControlsUpdateMessage {
            name: name.to_owned(),
            wxyz,
            position,
        });
        self.outbox.extend(
            self.throttles
                .transforms
                .offer(name.to_owned(), message, Instant::now()),
        );
        true
    }

    /// Force a node shown or hidden locally, or hand visibility back to
    /// the server with `None`.
    pub fn set_override_visibility(&mut self, name: &str, visible: Option<bool>) {
        self.scene.set_override_visibility(name, visible);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};
    use serde_json::json;

    use super::super::tests::{connected_client, frame};
    use crate::camera::CameraControls;
    use crate::coords::Ray;
    use crate::protocol::camera::{ScenePointerEnableMessage, ScenePointerEventType};
    use crate::protocol::gui::GuiAddSliderMessage;
    use crate::protocol::scene::{SetSceneNodeClickableMessage, TransformControlsMessage};
    use crate::protocol::transfer::FileTransferPartAck;
    use crate::protocol::Message;
    use crate::transport::TransportEvent;

    use super::*;

    fn up_at(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Up {
            position: Vec2::new(x, y),
            ray: Ray {
                origin: Vec3::ZERO,
                direction: Vec3::NEG_Z,
            },
            instance_id: None,
        }
    }

    #[test]
    fn click_within_threshold_reaches_the_server() {
        let mut client = connected_client();
        client.transport.events.push_back(TransportEvent::Batch(vec![
            frame("/box"),
            Message::SetSceneNodeClickable(SetSceneNodeClickableMessage {
                name: "/box".to_owned(),
                clickable: true,
            }),
        ]));
        client.tick();

        let down = PointerEvent::Down {
            position: Vec2::new(100.0, 100.0),
        };
        assert!(!client.pointer_event("/box", down));
        assert!(client.pointer_event("/box", up_at(102.0, 101.0)));
        client.tick();
        assert!(client
            .transport
            .sent
            .iter()
            .any(|m| matches!(m, Message::SceneNodeClick(c) if c.name == "/box")));
    }

    #[test]
    fn drag_is_not_a_click() {
        let mut client = connected_client();
        client.transport.events.push_back(TransportEvent::Batch(vec![
            frame("/box"),
            Message::SetSceneNodeClickable(SetSceneNodeClickableMessage {
                name: "/box".to_owned(),
                clickable: true,
            }),
        ]));
        client.tick();
        let down = PointerEvent::Down {
            position: Vec2::new(100.0, 100.0),
        };
        let _ = client.pointer_event("/box", down);
        assert!(!client.pointer_event("/box", up_at(110.0, 100.0)));
    }

    #[test]
    fn scene_clicks_need_the_server_to_enable_them() {
        let mut client = connected_client();
        assert!(!client.scene_click(Vec2::new(640.0, 360.0)));
        client.transport.events.push_back(TransportEvent::Batch(vec![
            Message::ScenePointerEnable(ScenePointerEnableMessage {
                enable: true,
                event_type: ScenePointerEventType::Click,
            }),
        ]));
        client.tick();
        assert!(client.scene_click(Vec2::new(640.0, 360.0)));
        client.tick();
        let Some(Message::ScenePointer(pointer)) = client.transport.sent.last() else {
            panic!("expected a scene pointer message");
        };
        assert_eq!(pointer.screen_pos, vec![[0.5, 0.5]]);
    }

    #[test]
    fn slider_drags_are_throttled_to_the_latest_value() {
        let mut client = connected_client();
        client
            .transport
            .events
            .push_back(TransportEvent::Batch(vec![Message::GuiAddSlider(
                GuiAddSliderMessage {
                    order: 0.0,
                    id: "s".to_owned(),
                    label: "Size".to_owned(),
                    container_id: "root".to_owned(),
                    hint: None,
                    value: 1.0,
                    visible: true,
                    disabled: false,
                    min: 0.0,
                    max: 10.0,
                    step: Some(0.1),
                    precision: 1,
                    marks: None,
                },
            )]));
        client.tick();

        for v in [2.0, 3.0, 4.0] {
            assert!(client.set_gui_value("s", json!(v)).unwrap());
        }
        client.tick();
        let updates: Vec<_> = client
            .transport
            .sent
            .iter()
            .filter_map(|m| match m {
                Message::GuiUpdate(u) => Some(u.updates["value"].clone()),
                _ => None,
            })
            .collect();
        assert_eq!(updates, vec![json!(2.0)]);
        assert_eq!(client.gui.component("s").unwrap().value(), Some(json!(4.0)));

        std::thread::sleep(client.options.interaction.gui_send_interval());
        client.tick();
        assert!(client.transport.sent.iter().any(
            |m| matches!(m, Message::GuiUpdate(u) if u.updates["value"] == json!(4.0))
        ));
    }

    #[test]
    fn upload_sends_start_and_parts_and_tracks_acks() {
        let mut client = connected_client();
        let data = vec![1u8; 1_200_000];
        let uuid = client
            .upload_file("upload", "big.bin", "application/octet-stream", data)
            .unwrap();
        client.tick();
        let parts = client
            .transport
            .sent
            .iter()
            .filter(|m| matches!(m, Message::FileTransferPart(_)))
            .count();
        assert_eq!(parts, 3);
        assert!(client.gui.upload("upload").is_some());

        client.transport.events.push_back(TransportEvent::Batch(vec![
            Message::FileTransferPartAck(FileTransferPartAck {
                source_component_id: Some("upload".to_owned()),
                transfer_uuid: uuid,
                transferred_bytes: 1_200_000,
                total_bytes: 1_200_000,
            }),
        ]));
        client.tick();
        assert!(client.gui.upload("upload").is_none());
    }

    #[test]
    fn uploads_need_a_connection() {
        let mut client = super::super::tests::client();
        assert!(client
            .upload_file("upload", "a.txt", "text/plain", b"hi".to_vec())
            .is_none());
        assert!(client.gui.upload("upload").is_none());
    }

    #[test]
    fn rect_select_reports_sorted_corners() {
        let mut client = connected_client();
        client.transport.events.push_back(TransportEvent::Batch(vec![
            Message::ScenePointerEnable(ScenePointerEnableMessage {
                enable: true,
                event_type: ScenePointerEventType::RectSelect,
            }),
        ]));
        client.tick();
        assert!(client.scene_rect(Vec2::new(640.0, 360.0), Vec2::ZERO));
        client.tick();
        let Some(Message::ScenePointer(pointer)) = client.transport.sent.last() else {
            panic!("expected a scene pointer message");
        };
        assert_eq!(pointer.screen_pos, vec![[0.0, 0.0], [0.5, 0.5]]);
    }

    #[test]
    fn gizmo_drag_moves_the_node_and_reports_local_pose() {
        let mut client = connected_client();
        client
            .transport
            .events
            .push_back(TransportEvent::Batch(vec![Message::TransformControls(
                TransformControlsMessage {
                    name: "/gizmo".to_owned(),
                    scale: 1.0,
                    line_width: 2.5,
                    fixed: false,
                    auto_transform: true,
                    active_axes: [true; 3],
                    disable_axes: false,
                    disable_sliders: false,
                    disable_rotations: false,
                    translation_limits: [[-1000.0, 1000.0]; 3],
                    rotation_limits: [[-1000.0, 1000.0]; 3],
                    depth_test: true,
                    opacity: 1.0,
                },
            )]));
        client.tick();

        let pose = Pose {
            orientation: Quat::from_rotation_z(0.5),
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        assert!(client.drag_transform_controls("/gizmo", pose));
        client.tick();
        let Some(Message::TransformControlsUpdate(update)) = client.transport.sent.last() else {
            panic!("expected a transform update");
        };
        assert_eq!(update.position, [1.0, 2.0, 3.0]);
        assert!(client.backend.object("/gizmo").unwrap().pose.is_some());
        assert!(!client.drag_transform_controls("/nothing", pose));
    }

    #[test]
    fn camera_moves_produce_telemetry() {
        let mut client = connected_client();
        std::thread::sleep(client.options.interaction.camera_send_interval());
        client.update_camera(|camera| camera.set_target(Vec3::new(1.0, 0.0, 0.0)));
        client.tick();
        assert!(matches!(client.transport.sent.last(), Some(Message::ViewerCamera(_))));
    }
}
