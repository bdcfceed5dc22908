//! Pointer input: click-vs-drag gesture tracking on clickable nodes and
//! scene-wide pointer reporting.

/// Click-versus-drag state machine.
mod click;
/// Pointer event types.
pub mod event;

pub use click::ClickTracker;
pub use event::PointerEvent;
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::coords::{Ray, Viewport};
use crate::protocol::camera::{
    SceneNodeClickMessage, ScenePointerEventType, ScenePointerMessage,
};
use crate::scene::SceneGraph;

/// Gesture state for every node that has seen pointer input, the hovered
/// node, and the scene-wide pointer mode set by the server.
#[derive(Debug, Default)]
pub struct PointerState {
    trackers: FxHashMap<String, ClickTracker>,
    hovered: Option<String>,
    scene_pointer: Option<ScenePointerEventType>,
}

impl PointerState {
    /// Fresh state with scene pointer reporting disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer event targeted at `name`.
    ///
    /// Events on nodes that are not clickable, or not displayed, are
    /// ignored. Returns the click message when a press/release pair
    /// completes without dragging.
    pub fn handle(
        &mut self,
        scene: &SceneGraph,
        name: &str,
        event: PointerEvent,
        viewport: Viewport,
        threshold: f32,
    ) -> Option<SceneNodeClickMessage> {
        let node = scene.node(name).filter(|node| node.clickable())?;
        if !scene.is_displayed(name) {
            return None;
        }
        match event {
            PointerEvent::Down { position } => {
                self.tracker(name).down(position);
                None
            }
            PointerEvent::Move { position } => {
                self.tracker(name).moved(position, threshold);
                None
            }
            PointerEvent::Up {
                position,
                ray,
                instance_id,
            } => {
                if !self.tracker(name).up(position, threshold) {
                    return None;
                }
                let (ray_origin, ray_direction) =
                    ray.to_wire(&scene.world_transform());
                Some(SceneNodeClickMessage {
                    name: name.to_owned(),
                    instance_index: node
                        .payload()
                        .click_instance_index(instance_id),
                    ray_origin,
                    ray_direction,
                    screen_pos: viewport.normalize(position),
                })
            }
            PointerEvent::Over => {
                self.hovered = Some(name.to_owned());
                None
            }
            PointerEvent::Out => {
                if self.hovered.as_deref() == Some(name) {
                    self.hovered = None;
                }
                None
            }
        }
    }

    fn tracker(&mut self, name: &str) -> &mut ClickTracker {
        self.trackers.entry(name.to_owned()).or_default()
    }

    /// Node under the cursor, if it is still clickable and displayed.
    #[must_use]
    pub fn hovered<'a>(&'a self, scene: &SceneGraph) -> Option<&'a str> {
        self.hovered.as_deref().filter(|name| {
            scene.node(name).is_some_and(|n| n.clickable())
                && scene.is_displayed(name)
        })
    }

    /// Drop gesture and hover state of one node, e.g. when it stops being
    /// clickable.
    pub fn forget(&mut self, name: &str) {
        drop(self.trackers.remove(name));
        if self.hovered.as_deref() == Some(name) {
            self.hovered = None;
        }
    }

    /// Whether a press on `name` is being tracked.
    #[must_use]
    pub fn is_pressed(&self, name: &str) -> bool {
        self.trackers.get(name).is_some_and(ClickTracker::is_pressed)
    }

    /// Drop gesture state of nodes that no longer exist.
    pub fn retain_live(&mut self, scene: &SceneGraph) {
        self.trackers.retain(|name, _| scene.contains(name));
        if self.hovered.as_deref().is_some_and(|n| !scene.contains(n)) {
            self.hovered = None;
        }
    }

    // -- Scene-wide pointer --

    /// Enable or disable scene-wide pointer reporting of one kind.
    /// Disabling a kind that is not active leaves the current mode alone.
    pub fn set_scene_pointer(&mut self, kind: ScenePointerEventType, enable: bool) {
        if enable {
            self.scene_pointer = Some(kind);
        } else if self.scene_pointer == Some(kind) {
            self.scene_pointer = None;
        }
    }

    /// Active scene-wide pointer mode.
    #[must_use]
    pub fn scene_pointer(&self) -> Option<ScenePointerEventType> {
        self.scene_pointer
    }

    /// Scene click message, if click reporting is enabled.
    #[must_use]
    pub fn scene_click(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        position: Vec2,
        viewport: Viewport,
    ) -> Option<ScenePointerMessage> {
        if self.scene_pointer != Some(ScenePointerEventType::Click) {
            return None;
        }
        let (origin, direction) = ray.to_wire(&scene.world_transform());
        Some(ScenePointerMessage {
            event_type: ScenePointerEventType::Click,
            ray_origin: Some(origin),
            ray_direction: Some(direction),
            screen_pos: vec![viewport.normalize(position)],
        })
    }

    /// Rectangle selection message, if rect-select reporting is enabled.
    /// Corners are reported min first, max second.
    #[must_use]
    pub fn scene_rect(
        &self,
        start: Vec2,
        end: Vec2,
        viewport: Viewport,
    ) -> Option<ScenePointerMessage> {
        if self.scene_pointer != Some(ScenePointerEventType::RectSelect) {
            return None;
        }
        Some(ScenePointerMessage {
            event_type: ScenePointerEventType::RectSelect,
            ray_origin: None,
            ray_direction: None,
            screen_pos: vec![
                viewport.normalize(start.min(end)),
                viewport.normalize(start.max(end)),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::NodePayload;

    const VIEWPORT: Viewport = Viewport {
        width: 200,
        height: 100,
    };

    fn up(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Up {
            position: Vec2::new(x, y),
            ray: Ray {
                origin: Vec3::ZERO,
                direction: Vec3::NEG_Z,
            },
            instance_id: None,
        }
    }

    fn down(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Down {
            position: Vec2::new(x, y),
        }
    }

    fn clickable_scene() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let _ = scene.add_node("/box", NodePayload::Group);
        scene.set_clickable("/box", true);
        scene
    }

    #[test]
    fn click_carries_normalized_position_and_wire_ray() {
        let scene = clickable_scene();
        let mut pointer = PointerState::new();
        assert!(pointer
            .handle(&scene, "/box", down(100.0, 100.0), VIEWPORT, 3.0)
            .is_none());
        let click = pointer
            .handle(&scene, "/box", up(102.0, 101.0), VIEWPORT, 3.0)
            .unwrap();
        assert_eq!(click.name, "/box");
        assert_eq!(click.instance_index, None);
        assert_eq!(click.screen_pos, [0.51, 1.01]);
        // Internal -Z maps back into the wire frame as a unit vector.
        let dir = Vec3::from_array(click.ray_direction);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn drag_does_not_click() {
        let scene = clickable_scene();
        let mut pointer = PointerState::new();
        let _ = pointer.handle(&scene, "/box", down(100.0, 100.0), VIEWPORT, 3.0);
        assert!(pointer
            .handle(&scene, "/box", up(110.0, 100.0), VIEWPORT, 3.0)
            .is_none());
    }

    #[test]
    fn hidden_or_unclickable_nodes_ignore_input() {
        let mut scene = clickable_scene();
        let mut pointer = PointerState::new();
        scene.set_visibility("/box", false);
        let _ = pointer.handle(&scene, "/box", down(0.0, 0.0), VIEWPORT, 3.0);
        assert!(pointer.handle(&scene, "/box", up(0.0, 0.0), VIEWPORT, 3.0).is_none());

        scene.set_visibility("/box", true);
        scene.set_clickable("/box", false);
        let _ = pointer.handle(&scene, "/box", PointerEvent::Over, VIEWPORT, 3.0);
        assert!(pointer.hovered(&scene).is_none());
    }

    #[test]
    fn forgotten_press_does_not_complete_a_click() {
        let mut scene = clickable_scene();
        let mut pointer = PointerState::new();
        let _ = pointer.handle(&scene, "/box", down(10.0, 10.0), VIEWPORT, 3.0);
        let _ = pointer.handle(&scene, "/box", PointerEvent::Over, VIEWPORT, 3.0);
        assert!(pointer.is_pressed("/box"));

        scene.set_clickable("/box", false);
        pointer.forget("/box");
        assert!(!pointer.is_pressed("/box"));

        scene.set_clickable("/box", true);
        assert!(pointer.hovered(&scene).is_none());
        assert!(pointer
            .handle(&scene, "/box", up(10.0, 10.0), VIEWPORT, 3.0)
            .is_none());
    }

    #[test]
    fn hover_follows_over_and_out() {
        let scene = clickable_scene();
        let mut pointer = PointerState::new();
        let _ = pointer.handle(&scene, "/box", PointerEvent::Over, VIEWPORT, 3.0);
        assert_eq!(pointer.hovered(&scene), Some("/box"));
        let _ = pointer.handle(&scene, "/box", PointerEvent::Out, VIEWPORT, 3.0);
        assert!(pointer.hovered(&scene).is_none());
    }

    #[test]
    fn scene_pointer_modes_gate_messages() {
        let scene = SceneGraph::new();
        let mut pointer = PointerState::new();
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        assert!(pointer.scene_click(&scene, &ray, Vec2::ZERO, VIEWPORT).is_none());

        pointer.set_scene_pointer(ScenePointerEventType::RectSelect, true);
        let rect = pointer
            .scene_rect(Vec2::new(100.0, 50.0), Vec2::ZERO, VIEWPORT)
            .unwrap();
        assert_eq!(rect.screen_pos, vec![[0.0, 0.0], [0.5, 0.5]]);

        pointer.set_scene_pointer(ScenePointerEventType::Click, false);
        assert_eq!(
            pointer.scene_pointer(),
            Some(ScenePointerEventType::RectSelect)
        );
        pointer.set_scene_pointer(ScenePointerEventType::Click, true);
        assert!(pointer.scene_click(&scene, &ray, Vec2::ZERO, VIEWPORT).is_some());
        assert!(pointer.scene_rect(Vec2::ZERO, Vec2::ONE, VIEWPORT).is_none());
    }
}
