//! The renderer seam.
//!
//! A [`SceneBackend`] turns node payloads into renderable objects and
//! accepts pose and visibility writes for them. The engine never touches a
//! renderable directly: it holds the backend's opaque handles and hands each
//! one back exactly once, to [`SceneBackend::dispose`].

use rustc_hash::FxHashMap;

use super::SceneNode;
use crate::coords::Pose;
use crate::dispatch::capture::CapturedFrame;

/// Renderer-side object factory and sink for per-node state.
pub trait SceneBackend {
    /// Opaque handle to one built renderable.
    type Handle;

    /// Build the renderable for a node's payload.
    fn materialize(&mut self, node: &SceneNode) -> Self::Handle;

    /// Apply a node's pose relative to its parent.
    fn set_pose(&mut self, handle: &mut Self::Handle, pose: &Pose);

    /// Apply a node's own effective visibility. Hiding a parent hides its
    /// subtree; the backend composes visibility hierarchically.
    fn set_visible(&mut self, handle: &mut Self::Handle, visible: bool);

    /// Apply bone poses of a skinned mesh.
    fn set_bones(&mut self, _handle: &mut Self::Handle, _bones: &[Pose]) {}

    /// Per-tick callback, run after every pose for the tick is applied.
    fn on_frame(&mut self, _handle: &mut Self::Handle) {}

    /// Release a renderable built by [`materialize`](Self::materialize).
    fn dispose(&mut self, handle: Self::Handle);

    /// Read back the most recently drawn frame for render capture.
    fn read_frame(&mut self) -> Option<CapturedFrame> {
        None
    }
}

/// State the headless backend keeps per live object.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessObject {
    /// Node name the object was built for.
    pub name: String,
    /// Payload kind.
    pub kind: &'static str,
    /// Last applied pose.
    pub pose: Option<Pose>,
    /// Last applied visibility.
    pub visible: bool,
    /// Number of per-tick callbacks received.
    pub frames: u64,
    /// Number of bone updates received.
    pub bone_updates: u64,
}

/// Handle issued by [`HeadlessBackend`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HeadlessHandle(u64);

/// Backend without a display: tracks live objects and what was written to
/// them, and answers frame reads with a solid fill.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    objects: FxHashMap<u64, HeadlessObject>,
    next_handle: u64,
    built: u64,
    disposed: u64,
    frame_size: Option<(u32, u32)>,
}

impl HeadlessBackend {
    /// An empty backend that cannot read back frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also answer frame reads with a mid-gray frame of this size.
    #[must_use]
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    /// Live object built for `name`, if any.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&HeadlessObject> {
        self.objects.values().find(|o| o.name == name)
    }

    /// Number of live objects.
    #[must_use]
    pub fn live(&self) -> usize {
        self.objects.len()
    }

    /// Total objects ever built.
    #[must_use]
    pub fn built(&self) -> u64 {
        self.built
    }

    /// Total objects ever disposed.
    #[must_use]
    pub fn disposed(&self) -> u64 {
        self.disposed
    }

    fn object_mut(&mut self, handle: &HeadlessHandle) -> Option<&mut HeadlessObject> {
        self.objects.get_mut(&handle.0)
    }
}

impl SceneBackend for HeadlessBackend {
    type Handle = HeadlessHandle;

    fn materialize(&mut self, node: &SceneNode) -> HeadlessHandle {
        self.next_handle += 1;
        self.built += 1;
        drop(self.objects.insert(
            self.next_handle,
            HeadlessObject {
                name: node.name().to_owned(),
                kind: node.payload().kind(),
                pose: None,
                visible: true,
                frames: 0,
                bone_updates: 0,
            },
        ));
        log::debug!("built {} for {:?}", node.payload().kind(), node.name());
        HeadlessHandle(self.next_handle)
    }

    fn set_pose(&mut self, handle: &mut HeadlessHandle, pose: &Pose) {
        if let Some(object) = self.object_mut(handle) {
            object.pose = Some(*pose);
        }
    }

    fn set_visible(&mut self, handle: &mut HeadlessHandle, visible: bool) {
        if let Some(object) = self.object_mut(handle) {
            object.visible = visible;
        }
    }

    fn set_bones(&mut self, handle: &mut HeadlessHandle, _bones: &[Pose]) {
        if let Some(object) = self.object_mut(handle) {
            object.bone_updates += 1;
        }
    }

    fn on_frame(&mut self, handle: &mut HeadlessHandle) {
        if let Some(object) = self.object_mut(handle) {
            object.frames += 1;
        }
    }

    fn dispose(&mut self, handle: HeadlessHandle) {
        match self.objects.remove(&handle.0) {
            Some(object) => {
                self.disposed += 1;
                log::debug!("disposed {:?}", object.name);
            }
            None => log::error!("dispose of unknown handle {}", handle.0),
        }
    }

    fn read_frame(&mut self) -> Option<CapturedFrame> {
        let (width, height) = self.frame_size?;
        Some(CapturedFrame {
            width,
            height,
            rgba: vec![128; width as usize * height as usize * 4],
        })
    }
}
