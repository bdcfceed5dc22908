//! Per-tick reconciliation of the node table onto a [`SceneBackend`].
//!
//! The mirror owns one entry per registered node, keyed by name and tagged
//! with the [`NodeId`] it was built for. A node is *registered* once it is
//! in the [`SceneGraph`] and *materialized* once the backend has built its
//! renderable. Every handle the mirror obtains from
//! [`SceneBackend::materialize`] goes back through
//! [`SceneBackend::dispose`] exactly once: on removal, on replacement (id
//! change), on an invisibility unmount, or in [`SceneMirror::dispose_all`].

use rustc_hash::FxHashMap;

use super::backend::SceneBackend;
use super::{NodeAttributes, NodeId, SceneGraph};

struct Mounted<H> {
    node_id: NodeId,
    handle: Option<H>,
    /// Mount state requested on the previous tick but not yet applied.
    pending: Option<bool>,
}

/// Renderer-side view of the scene: which nodes have live objects.
pub struct SceneMirror<H> {
    entries: FxHashMap<String, Mounted<H>>,
    /// Names in the order of the last walk, for per-frame callbacks.
    order: Vec<String>,
}

impl<H> SceneMirror<H> {
    /// A mirror with nothing materialized.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Whether a node currently has a live renderable.
    #[must_use]
    pub fn is_mounted(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.handle.is_some())
    }

    /// Live handle for a node.
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<&H> {
        self.entries.get(name).and_then(|e| e.handle.as_ref())
    }

    /// Number of live renderables.
    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.entries.values().filter(|e| e.handle.is_some()).count()
    }

    /// Bring the backend in line with the scene.
    ///
    /// Stale entries are disposed first, then the tree is walked from the
    /// root so parents are handled before children. Pose writes are applied
    /// here, before any other per-node work of the tick.
    pub fn reconcile<B>(&mut self, scene: &mut SceneGraph, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        self.evict_stale(scene, backend);

        let walk = scene.walk();
        self.order.clear();
        for (name, ancestors_visible) in walk {
            let Some(node) = scene.node(&name) else {
                continue;
            };
            let node_id = node.id();
            let unmounts = node.payload().unmount_when_invisible();
            let own_visible = scene
                .attributes(&name)
                .is_none_or(NodeAttributes::effective_visibility);
            let wants_mount = !unmounts || (ancestors_visible && own_visible);

            let entry = self.entries.entry(name.clone()).or_insert_with(|| {
                Mounted {
                    node_id,
                    handle: None,
                    // New nodes mount (or stay unmounted) without delay.
                    pending: Some(wants_mount),
                }
            });

            let mounted = entry.handle.is_some();
            if wants_mount == mounted {
                entry.pending = None;
            } else if entry.pending == Some(wants_mount) {
                entry.pending = None;
                if let Some(handle) = entry.handle.take() {
                    log::debug!("unmounting hidden {name:?}");
                    backend.dispose(handle);
                } else if let Some(node) = scene.node(&name) {
                    entry.handle = Some(backend.materialize(node));
                    scene.attributes_mut(&name).object_built();
                    if let Some(bones) = scene.bones(&name) {
                        if let Some(handle) = entry.handle.as_mut() {
                            backend.set_bones(handle, bones);
                        }
                    }
                }
            } else {
                // First tick of a mismatch; apply it if it is still there
                // on the next one.
                entry.pending = Some(wants_mount);
            }

            if let Some(handle) = entry.handle.as_mut() {
                backend.set_visible(handle, own_visible);
                if let Some(pose) = scene.attributes_mut(&name).take_pose_update()
                {
                    backend.set_pose(handle, &pose);
                }
            }
            self.order.push(name);
        }

        for name in scene.take_dirty_bones() {
            let (Some(entry), Some(bones)) =
                (self.entries.get_mut(&name), scene.bones(&name))
            else {
                continue;
            };
            if let Some(handle) = entry.handle.as_mut() {
                backend.set_bones(handle, bones);
            }
        }
    }

    fn evict_stale<B>(&mut self, scene: &SceneGraph, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(name, entry)| {
                scene.node(name).is_none_or(|node| node.id() != entry.node_id)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in stale {
            if let Some(handle) =
                self.entries.remove(&name).and_then(|entry| entry.handle)
            {
                log::debug!("disposing {name:?}");
                backend.dispose(handle);
            }
        }
    }

    /// Run per-frame callbacks of every live renderable, in tree order.
    pub fn run_frame_callbacks<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        for name in &self.order {
            if let Some(handle) =
                self.entries.get_mut(name).and_then(|e| e.handle.as_mut())
            {
                backend.on_frame(handle);
            }
        }
    }

    /// Dispose every live renderable.
    pub fn dispose_all<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        for (_, entry) in self.entries.drain() {
            if let Some(handle) = entry.handle {
                backend.dispose(handle);
            }
        }
        self.order.clear();
    }
}

impl<H> Default for SceneMirror<H> {
    fn default() -> Self {
        Self::new()
    }
}
