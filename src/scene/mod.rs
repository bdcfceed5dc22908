//! Authoritative scene store: the node table, per-node attributes, and the
//! renderer-facing reconciliation pass.
//!
//! Nodes are addressed by slash-separated paths; the parent of `/a/b` is
//! `/a`, and top-level names hang off the root node `""`, which always
//! exists. The root's pose doubles as the wire-to-internal world transform
//! (see [`crate::coords`]).
//!
//! Mutation flows only through [`SceneGraph`]'s methods, called by the
//! message dispatcher on tick boundaries and by local interactions between
//! ticks. The renderer side reads it through [`mirror::SceneMirror`], which
//! pairs every object it builds with exactly one disposal.

mod attributes;
pub mod backend;
pub mod mirror;
mod node;
pub mod watch;

pub use attributes::{NodeAttributes, PoseUpdateState};
use glam::{Quat, Vec3};
pub use node::{parent_name, NodeId, NodePayload, SceneNode};
use rustc_hash::FxHashMap;

use crate::coords::{default_root_orientation, Pose, WorldTransform};
use crate::protocol::scene::BackgroundImageMessage;

/// Name of the root node.
pub const ROOT: &str = "";

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// The node table plus everything keyed by node name.
pub struct SceneGraph {
    nodes: FxHashMap<String, SceneNode>,
    attributes: FxHashMap<String, NodeAttributes>,
    bones: FxHashMap<String, Vec<Pose>>,
    dirty_bones: Vec<String>,
    background: Option<BackgroundImageMessage>,
    next_node_id: u64,
    /// Monotonically increasing generation; bumped on structural change.
    generation: u64,
}

impl SceneGraph {
    /// A scene holding only the root node, oriented to map the wire's +Z up
    /// axis onto the internal +Y up axis.
    #[must_use]
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: FxHashMap::default(),
            attributes: FxHashMap::default(),
            bones: FxHashMap::default(),
            dirty_bones: Vec::new(),
            background: None,
            next_node_id: 0,
            generation: 0,
        };
        scene.insert_root();
        scene
    }

    fn insert_root(&mut self) {
        let id = self.allocate_id();
        drop(self.nodes.insert(
            ROOT.to_owned(),
            SceneNode::new(id, ROOT.to_owned(), NodePayload::Group),
        ));
        drop(self.attributes.insert(
            ROOT.to_owned(),
            NodeAttributes::with_pose(Pose {
                orientation: default_root_orientation(),
                position: Vec3::ZERO,
            }),
        ));
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_node_id += 1;
        NodeId(self.next_node_id)
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Structural generation; changes whenever a node is added, replaced or
    /// removed.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- Node table --

    /// Register a node, synthesizing empty group parents for any missing
    /// ancestors. Re-adding an existing name replaces its payload, keeps
    /// its children, and resets its attributes except the local visibility
    /// override.
    pub fn add_node(&mut self, name: &str, payload: NodePayload) -> NodeId {
        let parent = parent_name(name);
        if name != ROOT && !self.nodes.contains_key(parent) {
            log::debug!("synthesizing placeholder parent {parent:?}");
            let parent = parent.to_owned();
            let _ = self.add_node(&parent, NodePayload::Group);
        }

        if name != ROOT {
            let attrs =
                NodeAttributes::for_new_payload(self.attributes.get(name));
            drop(self.attributes.insert(name.to_owned(), attrs));
        }

        let id = self.allocate_id();
        let mut node = SceneNode::new(id, name.to_owned(), payload);
        if let Some(existing) = self.nodes.remove(name) {
            node.children = existing.children;
        } else if let Some(parent) = self.nodes.get_mut(parent) {
            let _ = parent.children.insert(name.to_owned());
        }
        if let NodePayload::SkinnedMesh(mesh) = node.payload() {
            let bones = mesh
                .bone_wxyzs
                .iter()
                .zip(&mesh.bone_positions)
                .map(|(wxyz, position)| Pose::from_wire(*wxyz, *position))
                .collect();
            drop(self.bones.insert(name.to_owned(), bones));
            self.dirty_bones.push(name.to_owned());
        }
        log::debug!("added {} node {name:?}", node.payload().kind());
        drop(self.nodes.insert(name.to_owned(), node));
        self.invalidate();
        id
    }

    /// Remove a node and all of its descendants, detaching it from its
    /// parent. Attribute state for every removed node is evicted too.
    /// Removing the root clears the scene instead. Returns whether anything
    /// was removed.
    pub fn remove_node(&mut self, name: &str) -> bool {
        if name == ROOT {
            self.reset();
            return true;
        }
        if !self.nodes.contains_key(name) {
            log::debug!("skipping removal of unknown node {name:?}");
            return false;
        }

        let mut stack = vec![name.to_owned()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
            drop(self.attributes.remove(&current));
            drop(self.bones.remove(&current));
        }
        if let Some(parent) = self.nodes.get_mut(parent_name(name)) {
            let _ = parent.children.shift_remove(name);
        }
        self.invalidate();
        true
    }

    /// Clear every node except the root, which keeps its pose.
    pub fn reset(&mut self) {
        let root_attrs = self.attributes.remove(ROOT);
        self.nodes.clear();
        self.attributes.clear();
        self.bones.clear();
        self.dirty_bones.clear();
        self.background = None;
        self.insert_root();
        if let Some(attrs) = root_attrs {
            drop(self.attributes.insert(ROOT.to_owned(), attrs));
        }
        self.invalidate();
    }

    /// Set whether a node reports clicks. Unknown names are ignored.
    pub fn set_clickable(&mut self, name: &str, clickable: bool) {
        match self.nodes.get_mut(name) {
            Some(node) => node.clickable = clickable,
            None => log::debug!("clickable flag for unknown node {name:?}"),
        }
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.get(name)
    }

    /// Whether a node is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Number of registered nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Direct children of a node, in insertion order.
    pub fn children(&self, name: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(name)
            .into_iter()
            .flat_map(|node| node.children.iter().map(String::as_str))
    }

    /// Every node name in depth-first pre-order from the root, paired with
    /// whether all of its strict ancestors are visible.
    #[must_use]
    pub fn walk(&self) -> Vec<(String, bool)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(ROOT, true)];
        while let Some((name, ancestors_visible)) = stack.pop() {
            let Some(node) = self.nodes.get(name) else {
                continue;
            };
            order.push((name.to_owned(), ancestors_visible));
            let visible = ancestors_visible && self.own_visibility(name);
            stack.extend(
                node.children.iter().rev().map(|c| (c.as_str(), visible)),
            );
        }
        order
    }

    // -- Attributes --

    /// Attributes of a node, if it has any.
    #[must_use]
    pub fn attributes(&self, name: &str) -> Option<&NodeAttributes> {
        self.attributes.get(name)
    }

    pub(crate) fn attributes_mut(&mut self, name: &str) -> &mut NodeAttributes {
        self.attributes.entry(name.to_owned()).or_default()
    }

    /// Set a node's orientation relative to its parent.
    pub fn set_orientation(&mut self, name: &str, orientation: Quat) {
        self.attributes_mut(name).set_orientation(orientation);
    }

    /// Set a node's position relative to its parent.
    pub fn set_position(&mut self, name: &str, position: Vec3) {
        self.attributes_mut(name).set_position(position);
    }

    /// Set a node's full pose relative to its parent.
    pub fn set_pose(&mut self, name: &str, pose: Pose) {
        self.attributes_mut(name).set_pose(pose);
    }

    /// Server-set visibility.
    pub fn set_visibility(&mut self, name: &str, visible: bool) {
        self.attributes_mut(name).set_visibility(visible);
    }

    /// Locally forced visibility; `None` hands control back to the server.
    pub fn set_override_visibility(&mut self, name: &str, visible: Option<bool>) {
        self.attributes_mut(name).set_override_visibility(visible);
    }

    fn own_visibility(&self, name: &str) -> bool {
        self.attributes
            .get(name)
            .is_none_or(NodeAttributes::effective_visibility)
    }

    /// Whether a node is actually displayed: its own effective visibility
    /// and that of every strict ancestor up to the root. Unknown nodes are
    /// not displayed.
    #[must_use]
    pub fn is_displayed(&self, name: &str) -> bool {
        if !self.nodes.contains_key(name) {
            return false;
        }
        let mut current = name;
        loop {
            if !self.own_visibility(current) {
                return false;
            }
            if current == ROOT {
                return true;
            }
            current = parent_name(current);
        }
    }

    /// The current wire-to-internal world transform, derived from the root
    /// pose. Recompute rather than cache: the server can move the root.
    #[must_use]
    pub fn world_transform(&self) -> WorldTransform {
        self.attributes
            .get(ROOT)
            .map_or(WorldTransform::IDENTITY, |root| {
                WorldTransform::from_root_pose(root.pose())
            })
    }

    // -- Bones --

    /// Bone poses of a skinned mesh node.
    #[must_use]
    pub fn bones(&self, name: &str) -> Option<&[Pose]> {
        self.bones.get(name).map(Vec::as_slice)
    }

    /// Set one bone's orientation.
    pub fn set_bone_orientation(&mut self, name: &str, bone: usize, orientation: Quat) {
        if let Some(pose) = self.bone_mut(name, bone) {
            pose.orientation = orientation;
        }
    }

    /// Set one bone's position.
    pub fn set_bone_position(&mut self, name: &str, bone: usize, position: Vec3) {
        if let Some(pose) = self.bone_mut(name, bone) {
            pose.position = position;
        }
    }

    fn bone_mut(&mut self, name: &str, bone: usize) -> Option<&mut Pose> {
        let Some(pose) = self.bones.get_mut(name).and_then(|b| b.get_mut(bone))
        else {
            log::warn!("no bone {bone} on node {name:?}");
            return None;
        };
        if !self.dirty_bones.iter().any(|n| n == name) {
            self.dirty_bones.push(name.to_owned());
        }
        Some(pose)
    }

    pub(crate) fn take_dirty_bones(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty_bones)
    }

    // -- Background --

    /// Viewport background image, if set.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundImageMessage> {
        self.background.as_ref()
    }

    /// Replace the viewport background image.
    pub fn set_background(&mut self, background: BackgroundImageMessage) {
        self.background = Some(background);
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
