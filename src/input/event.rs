use glam::Vec2;

use crate::coords::Ray;

/// Platform-agnostic pointer events, as reported by the renderer's hit test
/// against one scene node.
///
/// Positions are in device pixels relative to the top-left corner of the
/// drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed over the node.
    Down {
        /// Cursor position.
        position: Vec2,
    },
    /// Cursor moved over the node.
    Move {
        /// Cursor position.
        position: Vec2,
    },
    /// Primary button released over the node.
    Up {
        /// Cursor position.
        position: Vec2,
        /// Pick ray through the cursor, in internal coordinates.
        ray: Ray,
        /// Low-level instance id for instanced payloads.
        instance_id: Option<u32>,
    },
    /// Cursor entered the node.
    Over,
    /// Cursor left the node.
    Out,
}
