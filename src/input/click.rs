use glam::Vec2;

/// Press/release tracking that tells a click apart from a drag.
///
/// Any intermediate move, or a net release offset, beyond the threshold on
/// either axis turns the gesture into a drag. A drag that returns to its
/// start still counts as a drag.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    down_at: Option<Vec2>,
    dragged: bool,
}

impl ClickTracker {
    /// Start a gesture.
    pub fn down(&mut self, position: Vec2) {
        self.down_at = Some(position);
        self.dragged = false;
    }

    /// Pointer moved while the gesture may be active.
    pub fn moved(&mut self, position: Vec2, threshold: f32) {
        if let Some(start) = self.down_at {
            if exceeds(position - start, threshold) {
                self.dragged = true;
            }
        }
    }

    /// End the gesture. Returns whether it was a click.
    pub fn up(&mut self, position: Vec2, threshold: f32) -> bool {
        let dragged = std::mem::take(&mut self.dragged);
        self.down_at
            .take()
            .is_some_and(|start| !dragged && !exceeds(position - start, threshold))
    }

    /// Whether a press is being tracked.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.down_at.is_some()
    }
}

fn exceeds(delta: Vec2, threshold: f32) -> bool {
    delta.x.abs() > threshold || delta.y.abs() > threshold
}
