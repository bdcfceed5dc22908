use serde::{Deserialize, Serialize};
use web_time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Pointer gesture thresholds and outbound message rate limits.
pub struct InteractionOptions {
    /// Maximum per-axis pointer travel (device pixels) still counted as a
    /// click rather than a drag.
    pub click_drag_threshold_px: f32,
    /// Minimum spacing between camera telemetry messages.
    pub camera_send_interval_ms: u64,
    /// Minimum spacing between node click messages.
    pub click_send_interval_ms: u64,
    /// Minimum spacing between GUI value updates for one component.
    pub gui_send_interval_ms: u64,
    /// Minimum spacing between transform-control drag updates.
    pub transform_send_interval_ms: u64,
}

impl InteractionOptions {
    /// Camera telemetry interval as a [`Duration`].
    #[must_use]
    pub fn camera_send_interval(&self) -> Duration {
        Duration::from_millis(self.camera_send_interval_ms)
    }

    /// Click interval as a [`Duration`].
    #[must_use]
    pub fn click_send_interval(&self) -> Duration {
        Duration::from_millis(self.click_send_interval_ms)
    }

    /// GUI update interval as a [`Duration`].
    #[must_use]
    pub fn gui_send_interval(&self) -> Duration {
        Duration::from_millis(self.gui_send_interval_ms)
    }

    /// Transform-control update interval as a [`Duration`].
    #[must_use]
    pub fn transform_send_interval(&self) -> Duration {
        Duration::from_millis(self.transform_send_interval_ms)
    }
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            click_drag_threshold_px: 3.0,
            camera_send_interval_ms: 20,
            click_send_interval_ms: 50,
            gui_send_interval_ms: 50,
            transform_send_interval_ms: 50,
        }
    }
}
