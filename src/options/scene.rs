use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Child counts below this propagate without delay.
const SMALL_FAN_OUT: usize = 16;
/// Child counts below this use the medium delay.
const MEDIUM_FAN_OUT: usize = 128;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Scene graph propagation tuning.
pub struct SceneOptions {
    /// Child-list propagation delay for 16 to 127 children.
    pub child_delay_medium_ms: u64,
    /// Child-list propagation delay for 128 or more children.
    pub child_delay_large_ms: u64,
}

impl SceneOptions {
    /// Delay applied before a child-list change with `child_count`
    /// entries is propagated to watchers.
    #[must_use]
    pub fn child_list_delay(&self, child_count: usize) -> Duration {
        if child_count < SMALL_FAN_OUT {
            Duration::ZERO
        } else if child_count < MEDIUM_FAN_OUT {
            Duration::from_millis(self.child_delay_medium_ms)
        } else {
            Duration::from_millis(self.child_delay_large_ms)
        }
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            child_delay_medium_ms: 50,
            child_delay_large_ms: 200,
        }
    }
}
