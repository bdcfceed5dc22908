use serde::{Deserialize, Serialize};
use web_time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Connection and decode-ordering timing for the transport worker.
pub struct TransportOptions {
    /// How long a connection attempt may take before it is abandoned.
    pub connect_timeout_ms: u64,
    /// Fixed delay between a close and the next connection attempt.
    pub reconnect_delay_ms: u64,
    /// Bounded wait on the batch ordering lock before it is forced.
    pub order_lock_timeout_ms: u64,
}

impl TransportOptions {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Reconnect delay as a [`Duration`].
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Ordering lock wait as a [`Duration`].
    #[must_use]
    pub fn order_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.order_lock_timeout_ms)
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            reconnect_delay_ms: 1000,
            order_lock_timeout_ms: 1000,
        }
    }
}
