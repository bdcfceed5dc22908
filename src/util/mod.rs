//! Outbound rate limiting and tick pacing.

pub mod throttle;
pub mod tick_timing;

pub use throttle::{KeyedThrottle, Throttle};
pub use tick_timing::TickTiming;
