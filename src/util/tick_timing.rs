//! Fixed-rate tick pacing.

use web_time::{Duration, Instant};

/// Fixed-rate tick pacing with a smoothed rate readout.
pub struct TickTiming {
    /// Target ticks per second (0 = unpaced)
    target_hz: u32,
    /// Minimum spacing between ticks
    min_tick: Duration,
    /// Start of the last completed tick
    last_tick: Instant,
    /// Exponential moving average of the achieved rate
    smoothed_hz: f32,
    /// Weight of the newest sample (0.0-1.0)
    smoothing: f32,
}

impl TickTiming {
    /// Pace ticks at `target_hz` (0 = as fast as possible).
    #[must_use]
    pub fn new(target_hz: u32) -> Self {
        let min_tick = if target_hz > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_hz))
        } else {
            Duration::ZERO
        };

        Self {
            target_hz,
            min_tick,
            last_tick: Instant::now(),
            smoothed_hz: target_hz.max(1) as f32,
            smoothing: 0.05,
        }
    }

    /// How long to wait before the next tick is due.
    #[must_use]
    pub fn until_next(&self) -> Duration {
        if self.target_hz == 0 {
            return Duration::ZERO;
        }
        self.min_tick.saturating_sub(self.last_tick.elapsed())
    }

    /// Record the end of a tick.
    pub fn end_tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        let secs = elapsed.as_secs_f32();
        if secs > 0.0 {
            self.smoothed_hz =
                self.smoothed_hz * (1.0 - self.smoothing) + self.smoothing / secs;
        }
    }

    /// Achieved tick rate (smoothed).
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.smoothed_hz
    }
}
