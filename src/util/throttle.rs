//! Latest-value rate limiting for outbound messages.
//!
//! A throttle sends the first value immediately, then holds back values
//! offered within the interval. Only the newest held value survives, and
//! it goes out as soon as the interval has elapsed, so the final state of
//! a burst (the end of a drag, the last slider position) always reaches
//! the server.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

/// Rate limiter for one outbound stream.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_sent: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    /// At most one value per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
            pending: None,
        }
    }

    fn is_open(&self, now: Instant) -> bool {
        self.last_sent
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Offer a value. Returns it if it may be sent now; otherwise it
    /// replaces any held value.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.is_open(now) {
            self.pending = None;
            self.last_sent = Some(now);
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the held value once the interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last_sent = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Send `value` right away, dropping any held value and restarting
    /// the interval.
    pub fn force(&mut self, value: T, now: Instant) -> T {
        self.pending = None;
        self.last_sent = Some(now);
        value
    }

    /// Whether a value is being held back.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any held value and forget the last send.
    pub fn clear(&mut self) {
        self.pending = None;
        self.last_sent = None;
    }
}

/// One [`Throttle`] per key: GUI components, transform gizmos.
#[derive(Debug, Clone)]
pub struct KeyedThrottle<K, T> {
    interval: Duration,
    slots: FxHashMap<K, Throttle<T>>,
}

impl<K: Eq + Hash, T> KeyedThrottle<K, T> {
    /// At most one value per key per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slots: FxHashMap::default(),
        }
    }

    /// [`Throttle::offer`] for `key`.
    pub fn offer(&mut self, key: K, value: T, now: Instant) -> Option<T> {
        let interval = self.interval;
        self.slots
            .entry(key)
            .or_insert_with(|| Throttle::new(interval))
            .offer(value, now)
    }

    /// Every held value whose interval has elapsed. Idle slots are
    /// dropped.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        let released: Vec<T> = self
            .slots
            .values_mut()
            .filter_map(|slot| slot.poll(now))
            .collect();
        self.slots
            .retain(|_, slot| slot.has_pending() || !slot.is_open(now));
        released
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(50);

    #[test]
    fn first_value_goes_out_immediately() {
        let now = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.offer(1, now), Some(1));
    }

    #[test]
    fn burst_collapses_to_its_last_value() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.offer(1, start), Some(1));
        for (i, value) in (2..6).enumerate() {
            let at = start + Duration::from_millis(5 * (i as u64 + 1));
            assert_eq!(throttle.offer(value, at), None);
        }
        assert_eq!(throttle.poll(start + Duration::from_millis(30)), None);
        assert_eq!(throttle.poll(start + INTERVAL), Some(5));
        assert_eq!(throttle.poll(start + 3 * INTERVAL), None);
    }

    #[test]
    fn force_bypasses_and_discards_pending() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        let _ = throttle.offer(1, start);
        let _ = throttle.offer(2, start + Duration::from_millis(1));
        assert_eq!(throttle.force(3, start + Duration::from_millis(2)), 3);
        assert!(!throttle.has_pending());
        assert_eq!(throttle.offer(4, start + Duration::from_millis(3)), None);
    }

    #[test]
    fn keys_are_limited_independently() {
        let now = Instant::now();
        let mut throttle = KeyedThrottle::new(INTERVAL);
        assert_eq!(throttle.offer("a", 1, now), Some(1));
        assert_eq!(throttle.offer("b", 2, now), Some(2));
        assert_eq!(throttle.offer("a", 3, now), None);
        assert_eq!(throttle.poll(now + INTERVAL), vec![3]);
    }
}
