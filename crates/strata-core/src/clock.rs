#![forbid(unsafe_code)]

//! Host time sources.
//!
//! The engine never reads wall time on its own. Hosts pass a monotonic
//! timestamp into every tick, taken from a [`Clock`]:
//!
//! - [`DeterministicClock`]: advanced explicitly by the host or a test.
//! - [`MonotonicClock`]: real elapsed time, backed by `web-time` so it works
//!   on `wasm32-unknown-unknown` as well as native targets.

use core::time::Duration;

/// Monotonic time source measured from an arbitrary origin.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    ///
    /// Moving backwards is ignored; the clock never decreases.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Real monotonic clock anchored at construction time.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: web_time::Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_clock_advances() {
        let mut clock = DeterministicClock::new();
        assert_eq!(clock.now_mono(), Duration::ZERO);
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(150));
        assert_eq!(clock.now_mono(), Duration::from_millis(400));
    }

    #[test]
    fn deterministic_clock_never_goes_backwards() {
        let mut clock = DeterministicClock::new();
        clock.set(Duration::from_secs(2));
        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now_mono(), Duration::from_secs(2));
    }

    #[test]
    fn monotonic_clock_is_non_decreasing() {
        let clock = MonotonicClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
    }
}
