//! Time source consumed by the overlay.

use std::cell::Cell;

/// Monotonic millisecond clock. Adapters wrap `performance.now()` or similar.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> f64 {
        (**self).now_millis()
    }
}

/// Clock advanced by hand, for replaying recorded frame pacing.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_through_shared_refs() {
        let clock = ManualClock::new(5.0);
        let by_ref: &dyn Clock = &clock;
        clock.advance(16.0);
        assert_eq!(by_ref.now_millis(), 21.0);
        clock.set(1.0);

        fn read(c: impl Clock) -> f64 {
            c.now_millis()
        }
        assert_eq!(read(&clock), 1.0);
    }
}
