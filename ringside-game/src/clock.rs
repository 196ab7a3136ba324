//! Monotonic millisecond time sources.
use std::cell::Cell;
use std::time::Instant;

/// Millisecond timestamp used for every deadline in the simulation.
pub type Millis = u64;

/// Abstract monotonic clock. Implementations must never go backwards.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock source anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    #[must_use]
    pub const fn starting_at(now: Millis) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Move the clock forward by `delta` milliseconds.
    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    /// Jump to `now`. Earlier values are ignored to keep the clock monotonic.
    pub fn set(&self, now: Millis) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
