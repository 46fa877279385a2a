use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current instant used for freshness decisions.
///
/// The memoizer only ever compares instants it obtained from the same clock,
/// so any monotonic source works. Production code uses [`SystemClock`];
/// tests inject a [`ManualClock`] and advance it explicitly.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Real time via `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying instant, so a clone handed to a memoizer
/// and one kept by the test advance together.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward by `delta`. The clock never moves backwards.
    pub fn advance(&self, delta: Duration) {
        *self.current.lock().unwrap() += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }
}
