//! Injectable time source for rest-window timing and history timestamps.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic time source measured in whole seconds.
///
/// The controller never calls the operating system clock directly; it reads
/// time through this trait so rest-duration and elapsed-time logic can be
/// driven deterministically in tests and simulations.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Seconds since the clock's epoch.
    fn now_secs(&self) -> u64;
}

/// Wall-clock time for live operation, counted from the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock for simulations and tests.
///
/// Interior mutability lets the simulator advance time through a shared
/// handle while the controller holds its own reference to the same instance.
///
/// # Examples
///
/// ```
/// use ess_sim::clock::{Clock, SimulatedClock};
///
/// let clock = SimulatedClock::new();
/// clock.advance(600);
/// assert_eq!(clock.now_secs(), 600);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedClock {
    secs: AtomicU64,
}

impl SimulatedClock {
    /// Creates a clock at second zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock already advanced to `secs`.
    pub fn at(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    /// Moves the clock forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for SimulatedClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::Relaxed)
    }
}
