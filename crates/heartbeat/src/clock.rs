//! Fixed-rate wall-clock driver for the tick counter.
//!
//! The game's heartbeat is a fixed interval (conventionally 600 ms). A
//! `TickLoop` calls a step closure once per period until asked to stop.
//! When a step overruns its period the overrun is logged and the next step
//! starts immediately; missed periods are not replayed in a burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Conventional tick period.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(600);

/// Fixed-period loop driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLoop {
    period: Duration,
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl TickLoop {
    /// Creates a loop with the given period.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Creates a loop with a period in milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// The configured period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Calls `step` once per period until `stop` is set.
    ///
    /// `stop` is checked before every step, so a step that raises it ends the
    /// loop without a trailing sleep. Returns the number of steps run.
    pub fn run<F>(&self, stop: &AtomicBool, mut step: F) -> u64
    where
        F: FnMut(),
    {
        let mut steps = 0;
        while !stop.load(Ordering::Acquire) {
            let started = Instant::now();
            step();
            steps += 1;

            if stop.load(Ordering::Acquire) {
                break;
            }

            let spent = started.elapsed();
            match self.period.checked_sub(spent) {
                Some(remaining) => thread::sleep(remaining),
                None => {
                    tracing::warn!(
                        step = steps,
                        spent_ms = u64::try_from(spent.as_millis()).unwrap_or(u64::MAX),
                        period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
                        "tick overran its period"
                    );
                }
            }
        }
        steps
    }
}
