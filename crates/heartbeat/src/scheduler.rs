//! The tick scheduler.
//!
//! The `Scheduler` owns the global tick counter and the set of registered
//! tasks. One call to [`Scheduler::tick`] runs one pass:
//!
//! 1. **ADVANCE**: increment the tick counter
//! 2. **ADMIT**: move tasks submitted since the last pass into the active set;
//!    immediate tasks are primed to fire in this pass
//! 3. **FIRE**: walk the active set in registration order, counting down and
//!    invoking each task whose interval has elapsed
//! 4. **IMMEDIATE**: run immediate tasks submitted by callbacks during this pass
//!
//! Cancelled and completed one-shot tasks are dropped during the pass that
//! observes them.
//!
//! # Example
//!
//! ```
//! use heartbeat::{Cadence, Scheduler, Submit, Task, TaskContext, TaskError};
//!
//! struct Ping;
//!
//! impl Task<Vec<u64>> for Ping {
//!     fn cadence(&self) -> Cadence {
//!         Cadence::once(2)
//!     }
//!
//!     fn run(&mut self, cx: &mut TaskContext<'_, Vec<u64>>) -> Result<(), TaskError> {
//!         let tick = cx.tick();
//!         cx.state.push(tick);
//!         Ok(())
//!     }
//! }
//!
//! let mut log = Vec::new();
//! let mut scheduler = Scheduler::new();
//! scheduler.submit(Ping);
//!
//! scheduler.tick(&mut log);
//! scheduler.tick(&mut log);
//! scheduler.tick(&mut log);
//!
//! assert_eq!(log, vec![2]);
//! assert_eq!(scheduler.current_tick(), 3);
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::TaskError;
use crate::task::{Entry, Spawner, Submit, Task, TaskContext, TaskHandle};

/// Upper bound on chained immediate submissions within a single tick.
const MAX_IMMEDIATE_ROUNDS: usize = 64;

/// Counters describing one scheduler pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick that was processed.
    pub tick: u64,
    /// Callbacks invoked (including failed ones).
    pub fired: usize,
    /// Callbacks that returned an error or panicked.
    pub failed: usize,
    /// Tasks removed from the active set.
    pub retired: usize,
}

/// Cooperative, single-threaded task scheduler.
///
/// `C` is the shared state handed to every callback. The scheduler never
/// holds on to it between ticks.
pub struct Scheduler<C> {
    tick: u64,
    active: Vec<Entry<C>>,
    spawner: Spawner<C>,
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick", &self.tick)
            .field("active", &self.active.len())
            .field("spawner", &self.spawner)
            .finish()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    /// Creates an empty scheduler at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick: 0,
            active: Vec::new(),
            spawner: Spawner::new(),
        }
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Registered tasks, active or awaiting admission.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.spawner.len()
    }

    /// Returns `true` when no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks currently counting down.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Tasks submitted but not yet admitted.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.spawner.len()
    }

    /// Returns `true` if the task is still registered and not cancelled.
    #[must_use]
    pub fn is_scheduled(&self, handle: &TaskHandle) -> bool {
        if handle.is_cancelled() {
            return false;
        }
        let id = handle.id();
        self.spawner.contains(id) || self.active.iter().any(|e| e.handle.id() == id)
    }

    /// Submitter usable while the scheduler is borrowed elsewhere.
    pub fn spawner_mut(&mut self) -> &mut Spawner<C> {
        &mut self.spawner
    }

    /// Advances the clock by one tick and fires every task that is due.
    ///
    /// Failures inside callbacks are contained and logged; this method never
    /// fails.
    pub fn tick(&mut self, state: &mut C) -> TickSummary {
        self.tick += 1;
        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };

        // ADMIT
        for mut entry in self.spawner.drain() {
            if entry.cadence.is_immediate() {
                entry.elapsed = entry.cadence.interval().saturating_sub(1);
            }
            self.active.push(entry);
        }

        // FIRE
        let now = self.tick;
        let spawner = &mut self.spawner;
        let before = self.active.len();
        self.active
            .retain_mut(|entry| Self::process(entry, state, spawner, now, &mut summary));
        summary.retired += before - self.active.len();

        // IMMEDIATE
        let mut rounds = 0;
        loop {
            let batch = self.spawner.drain_immediate();
            if batch.is_empty() {
                break;
            }
            rounds += 1;
            if rounds > MAX_IMMEDIATE_ROUNDS {
                tracing::warn!(
                    tick = now,
                    deferred = batch.len(),
                    "immediate submission chain too deep, deferring to next tick"
                );
                for entry in batch {
                    self.active.push(entry);
                }
                break;
            }
            for mut entry in batch {
                if entry.handle.is_cancelled() {
                    summary.retired += 1;
                    continue;
                }
                if Self::fire(&mut entry, state, &mut self.spawner, now, &mut summary) {
                    self.active.push(entry);
                } else {
                    summary.retired += 1;
                }
            }
        }

        tracing::trace!(
            tick = summary.tick,
            fired = summary.fired,
            failed = summary.failed,
            retired = summary.retired,
            active = self.active.len(),
            "scheduler pass complete"
        );
        summary
    }

    /// Counts one tick down for `entry`; returns whether it stays registered.
    fn process(
        entry: &mut Entry<C>,
        state: &mut C,
        spawner: &mut Spawner<C>,
        now: u64,
        summary: &mut TickSummary,
    ) -> bool {
        // Checked here, not cached: an earlier callback this tick may have
        // cancelled this entry.
        if entry.handle.is_cancelled() {
            return false;
        }
        entry.elapsed += 1;
        if entry.elapsed < entry.cadence.interval() {
            return true;
        }
        Self::fire(entry, state, spawner, now, summary)
    }

    /// Invokes the callback; returns whether the entry stays registered.
    fn fire(
        entry: &mut Entry<C>,
        state: &mut C,
        spawner: &mut Spawner<C>,
        now: u64,
        summary: &mut TickSummary,
    ) -> bool {
        entry.elapsed = 0;
        summary.fired += 1;

        let handle = entry.handle.clone();
        let name = entry.task.name();
        let task = &mut entry.task;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut cx = TaskContext::new(state, now, &handle, spawner);
            task.run(&mut cx)
        }))
        .unwrap_or_else(|payload| Err(TaskError::from_panic(payload.as_ref())));

        if let Err(error) = outcome {
            summary.failed += 1;
            tracing::error!(tick = now, task = name, id = %handle.id(), %error, "task callback failed");
            handle.cancel();
        }

        entry.cadence.repeats() && !handle.is_cancelled()
    }
}

impl<C> Submit<C> for Scheduler<C> {
    fn submit_boxed(&mut self, task: Box<dyn Task<C>>) -> TaskHandle {
        self.spawner.submit_boxed(task)
    }
}

// =============================================================================
// Tests
// =============================================================================
