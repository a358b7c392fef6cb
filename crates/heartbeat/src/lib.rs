//! # Heartbeat
//!
//! Tick clock and cooperative task scheduler for server-side game simulation.
//!
//! All time-delayed game logic is expressed as [`Task`]s registered with a
//! [`Scheduler`]. Each call to [`Scheduler::tick`] advances the global tick
//! counter by one and fires every task whose interval has elapsed, in
//! registration order, on the caller's thread.
//!
//! ## Guarantees
//!
//! - A task whose [`TaskHandle`] has been cancelled is never invoked again.
//!   The flag is checked immediately before every invocation, so a callback
//!   cancelling another task in the same tick takes effect at once.
//! - A failing or panicking callback is contained: it is logged, that task is
//!   cancelled, and the remaining tasks of the tick still fire.
//! - Tasks submitted while a tick is running are admitted on the next tick,
//!   unless their [`Cadence`] is immediate.
//!
//! ## Quick Start
//!
//! ```
//! use heartbeat::{Cadence, Scheduler, Submit, Task, TaskContext, TaskError};
//!
//! struct Countdown;
//!
//! impl Task<u32> for Countdown {
//!     fn cadence(&self) -> Cadence {
//!         Cadence::every(2)
//!     }
//!
//!     fn run(&mut self, cx: &mut TaskContext<'_, u32>) -> Result<(), TaskError> {
//!         *cx.state += 1;
//!         if *cx.state == 3 {
//!             cx.cancel();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut fired = 0;
//! let mut scheduler = Scheduler::new();
//! scheduler.submit(Countdown);
//!
//! for _ in 0..10 {
//!     scheduler.tick(&mut fired);
//! }
//!
//! assert_eq!(fired, 3);
//! assert!(scheduler.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod task;

// Re-exports for convenience
pub use clock::TickLoop;
pub use error::TaskError;
pub use scheduler::{Scheduler, TickSummary};
pub use task::{Cadence, Spawner, Submit, Task, TaskContext, TaskHandle, TaskId};
