//! Task abstraction: one recurring or one-shot unit of delayed logic.
//!
//! A [`Task`] exposes its firing [`Cadence`] and a single callback,
//! [`Task::run`]. Identity and cancellation live in the shared
//! [`TaskHandle`] returned at submission, so collaborators can cancel a task
//! they do not own.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::TaskError;

// =============================================================================
// Identity & cancellation
// =============================================================================

/// Opaque, scheduler-unique task identifier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Returns the raw identifier value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a scheduled task.
///
/// Cloning the handle shares the same cancellation flag. Cancellation is
/// one-way: once set it is never cleared, and the scheduler will not invoke
/// the task again.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    fn new(id: TaskId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Marks the task as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskHandle {}

// =============================================================================
// Cadence
// =============================================================================

/// How often a task fires.
///
/// `interval` is the number of ticks between firings and is always at least
/// one. A non-repeating task is retired after its first firing. An immediate
/// task fires once in the pass that admits it, then counts its interval from
/// there.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cadence {
    interval: u32,
    repeat: bool,
    immediate: bool,
}

impl Cadence {
    /// Fires every `interval` ticks until cancelled.
    #[must_use]
    pub const fn every(interval: u32) -> Self {
        Self {
            interval: clamp_interval(interval),
            repeat: true,
            immediate: false,
        }
    }

    /// Fires once, `delay` ticks after admission.
    #[must_use]
    pub const fn once(delay: u32) -> Self {
        Self {
            interval: clamp_interval(delay),
            repeat: false,
            immediate: false,
        }
    }

    /// Also fires in the same pass the task is admitted.
    #[must_use]
    pub const fn immediately(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Ticks between firings (`>= 1`).
    #[must_use]
    pub const fn interval(self) -> u32 {
        self.interval
    }

    /// Whether the task keeps firing after the first time.
    #[must_use]
    pub const fn repeats(self) -> bool {
        self.repeat
    }

    /// Whether the task fires as soon as it is admitted.
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        self.immediate
    }
}

const fn clamp_interval(interval: u32) -> u32 {
    if interval == 0 {
        1
    } else {
        interval
    }
}

// =============================================================================
// Task
// =============================================================================

/// A unit of delayed logic operating on shared state `C`.
///
/// # Example
///
/// ```
/// use heartbeat::{Cadence, Task, TaskContext, TaskError};
///
/// struct Regenerate {
///     amount: u32,
/// }
///
/// impl Task<u32> for Regenerate {
///     fn cadence(&self) -> Cadence {
///         Cadence::every(10)
///     }
///
///     fn run(&mut self, cx: &mut TaskContext<'_, u32>) -> Result<(), TaskError> {
///         *cx.state = cx.state.saturating_add(self.amount);
///         Ok(())
///     }
/// }
/// ```
pub trait Task<C> {
    /// Name used in log records.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Firing schedule, queried once at submission.
    fn cadence(&self) -> Cadence;

    /// Callback invoked each time the interval elapses.
    ///
    /// # Errors
    ///
    /// Any error is logged by the scheduler and cancels this task. It never
    /// reaches the caller of [`Scheduler::tick`](crate::Scheduler::tick).
    fn run(&mut self, cx: &mut TaskContext<'_, C>) -> Result<(), TaskError>;
}

// =============================================================================
// Submission
// =============================================================================

/// Something tasks can be submitted to.
///
/// Implemented by [`Scheduler`](crate::Scheduler) for submissions made
/// between ticks and by [`Spawner`] for submissions made from inside a
/// running callback.
pub trait Submit<C> {
    /// Registers a boxed task and returns its handle.
    fn submit_boxed(&mut self, task: Box<dyn Task<C>>) -> TaskHandle;

    /// Registers a task and returns its handle.
    fn submit<T>(&mut self, task: T) -> TaskHandle
    where
        T: Task<C> + 'static,
        Self: Sized,
    {
        self.submit_boxed(Box::new(task))
    }
}

/// A task waiting in the scheduler, together with its countdown state.
pub(crate) struct Entry<C> {
    pub(crate) handle: TaskHandle,
    pub(crate) task: Box<dyn Task<C>>,
    pub(crate) cadence: Cadence,
    pub(crate) elapsed: u32,
}

/// Queue of tasks submitted but not yet admitted by the scheduler.
pub struct Spawner<C> {
    next_id: u64,
    queue: Vec<Entry<C>>,
}

impl<C> Spawner<C> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            queue: Vec::new(),
        }
    }

    /// Number of tasks waiting for admission.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` when nothing is waiting for admission.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<Entry<C>> {
        std::mem::take(&mut self.queue)
    }

    /// Removes and returns the waiting tasks flagged as immediate.
    pub(crate) fn drain_immediate(&mut self) -> Vec<Entry<C>> {
        let (now, later): (Vec<_>, Vec<_>) = self
            .drain()
            .into_iter()
            .partition(|entry| entry.cadence.is_immediate());
        self.queue = later;
        now
    }

    pub(crate) fn contains(&self, id: TaskId) -> bool {
        self.queue.iter().any(|entry| entry.handle.id() == id)
    }
}

impl<C> Submit<C> for Spawner<C> {
    fn submit_boxed(&mut self, task: Box<dyn Task<C>>) -> TaskHandle {
        let handle = TaskHandle::new(TaskId(self.next_id));
        self.next_id += 1;
        let cadence = task.cadence();
        tracing::trace!(task = task.name(), id = %handle.id(), ?cadence, "task submitted");
        self.queue.push(Entry {
            handle: handle.clone(),
            task,
            cadence,
            elapsed: 0,
        });
        handle
    }
}

impl<C> fmt::Debug for Spawner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("next_id", &self.next_id)
            .field("queued", &self.queue.len())
            .finish()
    }
}

// =============================================================================
// Task Context
// =============================================================================

/// Everything a callback can reach while it runs.
///
/// `state` is the shared simulation state. Follow-up tasks go through
/// [`submit`](Self::submit) (or [`parts`](Self::parts) when the state and the
/// spawner are needed together) and are admitted on the next tick unless
/// immediate.
pub struct TaskContext<'a, C> {
    /// Shared simulation state.
    pub state: &'a mut C,
    tick: u64,
    handle: &'a TaskHandle,
    spawner: &'a mut Spawner<C>,
}

impl<'a, C> TaskContext<'a, C> {
    pub(crate) fn new(
        state: &'a mut C,
        tick: u64,
        handle: &'a TaskHandle,
        spawner: &'a mut Spawner<C>,
    ) -> Self {
        Self {
            state,
            tick,
            handle,
            spawner,
        }
    }

    /// The tick currently being processed.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Handle of the running task.
    #[must_use]
    pub fn handle(&self) -> &TaskHandle {
        self.handle
    }

    /// Cancels the running task. It is retired once this callback returns.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Submits a follow-up task.
    pub fn submit<T>(&mut self, task: T) -> TaskHandle
    where
        T: Task<C> + 'static,
    {
        self.spawner.submit(task)
    }

    /// Splits the context into the shared state and the spawner.
    pub fn parts(&mut self) -> (&mut C, &mut Spawner<C>) {
        (&mut *self.state, &mut *self.spawner)
    }
}
