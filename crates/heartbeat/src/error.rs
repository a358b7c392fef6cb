//! Task failure types.

use std::error::Error as StdError;

use thiserror::Error;

/// Error raised by a task callback.
///
/// The scheduler never propagates a `TaskError` to the caller of
/// [`Scheduler::tick`](crate::Scheduler::tick). It is logged and the failing
/// task is cancelled.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The callback reported a domain failure.
    #[error("task failed: {0}")]
    Failed(#[source] Box<dyn StdError + Send + Sync>),

    /// The callback panicked; the payload message is preserved when it was a string.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Wraps any error type as a task failure.
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Failed(error.into())
    }

    /// Builds a [`TaskError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}
