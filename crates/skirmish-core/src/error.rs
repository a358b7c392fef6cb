//! Error types for the combat core.
//!
//! Precondition refusals (out of range, strategy declined) are not errors;
//! the hook simply waits. The types here cover requests that cannot be
//! honoured and invariant violations, which cancel the offending task.

use heartbeat::TaskError;
use thiserror::Error;

use crate::command::Command;
use crate::entity::EntityId;

// =============================================================================
// Combat errors
// =============================================================================

/// Errors raised by session management and hit resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// No entity with this id is registered.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// An entity tried to attack itself.
    #[error("entity {0} cannot target itself")]
    SelfTarget(EntityId),

    /// A combat hook ran for a session without a target.
    #[error("combat session of entity {0} has no target")]
    NoTarget(EntityId),

    /// A hit outcome must carry one to four sub-hits.
    #[error("hit outcome needs 1 to 4 sub-hits, got {0}")]
    InvalidHitCount(usize),
}

impl From<CombatError> for TaskError {
    fn from(error: CombatError) -> Self {
        TaskError::failed(error)
    }
}

// =============================================================================
// Configuration errors
// =============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Command errors
// =============================================================================

/// The engine's command queue is gone; the rejected command is returned.
#[derive(Debug, Error)]
#[error("engine stopped, command for entity {} dropped", .0.subject())]
pub struct EngineStopped(pub Command);
