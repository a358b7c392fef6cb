//! Cross-thread command submission.
//!
//! Protocol and I/O threads never touch entities directly. They push
//! [`Command`]s through a [`CommandSender`]; the engine drains the queue at
//! the start of every tick on the scheduling thread.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Position, Protection};
use crate::error::EngineStopped;

/// A state change requested from outside the scheduling thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start or retarget a fight.
    StartSession {
        /// Session owner.
        attacker: EntityId,
        /// Entity to fight.
        target: EntityId,
    },
    /// Clear a fight.
    ResetSession {
        /// Session owner.
        entity: EntityId,
    },
    /// Clear a fight, facing and follow target.
    Disengage {
        /// Session owner.
        entity: EntityId,
    },
    /// Let a fight wind down through the forced-inactive cooldown.
    BeginCooldown {
        /// Session owner.
        entity: EntityId,
        /// Also restart the attack timer.
        reset_attack: bool,
    },
    /// Movement placed the entity on a new tile.
    SetPosition {
        /// Moved entity.
        entity: EntityId,
        /// New tile.
        position: Position,
    },
    /// A teleport started or finished.
    SetTeleporting {
        /// Teleporting entity.
        entity: EntityId,
        /// Teleport in progress.
        teleporting: bool,
    },
    /// Run mode toggled.
    SetRunning {
        /// Entity whose movement mode changed.
        entity: EntityId,
        /// Running rather than walking.
        running: bool,
    },
    /// Auto-retaliate toggled.
    SetAutoRetaliate {
        /// Entity whose setting changed.
        entity: EntityId,
        /// Fight back automatically.
        enabled: bool,
    },
    /// Protection prayers changed.
    SetProtection {
        /// Praying entity.
        entity: EntityId,
        /// Active prayers.
        protection: Protection,
    },
    /// The entity is leaving the world.
    Unregister {
        /// Leaving entity.
        entity: EntityId,
    },
    /// Remove the entity from the registry.
    Despawn {
        /// Removed entity.
        entity: EntityId,
    },
}

impl Command {
    /// The entity the command is about.
    #[must_use]
    pub const fn subject(&self) -> EntityId {
        match self {
            Self::StartSession { attacker, .. } => *attacker,
            Self::ResetSession { entity }
            | Self::Disengage { entity }
            | Self::BeginCooldown { entity, .. }
            | Self::SetPosition { entity, .. }
            | Self::SetTeleporting { entity, .. }
            | Self::SetRunning { entity, .. }
            | Self::SetAutoRetaliate { entity, .. }
            | Self::SetProtection { entity, .. }
            | Self::Unregister { entity }
            | Self::Despawn { entity } => *entity,
        }
    }
}

/// Cloneable, `Send` handle for submitting commands.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Queues `command` for the next tick.
    ///
    /// # Errors
    ///
    /// [`EngineStopped`] carrying the command back when the engine is gone.
    pub fn send(&self, command: Command) -> Result<(), EngineStopped> {
        self.tx.send(command).map_err(|err| EngineStopped(err.0))
    }
}

/// Receiving end, owned by the engine.
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new sender for this queue.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Takes every command queued so far, in submission order.
    #[must_use]
    pub fn drain(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}
