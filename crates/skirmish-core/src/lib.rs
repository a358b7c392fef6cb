//! # Skirmish Core
//!
//! Tick-driven combat resolution for a persistent multiplayer world.
//!
//! Players and NPCs fight through combat sessions. Each active session is
//! driven by a repeating [`CombatHookTask`](combat::CombatHookTask) on a
//! [`heartbeat::Scheduler`]; resolved attacks travel as delayed
//! [`HitApplicationTask`](combat::HitApplicationTask)s that land on their
//! target a few ticks later.
//!
//! ## Architecture
//!
//! - **Entities**: players and NPCs in a [`World`] registry, referenced by id
//! - **Sessions**: per-entity fight state plus the hook that evaluates it
//! - **Strategies**: melee, ranged and magic as a closed enum
//! - **Engine**: scheduler, world and a cross-thread command queue
//!
//! ## Determinism
//!
//! Entities iterate in id order, tasks fire in registration order and every
//! roll comes from the world's seeded `ChaCha8Rng`. The same seed and the
//! same commands give the same combat journal.
//!
//! ## Quick Start
//!
//! ```
//! use skirmish_core::{Engine, NpcProfile, Position};
//!
//! let mut engine = Engine::default();
//! let hero = engine.spawn_player("Hero", Position::new(3200, 3200, 0));
//! let cow = engine.spawn_npc(NpcProfile::new("Cow", Position::new(3201, 3200, 0)));
//!
//! engine.start_session(hero, cow).unwrap();
//! for _ in 0..10 {
//!     engine.tick();
//! }
//!
//! assert!(!engine.take_events().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod combat;
pub mod command;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod notify;
pub mod world;
pub mod zone;

// Re-exports for convenience
pub use combat::{CombatSession, CombatStyle, Hit, HitOutcome, Strategy};
pub use command::{Command, CommandSender};
pub use config::{CombatConfig, EngineConfig};
pub use engine::{Engine, TickFrame};
pub use entity::{Entity, EntityId, EntityKind, NpcProfile, PlayerProfile, Position, Profile};
pub use error::{CombatError, ConfigError, EngineStopped};
pub use event::{CombatEvent, ResetReason};
pub use notify::{Notice, Notifier};
pub use world::World;
pub use zone::{Zone, ZoneKind, ZoneMap};

#[cfg(test)]
mod tests;
