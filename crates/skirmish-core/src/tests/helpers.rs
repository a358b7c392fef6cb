//! Test helpers for spawning combatants and querying the combat journal.

use crate::combat::{Melee, Strategy};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::entity::{EntityFlags, EntityId, Hitpoints, NpcProfile, PlayerProfile, Position, Profile};
use crate::event::{CombatEvent, ResetReason};

// =============================================================================
// Engine setup
// =============================================================================

/// An engine with default configuration and the given seed.
pub fn seeded_engine(seed: u64) -> Engine {
    let config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    Engine::from_config(&config).unwrap()
}

/// Spawns a player at `(x, y)` with a deep health pool.
pub fn spawn_player(engine: &mut Engine, x: i32, y: i32) -> EntityId {
    engine.world_mut().spawn_with(
        Profile::Player(PlayerProfile {
            name: format!("player-{x}-{y}"),
        }),
        Position::new(x, y, 0),
        |e| e.with_hitpoints(Hitpoints::full(500)),
    )
}

/// Spawns a player that does not fight back.
pub fn spawn_passive_player(engine: &mut Engine, x: i32, y: i32) -> EntityId {
    engine.world_mut().spawn_with(
        Profile::Player(PlayerProfile::default()),
        Position::new(x, y, 0),
        |e| {
            e.with_hitpoints(Hitpoints::full(500))
                .with_flags(EntityFlags::empty())
        },
    )
}

/// Spawns an NPC anchored at `(x, y)` with a deep health pool.
pub fn spawn_npc(engine: &mut Engine, x: i32, y: i32) -> EntityId {
    spawn_npc_with(engine, NpcProfile::new("Guard", Position::new(x, y, 0)), Strategy::default())
}

/// Spawns an NPC from `profile` at its origin, fighting with `loadout`.
pub fn spawn_npc_with(engine: &mut Engine, profile: NpcProfile, loadout: Strategy) -> EntityId {
    let origin = profile.origin;
    engine
        .world_mut()
        .spawn_with(Profile::Npc(profile), origin, |e| {
            e.with_hitpoints(Hitpoints::full(500)).with_loadout(loadout)
        })
}

/// A melee loadout with the given speed and sub-hit count.
pub fn melee(max_hit: u32, speed: u32, sub_hits: u8) -> Strategy {
    Strategy::Melee(Melee {
        max_hit,
        speed,
        sub_hits,
    })
}

/// Runs `ticks` engine ticks.
pub fn run_ticks(engine: &mut Engine, ticks: usize) {
    for _ in 0..ticks {
        engine.tick();
    }
}

// =============================================================================
// Journal queries
// =============================================================================

/// Ticks at which `attacker` dispatched a hit.
pub fn dispatch_ticks(events: &[CombatEvent], attacker: EntityId) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::HitDispatched {
                tick, attacker: a, ..
            } if *a == attacker => Some(*tick),
            _ => None,
        })
        .collect()
}

/// Reasons `entity`'s session was reset, in order.
pub fn reset_reasons(events: &[CombatEvent], entity: EntityId) -> Vec<ResetReason> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::SessionReset {
                entity: id, reason, ..
            } if *id == entity => Some(*reason),
            _ => None,
        })
        .collect()
}

/// Number of events matching `predicate`.
pub fn count<F>(events: &[CombatEvent], predicate: F) -> usize
where
    F: Fn(&CombatEvent) -> bool,
{
    events.iter().filter(|e| predicate(e)).count()
}
