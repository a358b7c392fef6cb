//! The world: entity registry plus everything combat reads from its
//! surroundings.
//!
//! The world is the shared state handed to every task. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Monotonic id assignment on spawn
//! - Zones, combat constants and the seeded random source
//! - The player notifier and the combat journal
//!
//! Entity ids double as weak references: sessions store ids and resolve them
//! here on every use, so a despawned entity simply stops resolving.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::entity::{Hitpoints, NpcProfile, Position, Profile};
//! use skirmish_core::world::World;
//!
//! let mut world = World::new(&EngineConfig::default());
//! let origin = Position::new(3222, 3218, 0);
//! let guard = world.spawn_with(
//!     Profile::Npc(NpcProfile::new("Guard", origin).with_retreat(true)),
//!     origin,
//!     |e| e.with_hitpoints(Hitpoints::full(22)),
//! );
//!
//! assert_eq!(world.get(guard).unwrap().hitpoints().current, 22);
//! assert_eq!(world.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::SplatUpdate;
use crate::config::{CombatConfig, EngineConfig};
use crate::entity::{Entity, EntityId, Position, Profile};
use crate::event::CombatEvent;
use crate::notify::{Discard, Notifier};
use crate::zone::ZoneMap;

/// Shared simulation state.
pub struct World {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    zones: ZoneMap,
    config: CombatConfig,
    seed: u64,
    rng: ChaCha8Rng,
    notifier: Box<dyn Notifier>,
    journal: Vec<CombatEvent>,
}

impl World {
    /// Creates an empty world from configuration.
    ///
    /// Notices are discarded until [`set_notifier`](Self::set_notifier) is
    /// called.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            zones: config.zones.iter().copied().collect(),
            config: config.combat,
            seed: config.seed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            notifier: Box::new(Discard),
            journal: Vec::new(),
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Spawns an entity with default components.
    pub fn spawn(&mut self, profile: Profile, position: Position) -> EntityId {
        self.spawn_with(profile, position, |entity| entity)
    }

    /// Spawns an entity, letting `configure` set its components first.
    pub fn spawn_with<F>(&mut self, profile: Profile, position: Position, configure: F) -> EntityId
    where
        F: FnOnce(Entity) -> Entity,
    {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let kind = profile.kind();
        let entity = configure(Entity::new(id, profile, position));
        self.entities.insert(id, entity);
        tracing::debug!(%id, %kind, "entity spawned");
        id
    }

    /// Removes an entity, cancelling its combat hook.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        entity.session_mut().reset();
        tracing::debug!(%id, "entity despawned");
        Some(entity)
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Looks an entity up.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Looks an entity up for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Two entities plus the random source, for resolving an attack.
    ///
    /// Returns `None` if either entity is missing.
    pub fn combatants(
        &mut self,
        attacker: EntityId,
        target: EntityId,
    ) -> Option<(&Entity, &Entity, &mut ChaCha8Rng)> {
        let Self { entities, rng, .. } = self;
        Some((entities.get(&attacker)?, entities.get(&target)?, rng))
    }

    /// Iterates entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Registered entity ids, ascending.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` when no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // =========================================================================
    // Surroundings
    // =========================================================================

    /// Wilderness and multi-combat areas.
    #[must_use]
    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    /// Mutable zone map.
    pub fn zones_mut(&mut self) -> &mut ZoneMap {
        &mut self.zones
    }

    /// Combat constants.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Seed the random source was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The seeded random source.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // =========================================================================
    // Notifications & journal
    // =========================================================================

    /// Replaces the player notifier.
    pub fn set_notifier<N>(&mut self, notifier: N)
    where
        N: Notifier + 'static,
    {
        self.notifier = Box::new(notifier);
    }

    /// Sends `message` to `player`.
    pub fn notify(&mut self, player: EntityId, message: &str) {
        self.notifier.notify(player, message);
    }

    /// Appends an event to the combat journal.
    pub fn record(&mut self, event: CombatEvent) {
        tracing::trace!(?event, "combat event");
        self.journal.push(event);
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.journal
    }

    /// Drains the combat journal.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Drains every entity's pending hit splats, in id order. Entities with
    /// nothing pending are skipped.
    pub fn take_splats(&mut self) -> Vec<(EntityId, Vec<SplatUpdate>)> {
        self.entities
            .iter_mut()
            .filter(|(_, entity)| !entity.splats().is_empty())
            .map(|(id, entity)| (*id, entity.take_splats()))
            .collect()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("next_id", &self.next_id)
            .field("zones", &self.zones.zones().len())
            .field("seed", &self.seed)
            .field("journal", &self.journal.len())
            .finish_non_exhaustive()
    }
}
