//! Entity module: players and NPCs that can fight.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier, also used as a weak reference
//! - [`EntityKind`]: Player / NPC discriminator
//! - [`Profile`]: Kind-specific data
//! - [`Entity`]: The complete entity, owning its [`CombatSession`]
//!
//! # Weak references
//!
//! Entities never hold references to each other. A session's target and last
//! attacker are [`EntityId`]s resolved through the [`World`](crate::world::World)
//! registry at use time, so a despawned entity cannot dangle.
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Entity, EntityId, Position, Profile, PlayerProfile};
//!
//! let player = Entity::new(
//!     EntityId::new(7),
//!     Profile::Player(PlayerProfile::default()),
//!     Position::new(3200, 3200, 0),
//! );
//!
//! assert!(player.is_player());
//! assert!(!player.is_dead());
//! assert!(player.session().target().is_none());
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    ArmourSet, EntityFlags, Facing, Hitpoints, NpcProfile, PlayerProfile, Position, Protection,
    Supplies,
};

use crate::combat::{CombatSession, Hit, SplatUpdate, Strategy};

/// Unique identifier for an entity.
///
/// Entity IDs are assigned monotonically by the world and ordered by value,
/// which gives deterministic iteration across the registry.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Player / NPC discriminator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Controlled by a connected client.
    Player,
    /// Controlled by the server.
    Npc,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Npc => write!(f, "Npc"),
        }
    }
}

/// Kind-specific entity data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    /// Player data.
    Player(PlayerProfile),
    /// NPC data.
    Npc(NpcProfile),
}

impl Profile {
    /// The kind this profile belongs to.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Player(_) => EntityKind::Player,
            Self::Npc(_) => EntityKind::Npc,
        }
    }
}

/// A player or NPC in the world.
///
/// The entity exclusively owns its combat session. Everything else about it
/// (movement, inventory, skills) belongs to collaborators and is represented
/// here only by the flags and values the combat core queries.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    profile: Profile,
    position: Position,
    flags: EntityFlags,
    hitpoints: Hitpoints,
    protection: Protection,
    armour: Option<ArmourSet>,
    supplies: Supplies,
    loadout: Strategy,
    session: CombatSession,
    facing: Facing,
    following: Option<EntityId>,
    walk_destination: Option<Position>,
    last_combat: Option<u64>,
    last_fight: Option<u64>,
    splats: Vec<SplatUpdate>,
}

impl Entity {
    /// Creates an entity with full default hitpoints, a default melee
    /// loadout and auto-retaliate enabled.
    #[must_use]
    pub fn new(id: EntityId, profile: Profile, position: Position) -> Self {
        Self {
            id,
            profile,
            position,
            flags: EntityFlags::AUTO_RETALIATE,
            hitpoints: Hitpoints::default(),
            protection: Protection::empty(),
            armour: None,
            supplies: Supplies::default(),
            loadout: Strategy::default(),
            session: CombatSession::new(),
            facing: Facing::None,
            following: None,
            walk_destination: None,
            last_combat: None,
            last_fight: None,
            splats: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Sets the health pool.
    #[must_use]
    pub fn with_hitpoints(mut self, hitpoints: Hitpoints) -> Self {
        self.hitpoints = hitpoints;
        self
    }

    /// Sets the attack strategy the entity fights with.
    #[must_use]
    pub fn with_loadout(mut self, loadout: Strategy) -> Self {
        self.loadout = loadout;
        self
    }

    /// Sets active protection prayers.
    #[must_use]
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// Sets the worn armour set.
    #[must_use]
    pub fn with_armour(mut self, armour: ArmourSet) -> Self {
        self.armour = Some(armour);
        self
    }

    /// Sets ammunition and rune supplies.
    #[must_use]
    pub fn with_supplies(mut self, supplies: Supplies) -> Self {
        self.supplies = supplies;
        self
    }

    /// Replaces the status flags.
    #[must_use]
    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------

    /// The entity's identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Player or NPC.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.profile.kind()
    }

    /// Kind-specific data.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Player data, if this is a player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerProfile> {
        match &self.profile {
            Profile::Player(p) => Some(p),
            Profile::Npc(_) => None,
        }
    }

    /// NPC data, if this is an NPC.
    #[must_use]
    pub const fn as_npc(&self) -> Option<&NpcProfile> {
        match &self.profile {
            Profile::Npc(n) => Some(n),
            Profile::Player(_) => None,
        }
    }

    /// Returns `true` for players.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.profile, Profile::Player(_))
    }

    /// Returns `true` for NPCs.
    #[must_use]
    pub const fn is_npc(&self) -> bool {
        matches!(self.profile, Profile::Npc(_))
    }

    // -------------------------------------------------------------------------
    // Position & movement
    // -------------------------------------------------------------------------

    /// Current tile.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the entity (collaborators own pathing).
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Tile the entity has been told to walk to, if any.
    #[must_use]
    pub const fn walk_destination(&self) -> Option<Position> {
        self.walk_destination
    }

    /// Queues a walk to `destination` for the movement collaborator.
    pub fn walk_to(&mut self, destination: Position) {
        self.walk_destination = Some(destination);
    }

    /// Entity being followed, if any.
    #[must_use]
    pub const fn following(&self) -> Option<EntityId> {
        self.following
    }

    /// Starts or stops following.
    pub fn follow(&mut self, target: Option<EntityId>) {
        self.following = target;
    }

    /// Current facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Turns the entity.
    pub fn face(&mut self, facing: Facing) {
        self.facing = facing;
    }

    // -------------------------------------------------------------------------
    // Flags
    // -------------------------------------------------------------------------

    /// All status flags.
    #[must_use]
    pub const fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Sets or clears a status flag.
    pub fn set_flag(&mut self, flag: EntityFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Hitpoints reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.contains(EntityFlags::DEAD)
    }

    /// Mid-teleport.
    #[must_use]
    pub const fn is_teleporting(&self) -> bool {
        self.flags.contains(EntityFlags::TELEPORTING)
    }

    /// Leaving the world.
    #[must_use]
    pub const fn is_unregistered(&self) -> bool {
        self.flags.contains(EntityFlags::UNREGISTERED)
    }

    /// Running rather than walking.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.flags.contains(EntityFlags::RUNNING)
    }

    /// Movement is locked.
    #[must_use]
    pub const fn is_movement_locked(&self) -> bool {
        self.flags.contains(EntityFlags::MOVEMENT_LOCKED)
    }

    /// Fights back automatically.
    #[must_use]
    pub const fn auto_retaliates(&self) -> bool {
        self.flags.contains(EntityFlags::AUTO_RETALIATE)
    }

    // -------------------------------------------------------------------------
    // Combat gear
    // -------------------------------------------------------------------------

    /// Active protection prayers.
    #[must_use]
    pub const fn protection(&self) -> Protection {
        self.protection
    }

    /// Replaces active protection prayers.
    pub fn set_protection(&mut self, protection: Protection) {
        self.protection = protection;
    }

    /// Worn armour set, if complete.
    #[must_use]
    pub const fn armour(&self) -> Option<ArmourSet> {
        self.armour
    }

    /// Whether the worn set lets attacks hit through protection prayers.
    #[must_use]
    pub fn bypasses_protection(&self) -> bool {
        self.armour.is_some_and(ArmourSet::bypasses_protection)
    }

    /// Ammunition and runes.
    #[must_use]
    pub const fn supplies(&self) -> Supplies {
        self.supplies
    }

    /// Mutable ammunition and runes.
    pub fn supplies_mut(&mut self) -> &mut Supplies {
        &mut self.supplies
    }

    /// Strategy the entity attacks with.
    #[must_use]
    pub const fn loadout(&self) -> Strategy {
        self.loadout
    }

    /// Changes the strategy (weapon switch, autocast).
    pub fn set_loadout(&mut self, loadout: Strategy) {
        self.loadout = loadout;
    }

    // -------------------------------------------------------------------------
    // Session & stopwatches
    // -------------------------------------------------------------------------

    /// Combat session.
    #[must_use]
    pub const fn session(&self) -> &CombatSession {
        &self.session
    }

    /// Mutable combat session.
    pub fn session_mut(&mut self) -> &mut CombatSession {
        &mut self.session
    }

    /// Tick at which this entity was last attacked.
    #[must_use]
    pub const fn last_combat(&self) -> Option<u64> {
        self.last_combat
    }

    /// Restarts the "being attacked" stopwatch.
    pub fn reset_last_combat(&mut self, now: u64) {
        self.last_combat = Some(now);
    }

    /// Whether this entity was struck within the last `window` ticks.
    #[must_use]
    pub fn is_being_attacked(&self, now: u64, window: u32) -> bool {
        self.last_combat
            .is_some_and(|at| now.saturating_sub(at) <= u64::from(window))
    }

    /// Tick at which this entity last attacked.
    #[must_use]
    pub const fn last_fight(&self) -> Option<u64> {
        self.last_fight
    }

    /// Restarts the "attacking" stopwatch.
    pub fn reset_last_fight(&mut self, now: u64) {
        self.last_fight = Some(now);
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// Health pool.
    #[must_use]
    pub const fn hitpoints(&self) -> Hitpoints {
        self.hitpoints
    }

    /// Replaces the health pool (healing belongs to collaborators).
    pub fn set_hitpoints(&mut self, hitpoints: Hitpoints) {
        self.hitpoints = hitpoints;
        self.flags.set(EntityFlags::DEAD, hitpoints.is_empty());
    }

    /// Applies one to three discrete hits, each shown as its own splat.
    ///
    /// Returns the hitpoints actually removed.
    pub fn apply_damage(&mut self, hits: &[Hit]) -> u32 {
        let mut dealt = 0;
        for hit in hits {
            dealt += self.hitpoints.deplete(hit.damage());
            self.splats.push(SplatUpdate::Single(*hit));
        }
        self.mark_dead_if_empty();
        dealt
    }

    /// Applies four hits as one combined quad-hit update.
    ///
    /// Returns the hitpoints actually removed.
    pub fn apply_quad_damage(&mut self, h0: Hit, h1: Hit, h2: Hit, h3: Hit) -> u32 {
        let hits = [h0, h1, h2, h3];
        let dealt = hits
            .iter()
            .map(|hit| self.hitpoints.deplete(hit.damage()))
            .sum();
        self.splats.push(SplatUpdate::Quad(hits));
        self.mark_dead_if_empty();
        dealt
    }

    /// Hit-splat updates not yet sent to clients.
    #[must_use]
    pub fn splats(&self) -> &[SplatUpdate] {
        &self.splats
    }

    /// Drains pending hit-splat updates for the protocol layer.
    pub fn take_splats(&mut self) -> Vec<SplatUpdate> {
        std::mem::take(&mut self.splats)
    }

    fn mark_dead_if_empty(&mut self) {
        if self.hitpoints.is_empty() {
            self.flags.insert(EntityFlags::DEAD);
        }
    }
}
