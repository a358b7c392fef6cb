//! Component types carried by every entity.
//!
//! These are the pieces of entity state the combat core reads and mutates:
//! tile position, hitpoints, status flags, protection prayers, worn armour
//! set, combat supplies, facing, and the kind-specific profiles.

use bitflags::bitflags;
use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::combat::CombatStyle;

// =============================================================================
// Position
// =============================================================================

/// Tile position: `x`, `y` and the height plane.
///
/// Distances are measured per axis (a diagonal step counts as one tile) and
/// only between positions on the same plane.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::Position;
///
/// let a = Position::new(3200, 3200, 0);
/// let b = Position::new(3203, 3199, 0);
///
/// assert_eq!(a.distance(b), Some(3));
/// assert!(a.within_distance(b, 3));
/// assert!(!a.within_distance(Position::new(3200, 3200, 1), 10));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(IVec3);

impl Position {
    /// Creates a position from tile coordinates and plane.
    #[must_use]
    pub const fn new(x: i32, y: i32, plane: i32) -> Self {
        Self(IVec3::new(x, y, plane))
    }

    /// Tile x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// Tile y coordinate.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.0.y
    }

    /// Height plane.
    #[must_use]
    pub const fn plane(self) -> i32 {
        self.0.z
    }

    /// Returns the underlying vector.
    #[must_use]
    pub const fn as_ivec3(self) -> IVec3 {
        self.0
    }

    /// Per-axis tile distance, or `None` across planes.
    #[must_use]
    pub fn distance(self, other: Self) -> Option<i32> {
        if self.plane() != other.plane() {
            return None;
        }
        let delta = (self.0 - other.0).abs();
        Some(delta.x.max(delta.y))
    }

    /// Returns `true` if `other` is on the same plane and at most `distance`
    /// tiles away on both axes.
    #[must_use]
    pub fn within_distance(self, other: Self, distance: i32) -> bool {
        self.distance(other).is_some_and(|d| d <= distance)
    }

    /// Returns this position moved by the given tile offsets.
    #[must_use]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self(self.0 + IVec3::new(dx, dy, 0))
    }
}

impl From<IVec3> for Position {
    fn from(v: IVec3) -> Self {
        Self(v)
    }
}

// =============================================================================
// Status flags
// =============================================================================

bitflags! {
    /// Entity status flags queried by the combat hook.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EntityFlags: u16 {
        /// Leaving the world; still present in the registry until despawned.
        const UNREGISTERED = 1 << 0;
        /// Mid-teleport.
        const TELEPORTING = 1 << 1;
        /// Hitpoints reached zero.
        const DEAD = 1 << 2;
        /// Movement is in run mode.
        const RUNNING = 1 << 3;
        /// Movement is locked (frozen, bound).
        const MOVEMENT_LOCKED = 1 << 4;
        /// Fights back automatically when attacked.
        const AUTO_RETALIATE = 1 << 5;
    }
}

bitflags! {
    /// Active protection prayers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Protection: u8 {
        /// Protect from Melee.
        const MELEE = 1 << 0;
        /// Protect from Missiles.
        const MISSILES = 1 << 1;
        /// Protect from Magic.
        const MAGIC = 1 << 2;
    }
}

impl Protection {
    /// The prayer that guards against `style`.
    #[must_use]
    pub const fn against(style: CombatStyle) -> Self {
        match style {
            CombatStyle::Melee => Self::MELEE,
            CombatStyle::Ranged => Self::MISSILES,
            CombatStyle::Magic => Self::MAGIC,
        }
    }

    /// Returns `true` if the prayer guarding against `style` is active.
    #[must_use]
    pub const fn guards(self, style: CombatStyle) -> bool {
        self.contains(Self::against(style))
    }
}

// =============================================================================
// Hitpoints
// =============================================================================

/// Health pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitpoints {
    /// Remaining hitpoints.
    pub current: u32,
    /// Maximum hitpoints.
    pub max: u32,
}

impl Hitpoints {
    /// A full pool of `max` hitpoints.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Removes up to `amount` hitpoints, returning how many were removed.
    pub fn deplete(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Returns `true` when no hitpoints remain.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }
}

impl Default for Hitpoints {
    fn default() -> Self {
        Self::full(10)
    }
}

// =============================================================================
// Equipment & supplies
// =============================================================================

/// A complete worn armour set with a combat effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmourSet {
    /// Hits through protection prayers.
    Verac,
    /// Damage grows as hitpoints fall.
    Dharok,
    /// Heals on hit.
    Guthan,
    /// Lowers agility.
    Karil,
    /// Lowers strength.
    Ahrim,
    /// Drains run energy.
    Torag,
}

impl ArmourSet {
    /// Whether wearing this set makes attacks ignore protection prayers.
    #[must_use]
    pub const fn bypasses_protection(self) -> bool {
        matches!(self, Self::Verac)
    }
}

/// Consumables spent by ranged and magic attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplies {
    /// Arrows, bolts or thrown weapons.
    pub ammunition: u32,
    /// Rune charges.
    pub runes: u32,
}

// =============================================================================
// Facing
// =============================================================================

/// What an entity is turned towards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// No particular direction.
    #[default]
    None,
    /// Tracking another entity.
    Entity(EntityId),
    /// Looking at a fixed tile.
    Position(Position),
}

// =============================================================================
// Profiles
// =============================================================================

/// Data only players carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name.
    pub name: String,
}

/// Data only NPCs carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcProfile {
    /// Definition name.
    pub name: String,
    /// Spawn tile the NPC returns to when it retreats.
    pub origin: Position,
    /// Whether the NPC abandons a chase that drags it away from `origin`.
    pub retreats: bool,
}

impl NpcProfile {
    /// A profile anchored at `origin`.
    #[must_use]
    pub fn new(name: impl Into<String>, origin: Position) -> Self {
        Self {
            name: name.into(),
            origin,
            retreats: false,
        }
    }

    /// Sets whether the NPC retreats to its origin.
    #[must_use]
    pub fn with_retreat(mut self, retreats: bool) -> Self {
        self.retreats = retreats;
        self
    }
}
