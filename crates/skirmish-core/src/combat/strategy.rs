//! Attack strategies.
//!
//! The set of combat styles is closed, so strategies are an enum dispatched
//! by tag rather than trait objects. Every variant answers the same four
//! questions the combat hook asks:
//!
//! - [`Strategy::required_distance`]: how close the attacker must be
//! - [`Strategy::prepare_attack`]: whether it can attack now (and pays for it)
//! - [`Strategy::attack`]: the hit outcome against a target
//! - [`Strategy::recovery_ticks`]: the attack timer after a strike
//!
//! Damage rolls are deliberately simple (uniform per sub-hit); accuracy and
//! bonus formulas belong to the content layer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hit::{CombatStyle, Hit, HitOutcome, MAX_SUB_HITS};
use crate::entity::{ArmourSet, Entity};

/// Close-combat weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melee {
    /// Highest damage per sub-hit.
    pub max_hit: u32,
    /// Ticks between swings.
    pub speed: u32,
    /// Sub-hits per swing (1 to 4).
    pub sub_hits: u8,
}

impl Default for Melee {
    fn default() -> Self {
        Self {
            max_hit: 5,
            speed: 4,
            sub_hits: 1,
        }
    }
}

/// Bow, crossbow or thrown weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranged {
    /// Highest damage per sub-hit.
    pub max_hit: u32,
    /// Ticks between shots.
    pub speed: u32,
    /// Attack range in tiles.
    pub range: i32,
    /// Sub-hits per shot (1 to 4); each consumes one piece of ammunition.
    pub sub_hits: u8,
}

impl Default for Ranged {
    fn default() -> Self {
        Self {
            max_hit: 8,
            speed: 4,
            range: 7,
            sub_hits: 1,
        }
    }
}

/// Combat spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magic {
    /// Highest damage.
    pub max_hit: u32,
    /// Ticks between casts.
    pub speed: u32,
    /// Casting range in tiles.
    pub range: i32,
    /// Rune charges consumed per cast.
    pub rune_cost: u32,
}

impl Default for Magic {
    fn default() -> Self {
        Self {
            max_hit: 10,
            speed: 5,
            range: 8,
            rune_cost: 1,
        }
    }
}

/// The active attack strategy of a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Melee attacks.
    Melee(Melee),
    /// Ranged attacks.
    Ranged(Ranged),
    /// Magic attacks.
    Magic(Magic),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Melee(Melee::default())
    }
}

impl Strategy {
    /// Picks the strategy an entity fights with right now.
    #[must_use]
    pub fn determine(entity: &Entity) -> Self {
        entity.loadout()
    }

    /// Attack style of this strategy.
    #[must_use]
    pub const fn style(self) -> CombatStyle {
        match self {
            Self::Melee(_) => CombatStyle::Melee,
            Self::Ranged(_) => CombatStyle::Ranged,
            Self::Magic(_) => CombatStyle::Magic,
        }
    }

    /// Tiles within which the attacker may strike.
    #[must_use]
    pub const fn required_distance(self) -> i32 {
        match self {
            Self::Melee(_) => 1,
            Self::Ranged(r) => r.range,
            Self::Magic(m) => m.range,
        }
    }

    /// Checks and spends the resources one attack needs.
    ///
    /// Returns `false` (spending nothing) when the entity cannot afford the
    /// attack.
    pub fn prepare_attack(self, entity: &mut Entity) -> bool {
        let supplies = entity.supplies_mut();
        match self {
            Self::Melee(_) => true,
            Self::Ranged(r) => {
                let cost = u32::from(clamp_sub_hits(r.sub_hits));
                if supplies.ammunition < cost {
                    return false;
                }
                supplies.ammunition -= cost;
                true
            }
            Self::Magic(m) => {
                if supplies.runes < m.rune_cost {
                    return false;
                }
                supplies.runes -= m.rune_cost;
                true
            }
        }
    }

    /// Rolls the hit outcome against `target`.
    ///
    /// Returns `None` when there is nothing left to hit.
    pub fn attack<R>(self, attacker: &Entity, target: &Entity, rng: &mut R) -> Option<HitOutcome>
    where
        R: Rng + ?Sized,
    {
        if target.is_dead() {
            return None;
        }
        let (max_hit, sub_hits) = match self {
            Self::Melee(m) => (dharok_bonus(attacker, m.max_hit), m.sub_hits),
            Self::Ranged(r) => (r.max_hit, r.sub_hits),
            Self::Magic(m) => (m.max_hit, 1),
        };
        let hits = (0..clamp_sub_hits(sub_hits)).map(|_| Hit::new(rng.gen_range(0..=max_hit)));
        HitOutcome::new(self.style(), hits).ok()
    }

    /// Attack timer value after a strike (at least one tick).
    #[must_use]
    pub const fn recovery_ticks(self) -> u32 {
        let speed = match self {
            Self::Melee(m) => m.speed,
            Self::Ranged(r) => r.speed,
            Self::Magic(m) => m.speed,
        };
        if speed == 0 {
            1
        } else {
            speed
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_sub_hits(sub_hits: u8) -> u8 {
    sub_hits.clamp(1, MAX_SUB_HITS as u8)
}

/// Full Dharok's raises the max hit in proportion to missing hitpoints.
fn dharok_bonus(attacker: &Entity, max_hit: u32) -> u32 {
    if attacker.armour() != Some(ArmourSet::Dharok) {
        return max_hit;
    }
    let hp = attacker.hitpoints();
    if hp.max == 0 {
        return max_hit;
    }
    let missing = hp.max - hp.current.min(hp.max);
    let bonus = u64::from(max_hit) * u64::from(missing) / u64::from(hp.max);
    u32::try_from(bonus).map_or(u32::MAX, |bonus| max_hit.saturating_add(bonus))
}
