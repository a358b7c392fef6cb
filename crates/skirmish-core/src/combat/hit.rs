//! Hit outcomes: the ephemeral result of one resolved attack.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CombatError;

/// Most sub-hits a single attack can produce.
pub const MAX_SUB_HITS: usize = 4;

/// Attack style.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatStyle {
    /// Close combat.
    Melee,
    /// Missiles: arrows, bolts, thrown weapons.
    Ranged,
    /// Spells.
    Magic,
}

impl fmt::Display for CombatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Melee => write!(f, "melee"),
            Self::Ranged => write!(f, "ranged"),
            Self::Magic => write!(f, "magic"),
        }
    }
}

/// How a sub-hit is drawn on the client.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Splat {
    /// Damage was dealt.
    #[default]
    Normal,
    /// Nothing got through.
    Blocked,
}

/// One discrete sub-hit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hit {
    damage: u32,
    splat: Splat,
}

impl Hit {
    /// A hit of `damage`; zero damage is shown as blocked.
    #[must_use]
    pub const fn new(damage: u32) -> Self {
        Self {
            damage,
            splat: if damage == 0 { Splat::Blocked } else { Splat::Normal },
        }
    }

    /// A zero-damage, blocked hit.
    #[must_use]
    pub const fn blocked() -> Self {
        Self::new(0)
    }

    /// Damage carried by this hit.
    #[must_use]
    pub const fn damage(self) -> u32 {
        self.damage
    }

    /// Client presentation.
    #[must_use]
    pub const fn splat(self) -> Splat {
        self.splat
    }
}

/// Pending hit-splat update for the protocol layer.
///
/// One to three sub-hits produce one `Single` update each; four sub-hits
/// produce exactly one `Quad` update.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplatUpdate {
    /// A single splat.
    Single(Hit),
    /// Four splats delivered together.
    Quad([Hit; 4]),
}

/// Result of one successful attack resolution.
///
/// # Example
///
/// ```
/// use skirmish_core::combat::{CombatStyle, Hit, HitOutcome};
///
/// let outcome = HitOutcome::new(CombatStyle::Ranged, [Hit::new(4), Hit::new(7)]).unwrap();
/// assert_eq!(outcome.total_damage(), 11);
/// assert!(!outcome.is_quad());
///
/// assert!(HitOutcome::new(CombatStyle::Melee, Vec::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitOutcome {
    style: CombatStyle,
    hits: ArrayVec<Hit, MAX_SUB_HITS>,
}

impl HitOutcome {
    /// Builds an outcome from one to four sub-hits.
    ///
    /// # Errors
    ///
    /// [`CombatError::InvalidHitCount`] when `hits` is empty or longer than four.
    pub fn new<I>(style: CombatStyle, hits: I) -> Result<Self, CombatError>
    where
        I: IntoIterator<Item = Hit>,
    {
        let mut collected: ArrayVec<Hit, MAX_SUB_HITS> = ArrayVec::new();
        let mut count = 0;
        for hit in hits {
            count += 1;
            if count <= MAX_SUB_HITS {
                collected.push(hit);
            }
        }
        if count == 0 || count > MAX_SUB_HITS {
            return Err(CombatError::InvalidHitCount(count));
        }
        Ok(Self {
            style,
            hits: collected,
        })
    }

    /// A single-hit outcome.
    #[must_use]
    pub fn single(style: CombatStyle, hit: Hit) -> Self {
        let mut hits = ArrayVec::new();
        hits.push(hit);
        Self { style, hits }
    }

    /// Attack style.
    #[must_use]
    pub const fn style(&self) -> CombatStyle {
        self.style
    }

    /// The sub-hits, in order.
    #[must_use]
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Owned copy of the sub-hits.
    #[must_use]
    pub fn to_hits(&self) -> ArrayVec<Hit, MAX_SUB_HITS> {
        self.hits.clone()
    }

    /// Sum of sub-hit damage.
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage()).sum()
    }

    /// Whether the outcome is delivered as one combined quad hit.
    #[must_use]
    pub fn is_quad(&self) -> bool {
        self.hits.len() == MAX_SUB_HITS
    }

    /// Replaces every sub-hit with a blocked zero hit.
    pub fn negate(&mut self) {
        for hit in &mut self.hits {
            *hit = Hit::blocked();
        }
    }
}
