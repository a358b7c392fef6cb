//! Designated map areas.
//!
//! Zones are axis-aligned rectangles over tile coordinates with inclusive
//! bounds. They apply on every plane.

use serde::{Deserialize, Serialize};

use crate::entity::Position;

/// What a zone changes about combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Players may attack each other here.
    Wilderness,
    /// The one-attacker-at-a-time rule is waived here.
    MultiCombat,
}

/// A rectangular area of a given kind.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::Position;
/// use skirmish_core::zone::{Zone, ZoneKind};
///
/// let zone = Zone::new(ZoneKind::Wilderness, 3000, 3520, 3400, 3970);
/// assert!(zone.contains(Position::new(3100, 3600, 0)));
/// assert!(zone.contains(Position::new(3400, 3970, 2)));
/// assert!(!zone.contains(Position::new(3100, 3519, 0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone kind.
    pub kind: ZoneKind,
    /// Western edge (inclusive).
    pub min_x: i32,
    /// Southern edge (inclusive).
    pub min_y: i32,
    /// Eastern edge (inclusive).
    pub max_x: i32,
    /// Northern edge (inclusive).
    pub max_y: i32,
}

impl Zone {
    /// Creates a zone; the corners may be given in any order.
    #[must_use]
    pub fn new(kind: ZoneKind, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            kind,
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Returns `true` if `position` lies inside the zone.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x())
            && (self.min_y..=self.max_y).contains(&position.y())
    }
}

/// The zones of a world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneMap {
    zones: Vec<Zone>,
}

impl ZoneMap {
    /// An empty map: no wilderness, no multi-combat areas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone.
    pub fn insert(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// All zones, in insertion order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns `true` if any zone of `kind` contains `position`.
    #[must_use]
    pub fn is_in(&self, kind: ZoneKind, position: Position) -> bool {
        self.zones
            .iter()
            .any(|zone| zone.kind == kind && zone.contains(position))
    }

    /// Player-versus-player combat is allowed at `position`.
    #[must_use]
    pub fn in_wilderness(&self, position: Position) -> bool {
        self.is_in(ZoneKind::Wilderness, position)
    }

    /// Several attackers may fight one target at `position`.
    #[must_use]
    pub fn in_multi_combat(&self, position: Position) -> bool {
        self.is_in(ZoneKind::MultiCombat, position)
    }
}

impl FromIterator<Zone> for ZoneMap {
    fn from_iter<I: IntoIterator<Item = Zone>>(iter: I) -> Self {
        Self {
            zones: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalised() {
        let zone = Zone::new(ZoneKind::MultiCombat, 10, 10, 0, 0);
        assert_eq!((zone.min_x, zone.max_x), (0, 10));
        assert!(zone.contains(Position::new(0, 10, 0)));
    }

    #[test]
    fn kinds_are_independent() {
        let map: ZoneMap = [
            Zone::new(ZoneKind::Wilderness, 0, 0, 100, 100),
            Zone::new(ZoneKind::MultiCombat, 50, 50, 60, 60),
        ]
        .into_iter()
        .collect();

        let inside_both = Position::new(55, 55, 0);
        let wild_only = Position::new(10, 10, 0);
        assert!(map.in_wilderness(inside_both));
        assert!(map.in_multi_combat(inside_both));
        assert!(map.in_wilderness(wild_only));
        assert!(!map.in_multi_combat(wild_only));
        assert!(!map.in_wilderness(Position::new(101, 0, 0)));
    }

    #[test]
    fn empty_map_contains_nothing() {
        let map = ZoneMap::new();
        assert!(!map.in_wilderness(Position::default()));
        assert!(map.zones().is_empty());
    }
}
