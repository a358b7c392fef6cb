//! Combat journal.
//!
//! The world records a [`CombatEvent`] for every observable combat
//! transition. Collaborators drain the journal once per tick with
//! [`World::take_events`](crate::world::World::take_events) to drive
//! telemetry, replays and client effects; tests use it as the trace of what
//! the hook decided.

use serde::{Deserialize, Serialize};

use crate::combat::CombatStyle;
use crate::entity::EntityId;

/// Why a combat session was reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetReason {
    /// The forced-inactive cooldown ran out.
    CooldownExpired,
    /// The target teleported, despawned or left the world.
    TargetUnreachable,
    /// The target left the wilderness during a player fight.
    TargetLeftWilderness,
    /// Refused by the one-attacker-at-a-time rule.
    Engagement,
    /// An NPC abandoned the chase.
    Retreat,
    /// The attacker is leaving the world.
    Unregistered,
    /// The target died.
    TargetDied,
    /// The strategy could not attack (out of ammunition or runes).
    StrategyDeclined,
    /// The session was in an impossible state.
    Invariant,
    /// A collaborator asked for it.
    Requested,
}

/// Which side of an engagement the refusal was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Refusal {
    /// The attacker is itself fighting someone else.
    AttackerBusy,
    /// The target is already fighting someone else.
    TargetBusy,
}

/// One observable combat transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// `attacker` started a session against `target`.
    SessionStarted {
        /// Tick of the transition.
        tick: u64,
        /// Session owner.
        attacker: EntityId,
        /// Chosen target.
        target: EntityId,
    },
    /// A session was cleared.
    SessionReset {
        /// Tick of the transition.
        tick: u64,
        /// Session owner.
        entity: EntityId,
        /// Why it was cleared.
        reason: ResetReason,
    },
    /// The one-attacker-at-a-time rule refused an engagement.
    EngagementRefused {
        /// Tick of the transition.
        tick: u64,
        /// Session owner.
        attacker: EntityId,
        /// Intended target.
        target: EntityId,
        /// Which side was already busy.
        refusal: Refusal,
    },
    /// An NPC walked back to its origin.
    Retreated {
        /// Tick of the transition.
        tick: u64,
        /// The NPC.
        entity: EntityId,
    },
    /// A hit application task was scheduled.
    HitDispatched {
        /// Tick of the transition.
        tick: u64,
        /// Striking entity.
        attacker: EntityId,
        /// Entity about to be hit.
        target: EntityId,
        /// Attack style.
        style: CombatStyle,
        /// Number of sub-hits (1 to 4).
        sub_hits: usize,
        /// Sum of sub-hit damage.
        total: u32,
        /// Ticks until the hit lands.
        delay: u32,
        /// Lands in the dispatching tick.
        immediate: bool,
    },
    /// A protection prayer zeroed an attack.
    Negated {
        /// Tick of the transition.
        tick: u64,
        /// Striking entity.
        attacker: EntityId,
        /// Protected entity.
        target: EntityId,
        /// Attack style that was guarded against.
        style: CombatStyle,
    },
    /// Hits were applied to a health pool.
    DamageApplied {
        /// Tick of the transition.
        tick: u64,
        /// Striking entity.
        attacker: EntityId,
        /// Damaged entity.
        target: EntityId,
        /// Hitpoints actually removed.
        dealt: u32,
        /// Number of sub-hits applied.
        sub_hits: usize,
        /// Delivered as one combined quad update.
        combined: bool,
    },
    /// Hitpoints reached zero.
    Died {
        /// Tick of the transition.
        tick: u64,
        /// The entity that died.
        entity: EntityId,
        /// Who dealt the final hit.
        killer: EntityId,
    },
}

impl CombatEvent {
    /// Tick at which the event was recorded.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::SessionStarted { tick, .. }
            | Self::SessionReset { tick, .. }
            | Self::EngagementRefused { tick, .. }
            | Self::Retreated { tick, .. }
            | Self::HitDispatched { tick, .. }
            | Self::Negated { tick, .. }
            | Self::DamageApplied { tick, .. }
            | Self::Died { tick, .. } => *tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_as_tagged_json() {
        let event = CombatEvent::SessionReset {
            tick: 4,
            entity: EntityId::new(2),
            reason: ResetReason::TargetUnreachable,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SessionReset"));
        assert!(json.contains("TargetUnreachable"));
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.tick(), 4);
    }
}
