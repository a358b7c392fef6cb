//! One-way text notifications to players.
//!
//! The combat core tells players why an attack did not happen ("You are
//! already under attack!"). Delivery belongs to the protocol layer, which
//! plugs in through [`Notifier`].

use std::sync::mpsc;

use crate::entity::EntityId;

/// Target left the wilderness during a player fight.
pub const TARGET_NOT_IN_WILDERNESS: &str = "Your target is not in the wilderness!";
/// Attacker is already fighting someone else outside multi-combat.
pub const ALREADY_UNDER_ATTACK: &str = "You are already under attack!";
/// Target is already fighting someone else outside multi-combat.
pub const TARGET_ALREADY_UNDER_ATTACK: &str = "They are already under attack!";

/// A message addressed to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Recipient.
    pub player: EntityId,
    /// Message text.
    pub message: String,
}

/// Sink for player notifications.
pub trait Notifier: Send {
    /// Delivers `message` to `player`. Must not block.
    fn notify(&mut self, player: EntityId, message: &str);
}

/// Forwards notices over a channel to the protocol thread.
///
/// A disconnected receiver is logged and the notice dropped.
impl Notifier for mpsc::Sender<Notice> {
    fn notify(&mut self, player: EntityId, message: &str) {
        let notice = Notice {
            player,
            message: message.to_string(),
        };
        if self.send(notice).is_err() {
            tracing::warn!(%player, message, "notice receiver disconnected");
        }
    }
}

/// Drops every notice after tracing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Notifier for Discard {
    fn notify(&mut self, player: EntityId, message: &str) {
        tracing::debug!(%player, message, "notice discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_delivers() {
        let (mut tx, rx) = mpsc::channel();
        tx.notify(EntityId::new(3), ALREADY_UNDER_ATTACK);
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.player, EntityId::new(3));
        assert_eq!(notice.message, "You are already under attack!");
    }

    #[test]
    fn disconnected_channel_is_not_fatal() {
        let (mut tx, rx) = mpsc::channel::<Notice>();
        drop(rx);
        tx.notify(EntityId::new(3), TARGET_NOT_IN_WILDERNESS);
    }
}
