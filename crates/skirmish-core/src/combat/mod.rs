//! Combat: sessions, the per-tick hook, strategies, mitigation and hit
//! application.
//!
//! A fight flows through three layers:
//!
//! 1. [`start_session`] puts a target into the attacker's [`CombatSession`]
//!    and registers a [`CombatHookTask`]
//! 2. every tick the hook checks whether an attack can happen and, when it
//!    can, rolls a [`HitOutcome`] with the session's [`Strategy`] and
//!    applies [`mitigate`]
//! 3. the outcome travels in a [`HitApplicationTask`] that lands on the
//!    target after the style's delay

mod hit;
mod hit_task;
mod hook;
mod mitigation;
mod session;
mod strategy;

pub use hit::{CombatStyle, Hit, HitOutcome, Splat, SplatUpdate, MAX_SUB_HITS};
pub use hit_task::HitApplicationTask;
pub use hook::CombatHookTask;
pub use mitigation::{mitigate, Negation};
pub use session::{
    begin_cooldown, disengage, is_being_attacked, last_attacker, reset_session, start_session,
    CombatSession,
};
pub use strategy::{Magic, Melee, Ranged, Strategy};
