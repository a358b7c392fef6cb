//! Combat sessions.
//!
//! Every entity owns one [`CombatSession`]. A session is active while it has
//! a target; its [`CombatHookTask`] re-evaluates the fight once per tick
//! until something resets the session.
//!
//! The free functions here are the surface collaborators use: start a fight,
//! reset or disengage one, begin the wind-down cooldown, and ask whether an
//! entity is currently under attack.

use heartbeat::{Submit, TaskHandle};

use super::hook::CombatHookTask;
use super::strategy::Strategy;
use crate::entity::{EntityId, Facing};
use crate::error::CombatError;
use crate::event::{CombatEvent, ResetReason};
use crate::world::World;

/// Per-entity combat state.
///
/// Counters are unsigned and count down with saturation, so they never go
/// below zero.
#[derive(Debug, Clone, Default)]
pub struct CombatSession {
    target: Option<EntityId>,
    last_attacker: Option<EntityId>,
    attack_timer: u32,
    cooldown: u32,
    cooldown_active: bool,
    strategy: Option<Strategy>,
    hook: Option<TaskHandle>,
}

impl CombatSession {
    /// An idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity being fought, if the session is active.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Whether the session has a target.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Entity that most recently struck this one.
    #[must_use]
    pub const fn last_attacker(&self) -> Option<EntityId> {
        self.last_attacker
    }

    /// Records who struck this entity.
    pub fn set_last_attacker(&mut self, attacker: Option<EntityId>) {
        self.last_attacker = attacker;
    }

    /// Ticks until the next attack may happen.
    #[must_use]
    pub const fn attack_timer(&self) -> u32 {
        self.attack_timer
    }

    /// Sets the attack timer.
    pub fn set_attack_timer(&mut self, ticks: u32) {
        self.attack_timer = ticks;
    }

    /// Counts the attack timer down by one tick and returns what is left.
    pub fn tick_attack_timer(&mut self) -> u32 {
        self.attack_timer = self.attack_timer.saturating_sub(1);
        self.attack_timer
    }

    /// Remaining forced-inactive cooldown.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Whether the forced-inactive cooldown is running.
    #[must_use]
    pub const fn cooldown_active(&self) -> bool {
        self.cooldown_active
    }

    /// Starts the forced-inactive cooldown.
    pub fn begin_cooldown(&mut self, ticks: u32) {
        self.cooldown = ticks;
        self.cooldown_active = true;
    }

    /// Counts the cooldown down by one tick and returns what is left.
    pub fn tick_cooldown(&mut self) -> u32 {
        self.cooldown = self.cooldown.saturating_sub(1);
        self.cooldown
    }

    /// Restarts a running cooldown from `ticks`. Does nothing when no
    /// cooldown is running.
    pub fn refresh_cooldown(&mut self, ticks: u32) {
        if self.cooldown_active {
            self.cooldown = ticks;
        }
    }

    /// Strategy the session attacks with.
    #[must_use]
    pub const fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Replaces the session strategy.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = Some(strategy);
    }

    /// Handle of the hook task driving this session.
    #[must_use]
    pub fn hook(&self) -> Option<&TaskHandle> {
        self.hook.as_ref()
    }

    /// Whether a hook task is registered and not cancelled.
    #[must_use]
    pub fn has_live_hook(&self) -> bool {
        self.hook.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Clears the fight and cancels the hook task.
    ///
    /// The attack timer and last attacker survive a reset.
    pub fn reset(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook.cancel();
        }
        self.target = None;
        self.strategy = None;
        self.cooldown = 0;
        self.cooldown_active = false;
    }

    fn engage(&mut self, target: EntityId, strategy: Strategy, hook: TaskHandle) {
        self.reset();
        self.target = Some(target);
        self.strategy = Some(strategy);
        self.hook = Some(hook);
    }
}

// =============================================================================
// Session API
// =============================================================================

/// Starts (or retargets) `attacker`'s combat session against `target`.
///
/// A new [`CombatHookTask`] is submitted through `submitter`, which is the
/// scheduler between ticks or the running task's spawner inside one. When
/// the attacker is already fighting `target` with a live hook nothing new is
/// scheduled. The attack timer carries over, so retargeting never grants a
/// free swing.
///
/// # Errors
///
/// [`CombatError::SelfTarget`] when `attacker == target`,
/// [`CombatError::UnknownEntity`] when either id is not registered.
pub fn start_session<S>(
    world: &mut World,
    submitter: &mut S,
    now: u64,
    attacker: EntityId,
    target: EntityId,
) -> Result<(), CombatError>
where
    S: Submit<World>,
{
    if attacker == target {
        return Err(CombatError::SelfTarget(attacker));
    }
    if !world.contains(target) {
        return Err(CombatError::UnknownEntity(target));
    }
    let entity = world
        .get_mut(attacker)
        .ok_or(CombatError::UnknownEntity(attacker))?;

    entity.follow(Some(target));
    entity.face(Facing::Entity(target));

    let session = entity.session();
    if session.target() == Some(target) && session.has_live_hook() {
        tracing::trace!(%attacker, %target, "session already running");
        return Ok(());
    }

    let strategy = Strategy::determine(entity);
    let hook = submitter.submit(CombatHookTask::new(attacker));
    entity.session_mut().engage(target, strategy, hook);

    tracing::debug!(tick = now, %attacker, %target, style = %strategy.style(), "combat session started");
    world.record(CombatEvent::SessionStarted {
        tick: now,
        attacker,
        target,
    });
    Ok(())
}

/// Clears `entity`'s session and cancels its hook.
///
/// # Errors
///
/// [`CombatError::UnknownEntity`] when `entity` is not registered.
pub fn reset_session(
    world: &mut World,
    now: u64,
    entity: EntityId,
    reason: ResetReason,
) -> Result<(), CombatError> {
    let subject = world
        .get_mut(entity)
        .ok_or(CombatError::UnknownEntity(entity))?;
    let had_target = subject.session().is_active();
    subject.session_mut().reset();
    if had_target {
        tracing::debug!(tick = now, %entity, ?reason, "combat session reset");
        world.record(CombatEvent::SessionReset {
            tick: now,
            entity,
            reason,
        });
    }
    Ok(())
}

/// Resets `entity`'s session, clears its facing and stops it following.
///
/// # Errors
///
/// [`CombatError::UnknownEntity`] when `entity` is not registered.
pub fn disengage(
    world: &mut World,
    now: u64,
    entity: EntityId,
    reason: ResetReason,
) -> Result<(), CombatError> {
    reset_session(world, now, entity, reason)?;
    if let Some(subject) = world.get_mut(entity) {
        subject.face(Facing::None);
        subject.follow(None);
    }
    Ok(())
}

/// Puts `entity`'s fight into the forced-inactive cooldown.
///
/// Once the cooldown runs out the session resets on its own. With
/// `reset_attack` the attack timer also restarts from the strategy's
/// recovery. An idle session is left alone.
///
/// # Errors
///
/// [`CombatError::UnknownEntity`] when `entity` is not registered.
pub fn begin_cooldown(
    world: &mut World,
    entity: EntityId,
    reset_attack: bool,
) -> Result<(), CombatError> {
    let ticks = world.config().cooldown_ticks;
    let subject = world
        .get_mut(entity)
        .ok_or(CombatError::UnknownEntity(entity))?;
    if !subject.session().is_active() {
        return Ok(());
    }
    let recovery = subject
        .session()
        .strategy()
        .unwrap_or_else(|| subject.loadout())
        .recovery_ticks();
    let session = subject.session_mut();
    session.begin_cooldown(ticks);
    if reset_attack {
        session.set_attack_timer(recovery);
    }
    tracing::debug!(%entity, ticks, reset_attack, "combat cooldown started");
    Ok(())
}

/// Whether `entity` was struck within the combat window.
///
/// Unknown entities are never under attack.
#[must_use]
pub fn is_being_attacked(world: &World, entity: EntityId, now: u64) -> bool {
    let window = world.config().combat_window_ticks;
    world
        .get(entity)
        .is_some_and(|e| e.is_being_attacked(now, window))
}

/// Who last struck `entity`, if that entity still exists.
#[must_use]
pub fn last_attacker(world: &World, entity: EntityId) -> Option<EntityId> {
    world
        .get(entity)?
        .session()
        .last_attacker()
        .filter(|attacker| world.contains(*attacker))
}
