//! The combat hook: one tick of a fight.
//!
//! [`CombatHookTask`] fires every tick while its session is active and walks
//! a fixed list of checks. Each check may let evaluation continue, end this
//! tick (`Yield`), or end the session's hook for good (`Terminate`). The
//! order matters and is part of the contract:
//!
//! 1. cooldown
//! 2. target validity
//! 3. engagement legality
//! 4. retreat
//! 5. liveness
//! 6. attack timer
//! 7. range
//! 8. strategy precondition
//! 9. hit computation
//! 10. mitigation
//! 11. damage aggregation
//! 12. dispatch
//! 13. re-arm

use heartbeat::{Cadence, Spawner, Submit, Task, TaskContext, TaskError};

use super::hit_task::HitApplicationTask;
use super::mitigation::mitigate;
use super::session::{disengage, reset_session};
use super::strategy::Strategy;
use crate::entity::{EntityId, Facing};
use crate::error::CombatError;
use crate::event::{CombatEvent, Refusal, ResetReason};
use crate::notify::{ALREADY_UNDER_ATTACK, TARGET_ALREADY_UNDER_ATTACK, TARGET_NOT_IN_WILDERNESS};
use crate::world::World;

/// Repeating task driving one entity's combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatHookTask {
    attacker: EntityId,
}

impl CombatHookTask {
    /// A hook for `attacker`'s session.
    #[must_use]
    pub const fn new(attacker: EntityId) -> Self {
        Self { attacker }
    }

    /// Owner of the session.
    #[must_use]
    pub const fn attacker(&self) -> EntityId {
        self.attacker
    }
}

impl Task<World> for CombatHookTask {
    fn name(&self) -> &'static str {
        "combat_hook"
    }

    fn cadence(&self) -> Cadence {
        Cadence::every(1)
    }

    fn run(&mut self, cx: &mut TaskContext<'_, World>) -> Result<(), TaskError> {
        let now = cx.tick();
        let (world, spawner) = cx.parts();
        let outcome = Hook {
            world,
            spawner,
            attacker: self.attacker,
            now,
        }
        .evaluate();

        match outcome {
            Ok(Flow::Terminate) => {
                cx.cancel();
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(error) => {
                if let Err(reset) = reset_session(cx.state, now, self.attacker, ResetReason::Invariant) {
                    tracing::debug!(tick = now, %reset, "session already gone");
                }
                cx.cancel();
                Err(error.into())
            }
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Go on to the next check.
    Proceed,
    /// Nothing more this tick.
    Yield,
    /// Stop the hook.
    Terminate,
}

/// Runs `$check` and returns from the enclosing function unless it proceeds.
macro_rules! check {
    ($check:expr) => {
        match $check {
            Flow::Proceed => {}
            flow => return Ok(flow),
        }
    };
}

/// One evaluation of a hook, borrowing the world for the duration of a tick.
struct Hook<'a> {
    world: &'a mut World,
    spawner: &'a mut Spawner<World>,
    attacker: EntityId,
    now: u64,
}

impl Hook<'_> {
    fn evaluate(&mut self) -> Result<Flow, CombatError> {
        check!(self.cooldown());
        let target = self.target()?;
        check!(self.target_validity(target));
        self.refresh_strategy();
        check!(self.engagement(target));
        check!(self.retreat(target));
        check!(self.liveness(target));
        check!(self.countdown());
        check!(self.in_range(target));
        Ok(self.strike(target))
    }

    // -------------------------------------------------------------------------
    // 1. Cooldown
    // -------------------------------------------------------------------------

    fn cooldown(&mut self) -> Flow {
        let Some(attacker) = self.world.get_mut(self.attacker) else {
            return Flow::Terminate;
        };
        if !attacker.session().cooldown_active() {
            return Flow::Proceed;
        }
        let retaliates = attacker.auto_retaliates();
        if attacker.session_mut().tick_cooldown() == 0 {
            self.reset(ResetReason::CooldownExpired);
            return Flow::Terminate;
        }
        if retaliates {
            Flow::Proceed
        } else {
            Flow::Yield
        }
    }

    fn target(&self) -> Result<EntityId, CombatError> {
        self.world
            .get(self.attacker)
            .and_then(|a| a.session().target())
            .ok_or(CombatError::NoTarget(self.attacker))
    }

    // -------------------------------------------------------------------------
    // 2. Target validity
    // -------------------------------------------------------------------------

    fn target_validity(&mut self, target: EntityId) -> Flow {
        let Some(victim) = self.world.get(target) else {
            self.disengage(ResetReason::TargetUnreachable);
            return Flow::Terminate;
        };
        if victim.is_teleporting() {
            self.disengage(ResetReason::TargetUnreachable);
            return Flow::Terminate;
        }

        let both_players = victim.is_player() && self.is_player(self.attacker);
        let outside_wilderness = !self.world.zones().in_wilderness(victim.position());
        if both_players && self.world.config().pvp_requires_wilderness && outside_wilderness {
            self.world.notify(self.attacker, TARGET_NOT_IN_WILDERNESS);
            self.disengage(ResetReason::TargetLeftWilderness);
            return Flow::Terminate;
        }
        Flow::Proceed
    }

    /// Players fight with whatever they hold right now; NPCs keep the
    /// strategy captured when the session started.
    fn refresh_strategy(&mut self) {
        if let Some(attacker) = self.world.get_mut(self.attacker) {
            if attacker.is_player() {
                let strategy = Strategy::determine(attacker);
                attacker.session_mut().set_strategy(strategy);
            }
        }
    }

    // -------------------------------------------------------------------------
    // 3. Engagement legality
    // -------------------------------------------------------------------------

    fn engagement(&mut self, target: EntityId) -> Flow {
        let (Some(attacker), Some(victim)) = (self.world.get(self.attacker), self.world.get(target))
        else {
            return Flow::Proceed;
        };
        if attacker.is_npc() && !self.world.config().single_combat_for_npcs {
            return Flow::Proceed;
        }

        let zones = self.world.zones();
        let window = self.world.config().combat_window_ticks;
        let attacker_busy = !zones.in_multi_combat(attacker.position())
            && attacker.is_being_attacked(self.now, window)
            && attacker.session().last_attacker() != Some(target);
        let target_busy = !zones.in_multi_combat(victim.position())
            && victim.is_being_attacked(self.now, window)
            && victim.session().last_attacker() != Some(self.attacker);

        let refusal = if attacker_busy {
            Refusal::AttackerBusy
        } else if target_busy {
            Refusal::TargetBusy
        } else {
            return Flow::Proceed;
        };

        if attacker.is_player() {
            let message = match refusal {
                Refusal::AttackerBusy => ALREADY_UNDER_ATTACK,
                Refusal::TargetBusy => TARGET_ALREADY_UNDER_ATTACK,
            };
            self.world.notify(self.attacker, message);
        }
        tracing::debug!(tick = self.now, attacker = %self.attacker, %target, ?refusal, "engagement refused");
        self.world.record(CombatEvent::EngagementRefused {
            tick: self.now,
            attacker: self.attacker,
            target,
            refusal,
        });
        self.disengage(ResetReason::Engagement);
        Flow::Terminate
    }

    // -------------------------------------------------------------------------
    // 4. Retreat
    // -------------------------------------------------------------------------

    fn retreat(&mut self, target: EntityId) -> Flow {
        let config = *self.world.config();
        let (Some(attacker), Some(victim)) = (self.world.get(self.attacker), self.world.get(target))
        else {
            return Flow::Proceed;
        };
        let Some(npc) = attacker.as_npc() else {
            return Flow::Proceed;
        };
        if !npc.retreats || attacker.position().within_distance(npc.origin, config.retreat_radius) {
            return Flow::Proceed;
        }
        let target_passive = victim.session().cooldown_active()
            || !victim.is_being_attacked(self.now, config.combat_window_ticks);
        if !target_passive {
            return Flow::Proceed;
        }

        let origin = npc.origin;
        self.disengage(ResetReason::Retreat);
        if let Some(attacker) = self.world.get_mut(self.attacker) {
            attacker.walk_to(origin);
        }
        tracing::debug!(tick = self.now, entity = %self.attacker, "npc retreating");
        self.world.record(CombatEvent::Retreated {
            tick: self.now,
            entity: self.attacker,
        });
        Flow::Terminate
    }

    // -------------------------------------------------------------------------
    // 5. Liveness
    // -------------------------------------------------------------------------

    fn liveness(&mut self, target: EntityId) -> Flow {
        let (Some(attacker), Some(victim)) = (self.world.get(self.attacker), self.world.get(target))
        else {
            return Flow::Terminate;
        };
        if attacker.is_unregistered() || victim.is_unregistered() {
            self.reset(ResetReason::Unregistered);
            return Flow::Terminate;
        }
        if attacker.is_dead() {
            return Flow::Terminate;
        }
        if victim.is_dead() {
            self.disengage(ResetReason::TargetDied);
            return Flow::Terminate;
        }
        Flow::Proceed
    }

    // -------------------------------------------------------------------------
    // 6. Attack timer
    // -------------------------------------------------------------------------

    fn countdown(&mut self) -> Flow {
        let Some(attacker) = self.world.get_mut(self.attacker) else {
            return Flow::Terminate;
        };
        if attacker.session_mut().tick_attack_timer() > 0 {
            Flow::Yield
        } else {
            Flow::Proceed
        }
    }

    // -------------------------------------------------------------------------
    // 7. Range
    // -------------------------------------------------------------------------

    fn in_range(&self, target: EntityId) -> Flow {
        let (Some(attacker), Some(victim)) = (self.world.get(self.attacker), self.world.get(target))
        else {
            return Flow::Terminate;
        };
        let mut distance = self.strategy().required_distance();
        if attacker.is_running() && !attacker.is_movement_locked() {
            distance += self.world.config().run_range_bonus;
        }
        if attacker.position().within_distance(victim.position(), distance) {
            Flow::Proceed
        } else {
            Flow::Yield
        }
    }

    // -------------------------------------------------------------------------
    // 8-13. Strike
    // -------------------------------------------------------------------------

    fn strike(&mut self, target: EntityId) -> Flow {
        let strategy = self.strategy();
        let config = *self.world.config();

        // 8
        let prepared = self
            .world
            .get_mut(self.attacker)
            .is_some_and(|attacker| strategy.prepare_attack(attacker));
        if !prepared {
            self.disengage(ResetReason::StrategyDeclined);
            return Flow::Terminate;
        }

        // 9, 10
        let Some((attacker, victim, rng)) = self.world.combatants(self.attacker, target) else {
            return Flow::Terminate;
        };
        let outcome = strategy.attack(attacker, victim, rng).map(|mut outcome| {
            let negated = mitigate(attacker, victim, &mut outcome, &config, rng);
            (outcome, negated)
        });

        if let Some((outcome, negated)) = outcome {
            if negated {
                self.world.record(CombatEvent::Negated {
                    tick: self.now,
                    attacker: self.attacker,
                    target,
                    style: outcome.style(),
                });
            }

            // 11, 12
            let style = outcome.style();
            let delay = config.hit_delay(style);
            let immediate = config.lands_same_tick(style);
            let total = outcome.total_damage();
            self.spawner.submit(HitApplicationTask::new(
                self.attacker,
                target,
                &outcome,
                delay,
                immediate,
            ));
            tracing::debug!(
                tick = self.now,
                attacker = %self.attacker,
                %target,
                %style,
                total,
                delay,
                "hit dispatched"
            );
            self.world.record(CombatEvent::HitDispatched {
                tick: self.now,
                attacker: self.attacker,
                target,
                style,
                sub_hits: outcome.hits().len(),
                total,
                delay,
                immediate,
            });
        }

        // 13
        self.rearm(target, strategy.recovery_ticks(), config.cooldown_ticks);
        Flow::Yield
    }

    fn rearm(&mut self, target: EntityId, recovery: u32, cooldown_ticks: u32) {
        let now = self.now;
        let Some(victim) = self.world.get_mut(target) else {
            return;
        };
        victim.session_mut().set_last_attacker(Some(self.attacker));
        victim.reset_last_combat(now);
        victim.session_mut().refresh_cooldown(cooldown_ticks);
        let facing = Facing::Position(victim.position());

        if let Some(attacker) = self.world.get_mut(self.attacker) {
            attacker.session_mut().set_attack_timer(recovery);
            attacker.reset_last_fight(now);
            attacker.face(facing);
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn strategy(&self) -> Strategy {
        self.world
            .get(self.attacker)
            .map(|a| a.session().strategy().unwrap_or_else(|| a.loadout()))
            .unwrap_or_default()
    }

    fn is_player(&self, id: EntityId) -> bool {
        self.world.get(id).is_some_and(|e| e.is_player())
    }

    fn reset(&mut self, reason: ResetReason) {
        if let Err(error) = reset_session(self.world, self.now, self.attacker, reason) {
            tracing::debug!(tick = self.now, %error, ?reason, "reset skipped");
        }
    }

    fn disengage(&mut self, reason: ResetReason) {
        if let Err(error) = disengage(self.world, self.now, self.attacker, reason) {
            tracing::debug!(tick = self.now, %error, ?reason, "disengage skipped");
        }
    }
}
