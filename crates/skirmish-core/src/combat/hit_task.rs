//! Delayed damage application.

use arrayvec::ArrayVec;
use heartbeat::{Cadence, Task, TaskContext, TaskError};

use super::hit::{CombatStyle, Hit, HitOutcome, MAX_SUB_HITS};
use super::session::start_session;
use crate::entity::EntityId;
use crate::event::CombatEvent;
use crate::world::World;

/// One-shot task that lands a resolved attack on its target.
///
/// Whether the target can still be hit is decided when the task fires, not
/// when it is scheduled: a target that died or left the world in between
/// takes nothing.
#[derive(Debug, Clone)]
pub struct HitApplicationTask {
    attacker: EntityId,
    target: EntityId,
    style: CombatStyle,
    hits: ArrayVec<Hit, MAX_SUB_HITS>,
    total_damage: u32,
    delay: u32,
    immediate: bool,
}

impl HitApplicationTask {
    /// Carries `outcome` from `attacker` to `target`, landing after `delay`
    /// ticks or, when `immediate`, in the tick it is scheduled.
    #[must_use]
    pub fn new(
        attacker: EntityId,
        target: EntityId,
        outcome: &HitOutcome,
        delay: u32,
        immediate: bool,
    ) -> Self {
        Self {
            attacker,
            target,
            style: outcome.style(),
            hits: outcome.to_hits(),
            total_damage: outcome.total_damage(),
            delay,
            immediate,
        }
    }

    /// Striking entity.
    #[must_use]
    pub const fn attacker(&self) -> EntityId {
        self.attacker
    }

    /// Entity to be hit.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Attack style.
    #[must_use]
    pub const fn style(&self) -> CombatStyle {
        self.style
    }

    /// Sub-hits to apply.
    #[must_use]
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Sum of sub-hit damage at dispatch.
    #[must_use]
    pub const fn total_damage(&self) -> u32 {
        self.total_damage
    }

    /// Ticks between dispatch and landing.
    #[must_use]
    pub const fn delay(&self) -> u32 {
        self.delay
    }

    /// Lands in the dispatching tick.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        self.immediate
    }
}

impl Task<World> for HitApplicationTask {
    fn name(&self) -> &'static str {
        "hit_application"
    }

    fn cadence(&self) -> Cadence {
        Cadence::once(self.delay).immediately(self.immediate)
    }

    fn run(&mut self, cx: &mut TaskContext<'_, World>) -> Result<(), TaskError> {
        let now = cx.tick();
        let (world, spawner) = cx.parts();

        let Some(victim) = world.get_mut(self.target) else {
            tracing::trace!(tick = now, target = %self.target, "hit target gone");
            return Ok(());
        };
        if victim.is_dead() || victim.is_unregistered() {
            tracing::trace!(tick = now, target = %self.target, "hit target no longer hittable");
            return Ok(());
        }

        let combined = self.hits.len() == MAX_SUB_HITS;
        let dealt = match self.hits.as_slice() {
            &[h0, h1, h2, h3] => victim.apply_quad_damage(h0, h1, h2, h3),
            hits => victim.apply_damage(hits),
        };
        victim.reset_last_combat(now);

        let died = victim.is_dead();
        let retaliates = !died
            && !victim.session().is_active()
            && (victim.is_npc() || victim.auto_retaliates());

        world.record(CombatEvent::DamageApplied {
            tick: now,
            attacker: self.attacker,
            target: self.target,
            dealt,
            sub_hits: self.hits.len(),
            combined,
        });
        if died {
            tracing::debug!(tick = now, entity = %self.target, killer = %self.attacker, "entity died");
            world.record(CombatEvent::Died {
                tick: now,
                entity: self.target,
                killer: self.attacker,
            });
        }

        let attacker_alive = world
            .get(self.attacker)
            .is_some_and(|a| !a.is_dead() && !a.is_unregistered());
        if retaliates && attacker_alive {
            if let Err(error) = start_session(world, spawner, now, self.target, self.attacker) {
                tracing::debug!(tick = now, %error, "retaliation not started");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::entity::{EntityFlags, Hitpoints, NpcProfile, PlayerProfile, Position, Profile};
    use crate::combat::SplatUpdate;
    use heartbeat::{Scheduler, Submit};

    fn setup() -> (World, Scheduler<World>, EntityId, EntityId) {
        let mut world = World::new(&EngineConfig::default());
        let attacker = world.spawn(
            Profile::Player(PlayerProfile::default()),
            Position::new(0, 0, 0),
        );
        let target = world.spawn_with(
            Profile::Npc(NpcProfile::new("Cow", Position::new(1, 0, 0))),
            Position::new(1, 0, 0),
            |e| e.with_hitpoints(Hitpoints::full(30)),
        );
        (world, Scheduler::new(), attacker, target)
    }

    fn outcome(hits: &[u32]) -> HitOutcome {
        HitOutcome::new(CombatStyle::Ranged, hits.iter().copied().map(Hit::new)).unwrap()
    }

    #[test]
    fn lands_after_delay() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[5]), 2, false));

        scheduler.tick(&mut world);
        assert_eq!(world.get(t).unwrap().hitpoints().current, 30);
        scheduler.tick(&mut world);
        assert_eq!(world.get(t).unwrap().hitpoints().current, 25);
        assert_eq!(world.get(t).unwrap().splats().len(), 1);
    }

    #[test]
    fn quad_is_one_combined_update() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[1, 2, 3, 4]), 1, false));
        scheduler.tick(&mut world);

        let splats = world.get_mut(t).unwrap().take_splats();
        assert_eq!(splats.len(), 1);
        assert!(matches!(splats[0], SplatUpdate::Quad(_)));
        assert!(world.events().iter().any(|e| matches!(
            e,
            CombatEvent::DamageApplied { dealt: 10, sub_hits: 4, combined: true, .. }
        )));
    }

    #[test]
    fn discrete_hits_are_separate_updates() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[1, 2, 3]), 1, false));
        scheduler.tick(&mut world);
        assert_eq!(world.get(t).unwrap().splats().len(), 3);
    }

    #[test]
    fn skipped_when_target_died_before_landing() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[5]), 2, false));
        scheduler.tick(&mut world);
        world
            .get_mut(t)
            .unwrap()
            .set_hitpoints(Hitpoints { current: 0, max: 30 });
        scheduler.tick(&mut world);

        assert!(world.get(t).unwrap().splats().is_empty());
        assert!(world.events().is_empty());
    }

    #[test]
    fn skipped_when_target_unregistered_or_gone() {
        let (mut world, mut scheduler, a, t) = setup();
        world
            .get_mut(t)
            .unwrap()
            .set_flag(EntityFlags::UNREGISTERED, true);
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[5]), 1, false));
        scheduler.tick(&mut world);
        assert_eq!(world.get(t).unwrap().hitpoints().current, 30);

        world.despawn(t);
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[5]), 1, false));
        scheduler.tick(&mut world);
        assert!(world.events().is_empty());
    }

    #[test]
    fn lethal_hit_records_death_and_no_retaliation() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[20, 20]), 1, false));
        scheduler.tick(&mut world);

        let victim = world.get(t).unwrap();
        assert!(victim.is_dead());
        assert!(!victim.session().is_active());
        assert!(world
            .events()
            .contains(&CombatEvent::Died { tick: 1, entity: t, killer: a }));
    }

    #[test]
    fn passive_npc_fights_back() {
        let (mut world, mut scheduler, a, t) = setup();
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[1]), 1, false));
        scheduler.tick(&mut world);

        let victim = world.get(t).unwrap();
        assert_eq!(victim.session().target(), Some(a));
        assert_eq!(victim.last_combat(), Some(1));
        assert_eq!(scheduler.pending_len(), 1, "retaliation hook waits for next tick");
    }

    #[test]
    fn player_without_auto_retaliate_stays_passive() {
        let mut world = World::new(&EngineConfig::default());
        let mut scheduler = Scheduler::new();
        let a = world.spawn(Profile::Player(PlayerProfile::default()), Position::default());
        let t = world.spawn_with(
            Profile::Player(PlayerProfile::default()),
            Position::new(1, 0, 0),
            |e| e.with_flags(EntityFlags::empty()),
        );
        scheduler.submit(HitApplicationTask::new(a, t, &outcome(&[1]), 1, false));
        scheduler.tick(&mut world);
        assert!(!world.get(t).unwrap().session().is_active());
        assert!(scheduler.is_empty());
    }
}
