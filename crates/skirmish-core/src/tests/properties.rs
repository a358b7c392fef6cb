//! Property tests over session timers and hook scheduling.

use proptest::prelude::*;

use crate::combat::CombatSession;
use crate::entity::{NpcProfile, Position};
use crate::event::CombatEvent;

use super::helpers::{dispatch_ticks, melee, run_ticks, seeded_engine, spawn_npc_with, spawn_passive_player};

#[derive(Debug, Clone)]
enum TimerOp {
    SetAttack(u32),
    TickAttack,
    BeginCooldown(u32),
    RefreshCooldown(u32),
    TickCooldown,
    Reset,
}

fn timer_op() -> impl Strategy<Value = TimerOp> {
    prop_oneof![
        (0u32..20).prop_map(TimerOp::SetAttack),
        Just(TimerOp::TickAttack),
        (0u32..20).prop_map(TimerOp::BeginCooldown),
        (0u32..20).prop_map(TimerOp::RefreshCooldown),
        Just(TimerOp::TickCooldown),
        Just(TimerOp::Reset),
    ]
}

proptest! {
    #[test]
    fn session_counters_never_underflow(ops in prop::collection::vec(timer_op(), 0..200)) {
        let mut session = CombatSession::new();
        let mut attack_ceiling = 0;
        let mut cooldown_ceiling = 0;
        for op in ops {
            match op {
                TimerOp::SetAttack(ticks) => {
                    session.set_attack_timer(ticks);
                    attack_ceiling = ticks;
                }
                TimerOp::TickAttack => {
                    let before = session.attack_timer();
                    let after = session.tick_attack_timer();
                    prop_assert_eq!(after, before.saturating_sub(1));
                }
                TimerOp::BeginCooldown(ticks) => {
                    session.begin_cooldown(ticks);
                    cooldown_ceiling = ticks;
                    prop_assert!(session.cooldown_active());
                }
                TimerOp::RefreshCooldown(ticks) => {
                    let active = session.cooldown_active();
                    let before = session.cooldown();
                    session.refresh_cooldown(ticks);
                    if active {
                        cooldown_ceiling = ticks;
                        prop_assert_eq!(session.cooldown(), ticks);
                    } else {
                        prop_assert_eq!(session.cooldown(), before);
                    }
                }
                TimerOp::TickCooldown => {
                    let before = session.cooldown();
                    prop_assert_eq!(session.tick_cooldown(), before.saturating_sub(1));
                }
                TimerOp::Reset => {
                    session.reset();
                    cooldown_ceiling = 0;
                    prop_assert!(!session.is_active());
                    prop_assert!(!session.cooldown_active());
                }
            }
            prop_assert!(session.attack_timer() <= attack_ceiling);
            prop_assert!(session.cooldown() <= cooldown_ceiling);
        }
    }

    #[test]
    fn at_most_one_dispatch_per_recovery_window(
        speed in 1u32..8,
        sub_hits in 1u8..=4,
        distance in 1i32..=3,
        seed in any::<u64>(),
    ) {
        let mut engine = seeded_engine(seed);
        let attacker = spawn_npc_with(
            &mut engine,
            NpcProfile::new("Attacker", Position::new(0, 0, 0)),
            melee(10, speed, sub_hits),
        );
        let target = spawn_npc_with(
            &mut engine,
            NpcProfile::new("Target", Position::new(distance, 0, 0)),
            melee(10, 4, 1),
        );

        engine.start_session(attacker, target).unwrap();
        run_ticks(&mut engine, 40);

        let ticks = dispatch_ticks(engine.world().events(), attacker);
        if distance == 1 {
            prop_assert!(!ticks.is_empty());
        } else {
            prop_assert!(ticks.is_empty());
        }
        for pair in ticks.windows(2) {
            prop_assert!(pair[1] - pair[0] >= u64::from(speed));
        }
    }

    #[test]
    fn reset_hook_never_fires_again(reset_at in 0usize..30, seed in any::<u64>()) {
        let mut engine = seeded_engine(seed);
        let player = spawn_passive_player(&mut engine, 0, 0);
        let npc = spawn_npc_with(
            &mut engine,
            NpcProfile::new("Target", Position::new(1, 0, 0)),
            melee(3, 4, 1),
        );

        engine.start_session(player, npc).unwrap();
        run_ticks(&mut engine, reset_at);
        let handle = engine.world().get(player).unwrap().session().hook().cloned();
        engine.reset_session(player).unwrap();
        let reset_tick = engine.current_tick();
        run_ticks(&mut engine, 20);

        prop_assert!(handle.is_some_and(|h| h.is_cancelled()));
        let events = engine.world().events();
        prop_assert!(dispatch_ticks(events, player).iter().all(|t| *t <= reset_tick));
        let restarted = events.iter().any(|e| matches!(
            e,
            CombatEvent::SessionStarted { tick, attacker, .. } if *attacker == player && *tick > reset_tick
        ));
        prop_assert!(!restarted);
    }
}
