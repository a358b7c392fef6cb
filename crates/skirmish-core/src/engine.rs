//! The engine: scheduler, world and command queue behind one facade.
//!
//! One tick of the engine:
//!
//! 1. **COMMANDS**: drain commands submitted from other threads and apply them
//! 2. **SCHEDULE**: run one scheduler pass (combat hooks, hit applications)
//!
//! [`Engine::step`] and [`Engine::run_with`] also drain the journal and
//! pending hit splats into a [`TickFrame`] after every tick. Plain
//! [`Engine::tick`] leaves them in the world until `take_events` and
//! `World::take_splats` are called.
//!
//! Nothing in a tick returns an error to the caller. Rejected commands and
//! failing tasks are logged and the tick carries on.
//!
//! # Example
//!
//! ```
//! use skirmish_core::engine::Engine;
//! use skirmish_core::entity::{NpcProfile, Position};
//!
//! let mut engine = Engine::default();
//! let hero = engine.spawn_player("Hero", Position::new(3200, 3200, 0));
//! let rat = engine.spawn_npc(NpcProfile::new("Rat", Position::new(3201, 3200, 0)));
//!
//! engine.start_session(hero, rat).unwrap();
//! engine.tick();
//!
//! assert_eq!(engine.last_attacker(rat), Some(hero));
//! assert!(engine.is_being_attacked(rat));
//! ```

use std::sync::atomic::AtomicBool;

use heartbeat::{Scheduler, TickLoop, TickSummary};

use crate::combat::{self, SplatUpdate};
use crate::command::{Command, CommandQueue, CommandSender};
use crate::config::EngineConfig;
use crate::entity::{Entity, EntityFlags, EntityId, NpcProfile, PlayerProfile, Position, Profile};
use crate::error::{CombatError, ConfigError};
use crate::event::{CombatEvent, ResetReason};
use crate::notify::Notifier;
use crate::world::World;

/// Everything one tick produced, drained from the world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickFrame {
    /// Scheduler counters for the tick.
    pub summary: TickSummary,
    /// Journal entries recorded during the tick.
    pub events: Vec<CombatEvent>,
    /// Hit splats to send to clients, per entity.
    pub splats: Vec<(EntityId, Vec<SplatUpdate>)>,
}

/// Tick-driven combat engine.
#[derive(Debug)]
pub struct Engine {
    scheduler: Scheduler<World>,
    world: World,
    commands: CommandQueue,
    tick_loop: TickLoop,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl Engine {
    /// Builds an engine from validated configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when `config` fails validation.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: &EngineConfig) -> Self {
        tracing::debug!(seed = config.seed, tick_millis = config.tick_millis, "engine created");
        Self {
            scheduler: Scheduler::new(),
            world: World::new(config),
            commands: CommandQueue::new(),
            tick_loop: TickLoop::from_millis(config.tick_millis),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Shared simulation state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable simulation state.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The task scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<World> {
        &self.scheduler
    }

    /// Last tick processed.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// A sender other threads can use to queue commands.
    #[must_use]
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Replaces the player notifier.
    pub fn set_notifier<N>(&mut self, notifier: N)
    where
        N: Notifier + 'static,
    {
        self.world.set_notifier(notifier);
    }

    /// Drains the combat journal.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        self.world.take_events()
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawns a player with default components.
    pub fn spawn_player(&mut self, name: impl Into<String>, position: Position) -> EntityId {
        let profile = PlayerProfile { name: name.into() };
        self.world.spawn(Profile::Player(profile), position)
    }

    /// Spawns an NPC at its origin.
    pub fn spawn_npc(&mut self, profile: NpcProfile) -> EntityId {
        let origin = profile.origin;
        self.world.spawn(Profile::Npc(profile), origin)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Starts `attacker`'s fight against `target`; its first hook runs next tick.
    ///
    /// # Errors
    ///
    /// See [`combat::start_session`].
    pub fn start_session(&mut self, attacker: EntityId, target: EntityId) -> Result<(), CombatError> {
        let now = self.current_tick();
        combat::start_session(&mut self.world, &mut self.scheduler, now, attacker, target)
    }

    /// Clears `entity`'s fight.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownEntity`] when `entity` is not registered.
    pub fn reset_session(&mut self, entity: EntityId) -> Result<(), CombatError> {
        let now = self.current_tick();
        combat::reset_session(&mut self.world, now, entity, ResetReason::Requested)
    }

    /// Clears `entity`'s fight, facing and follow target.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownEntity`] when `entity` is not registered.
    pub fn disengage(&mut self, entity: EntityId) -> Result<(), CombatError> {
        let now = self.current_tick();
        combat::disengage(&mut self.world, now, entity, ResetReason::Requested)
    }

    /// Lets `entity`'s fight wind down through the cooldown.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownEntity`] when `entity` is not registered.
    pub fn begin_cooldown(&mut self, entity: EntityId, reset_attack: bool) -> Result<(), CombatError> {
        combat::begin_cooldown(&mut self.world, entity, reset_attack)
    }

    /// Whether `entity` was struck within the combat window.
    #[must_use]
    pub fn is_being_attacked(&self, entity: EntityId) -> bool {
        combat::is_being_attacked(&self.world, entity, self.current_tick())
    }

    /// Who last struck `entity`, if that entity still exists.
    #[must_use]
    pub fn last_attacker(&self, entity: EntityId) -> Option<EntityId> {
        combat::last_attacker(&self.world, entity)
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Runs one tick.
    pub fn tick(&mut self) -> TickSummary {
        for command in self.commands.drain() {
            self.apply(command);
        }
        self.scheduler.tick(&mut self.world)
    }

    /// Runs one tick and drains what it produced: journal events and hit
    /// splats. Nothing is retained between steps.
    pub fn step(&mut self) -> TickFrame {
        let summary = self.tick();
        TickFrame {
            summary,
            events: self.world.take_events(),
            splats: self.world.take_splats(),
        }
    }

    /// Ticks at the configured period until `stop` is raised, handing each
    /// tick's output to `sink`. Returns the number of ticks run.
    pub fn run_with<F>(&mut self, stop: &AtomicBool, mut sink: F) -> u64
    where
        F: FnMut(TickFrame),
    {
        let tick_loop = self.tick_loop;
        tracing::info!(period = ?tick_loop.period(), "engine running");
        let ticks = tick_loop.run(stop, || sink(self.step()));
        tracing::info!(ticks, "engine stopped");
        ticks
    }

    /// [`run_with`](Self::run_with) with the per-tick output dropped.
    pub fn run(&mut self, stop: &AtomicBool) -> u64 {
        self.run_with(stop, drop)
    }

    fn apply(&mut self, command: Command) {
        let subject = command.subject();
        let now = self.current_tick();
        let result = match command {
            Command::StartSession { attacker, target } => self.start_session(attacker, target),
            Command::ResetSession { entity } => self.reset_session(entity),
            Command::Disengage { entity } => self.disengage(entity),
            Command::BeginCooldown {
                entity,
                reset_attack,
            } => self.begin_cooldown(entity, reset_attack),
            Command::SetPosition { entity, position } => {
                self.with_entity(entity, |e| e.set_position(position))
            }
            Command::SetTeleporting {
                entity,
                teleporting,
            } => self.with_entity(entity, |e| e.set_flag(EntityFlags::TELEPORTING, teleporting)),
            Command::SetRunning { entity, running } => {
                self.with_entity(entity, |e| e.set_flag(EntityFlags::RUNNING, running))
            }
            Command::SetAutoRetaliate { entity, enabled } => {
                self.with_entity(entity, |e| e.set_flag(EntityFlags::AUTO_RETALIATE, enabled))
            }
            Command::SetProtection { entity, protection } => {
                self.with_entity(entity, |e| e.set_protection(protection))
            }
            Command::Unregister { entity } => {
                self.with_entity(entity, |e| e.set_flag(EntityFlags::UNREGISTERED, true))
            }
            Command::Despawn { entity } => self
                .world
                .despawn(entity)
                .map(|_| ())
                .ok_or(CombatError::UnknownEntity(entity)),
        };
        if let Err(error) = result {
            tracing::warn!(tick = now, entity = %subject, %error, "command rejected");
        }
    }

    fn with_entity<F>(&mut self, id: EntityId, f: F) -> Result<(), CombatError>
    where
        F: FnOnce(&mut Entity),
    {
        let entity = self
            .world
            .get_mut(id)
            .ok_or(CombatError::UnknownEntity(id))?;
        f(entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Melee, Strategy};
    use std::sync::atomic::Ordering;

    #[test]
    fn from_config_validates() {
        let config = EngineConfig {
            tick_millis: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::from_config(&config).is_err());
        assert!(Engine::from_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn commands_apply_at_start_of_tick() {
        let mut engine = Engine::default();
        let a = engine.spawn_player("A", Position::new(0, 0, 0));
        let b = engine.spawn_npc(NpcProfile::new("B", Position::new(1, 0, 0)));
        let sender = engine.command_sender();
        sender
            .send(Command::SetRunning {
                entity: a,
                running: true,
            })
            .unwrap();
        sender
            .send(Command::StartSession {
                attacker: a,
                target: b,
            })
            .unwrap();
        assert!(!engine.world().get(a).unwrap().is_running());

        engine.tick();
        assert!(engine.world().get(a).unwrap().is_running());
        assert_eq!(engine.world().get(a).unwrap().session().target(), Some(b));
        assert_eq!(engine.scheduler().active_len(), 1);
    }

    #[test]
    fn bad_commands_are_logged_not_fatal() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut engine = Engine::default();
        let sender = engine.command_sender();
        sender
            .send(Command::Despawn {
                entity: EntityId::new(77),
            })
            .unwrap();
        let summary = engine.tick();
        assert_eq!(summary.tick, 1);
    }

    #[test]
    fn run_stops_on_flag() {
        let config = EngineConfig {
            tick_millis: 1,
            ..EngineConfig::default()
        };
        let mut engine = Engine::from_config(&config).unwrap();
        let stop = AtomicBool::new(true);
        assert_eq!(engine.run(&stop), 0);

        stop.store(false, Ordering::Release);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(std::time::Duration::from_millis(10));
                stop.store(true, Ordering::Release);
            });
            assert!(engine.run(&stop) > 0);
        });
        assert!(engine.current_tick() > 0);
    }

    fn sparring_pair(engine: &mut Engine) -> (EntityId, EntityId) {
        let flurry = Strategy::Melee(Melee {
            max_hit: 0,
            speed: 1,
            sub_hits: 4,
        });
        let spawn = |engine: &mut Engine, x| {
            engine.world_mut().spawn_with(
                Profile::Npc(NpcProfile::new("Sparrer", Position::new(x, 0, 0))),
                Position::new(x, 0, 0),
                |e| e.with_loadout(flurry),
            )
        };
        let a = spawn(engine, 0);
        let b = spawn(engine, 1);
        engine.start_session(a, b).unwrap();
        (a, b)
    }

    #[test]
    fn step_retains_nothing_between_ticks() {
        let mut engine = Engine::default();
        let (a, b) = sparring_pair(&mut engine);
        engine.take_events();

        let mut delivered = 0;
        for _ in 0..2_000 {
            let frame = engine.step();
            delivered += frame.events.len();
            assert!(engine.world().events().is_empty());
            assert!(engine.world().get(a).unwrap().splats().is_empty());
            assert!(engine.world().get(b).unwrap().splats().is_empty());
        }
        assert!(delivered >= 2_000);
    }

    #[test]
    fn step_reports_splats_per_entity() {
        let mut engine = Engine::default();
        let (_, b) = sparring_pair(&mut engine);

        let frame = engine.step();
        assert_eq!(frame.summary.tick, 1);
        assert!(frame
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::SessionStarted { .. })));
        assert_eq!(frame.splats.len(), 1);
        assert_eq!(frame.splats[0].0, b);
        assert!(matches!(frame.splats[0].1[..], [SplatUpdate::Quad(_)]));
    }

    #[test]
    fn run_with_drains_every_tick() {
        let config = EngineConfig {
            tick_millis: 1,
            ..EngineConfig::default()
        };
        let mut engine = Engine::from_config(&config).unwrap();
        sparring_pair(&mut engine);
        let stop = AtomicBool::new(false);
        let mut frames = 0u64;
        let mut events = 0;

        std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(std::time::Duration::from_millis(20));
                stop.store(true, Ordering::Release);
            });
            let ticks = engine.run_with(&stop, |frame| {
                frames += 1;
                events += frame.events.len();
            });
            assert_eq!(ticks, frames);
        });

        assert!(events > 0);
        assert!(engine.world().events().is_empty());
        assert!(engine.world().entities().all(|e| e.splats().is_empty()));
    }
}
