//! Engine configuration.
//!
//! Everything tunable about the combat core lives here. Defaults reproduce
//! the classic 600 ms tick and its combat constants, so `EngineConfig::default()`
//! is a playable world with no zones.

use serde::{Deserialize, Serialize};

use crate::combat::CombatStyle;
use crate::error::ConfigError;
use crate::zone::Zone;

/// Combat constants, in ticks and tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Forced-inactive cooldown length after a fight winds down.
    pub cooldown_ticks: u32,
    /// Ticks after a hit during which the victim counts as being attacked.
    pub combat_window_ticks: u32,
    /// NPCs that retreat give up once farther than this from their origin.
    pub retreat_radius: i32,
    /// Extra range granted to a running attacker whose movement is not locked.
    pub run_range_bonus: i32,
    /// A player's protection prayer negates another player's hit one time in `n`.
    pub pvp_negation_one_in: u32,
    /// Players may only fight players inside the wilderness.
    pub pvp_requires_wilderness: bool,
    /// Apply the one-attacker-at-a-time rule to NPC attackers too.
    pub single_combat_for_npcs: bool,
    /// Ticks before a melee hit lands.
    pub melee_hit_delay: u32,
    /// Ticks before a ranged hit lands.
    pub ranged_hit_delay: u32,
    /// Ticks before a magic hit lands.
    pub magic_hit_delay: u32,
    /// Melee hits land in the tick they are dispatched.
    pub melee_lands_same_tick: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: 10,
            combat_window_ticks: 8,
            retreat_radius: 5,
            run_range_bonus: 3,
            pvp_negation_one_in: 4,
            pvp_requires_wilderness: true,
            single_combat_for_npcs: false,
            melee_hit_delay: 1,
            ranged_hit_delay: 2,
            magic_hit_delay: 3,
            melee_lands_same_tick: true,
        }
    }
}

impl CombatConfig {
    /// Delay before a hit of `style` is applied.
    #[must_use]
    pub const fn hit_delay(&self, style: CombatStyle) -> u32 {
        match style {
            CombatStyle::Melee => self.melee_hit_delay,
            CombatStyle::Ranged => self.ranged_hit_delay,
            CombatStyle::Magic => self.magic_hit_delay,
        }
    }

    /// Whether a hit of `style` is applied in the tick it is dispatched.
    #[must_use]
    pub const fn lands_same_tick(&self, style: CombatStyle) -> bool {
        matches!(style, CombatStyle::Melee) && self.melee_lands_same_tick
    }
}

/// Top-level configuration for an [`Engine`](crate::engine::Engine).
///
/// # Example
///
/// ```
/// use skirmish_core::config::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "seed": 7, "combat": { "cooldown_ticks": 12 } }"#)
///     .unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.combat.cooldown_ticks, 12);
/// assert_eq!(config.tick_millis, 600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock length of one tick.
    pub tick_millis: u64,
    /// Seed for the world's random source.
    pub seed: u64,
    /// Combat constants.
    pub combat: CombatConfig,
    /// Wilderness and multi-combat areas.
    pub zones: Vec<Zone>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_millis: 600,
            seed: 0,
            combat: CombatConfig::default(),
            zones: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::Invalid`]
    /// when validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let combat = &self.combat;
        let checks = [
            (self.tick_millis == 0, "tick_millis must be positive"),
            (
                combat.pvp_negation_one_in == 0,
                "combat.pvp_negation_one_in must be positive",
            ),
            (combat.melee_hit_delay == 0, "combat.melee_hit_delay must be positive"),
            (combat.ranged_hit_delay == 0, "combat.ranged_hit_delay must be positive"),
            (combat.magic_hit_delay == 0, "combat.magic_hit_delay must be positive"),
            (combat.retreat_radius < 0, "combat.retreat_radius must not be negative"),
            (combat.run_range_bonus < 0, "combat.run_range_bonus must not be negative"),
        ];
        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(ConfigError::Invalid((*message).to_string())),
            None => Ok(()),
        }
    }
}
