//! Protection-prayer mitigation.
//!
//! A player praying against the style of an incoming attack has the whole
//! attack zeroed:
//!
//! | Attacker | Defender prayer matches | Result |
//! |----------|-------------------------|--------|
//! | NPC | yes | always negated |
//! | player | yes | negated one time in `pvp_negation_one_in` |
//! | player with a bypass set | yes | never negated |
//! | any | no | never negated |
//!
//! NPC defenders carry no prayers.

use rand::Rng;

use super::hit::{CombatStyle, HitOutcome};
use crate::config::CombatConfig;
use crate::entity::Entity;

/// How an attack is mitigated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negation {
    /// Damage goes through.
    Never,
    /// Every sub-hit is zeroed.
    Always,
    /// Every sub-hit is zeroed with probability `1 / n`.
    OneIn(u32),
}

impl Negation {
    /// The rule for `attacker` hitting `defender` with `style`.
    #[must_use]
    pub fn rule(
        attacker: &Entity,
        defender: &Entity,
        style: CombatStyle,
        config: &CombatConfig,
    ) -> Self {
        if !defender.is_player() || !defender.protection().guards(style) {
            return Self::Never;
        }
        if attacker.is_npc() {
            return Self::Always;
        }
        if attacker.bypasses_protection() {
            return Self::Never;
        }
        Self::OneIn(config.pvp_negation_one_in)
    }

    /// Decides whether this attack is negated.
    pub fn roll<R>(self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::OneIn(0) => false,
            Self::OneIn(n) => rng.gen_ratio(1, n),
        }
    }
}

/// Applies protection prayers to `outcome`. Returns `true` if it was zeroed.
pub fn mitigate<R>(
    attacker: &Entity,
    defender: &Entity,
    outcome: &mut HitOutcome,
    config: &CombatConfig,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let negation = Negation::rule(attacker, defender, outcome.style(), config);
    if !negation.roll(rng) {
        return false;
    }
    outcome.negate();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Hit;
    use crate::entity::{
        ArmourSet, EntityId, NpcProfile, PlayerProfile, Position, Profile, Protection,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            Profile::Player(PlayerProfile::default()),
            Position::new(0, 0, 0),
        )
    }

    fn npc(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            Profile::Npc(NpcProfile::new("Guard", Position::new(0, 0, 0))),
            Position::new(0, 0, 0),
        )
    }

    fn melee_outcome() -> HitOutcome {
        HitOutcome::new(CombatStyle::Melee, [Hit::new(7), Hit::new(3)]).unwrap()
    }

    #[test]
    fn rule_table() {
        let config = CombatConfig::default();
        let praying = player(2).with_protection(Protection::MELEE);
        let melee = CombatStyle::Melee;

        assert_eq!(Negation::rule(&npc(1), &praying, melee, &config), Negation::Always);
        assert_eq!(Negation::rule(&player(1), &praying, melee, &config), Negation::OneIn(4));
        let verac = player(1).with_armour(ArmourSet::Verac);
        assert_eq!(Negation::rule(&verac, &praying, melee, &config), Negation::Never);
        assert_eq!(
            Negation::rule(&npc(1), &praying, CombatStyle::Magic, &config),
            Negation::Never
        );
        assert_eq!(Negation::rule(&player(1), &npc(2), melee, &config), Negation::Never);
    }

    #[test]
    fn npc_attacks_are_always_negated() {
        let config = CombatConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let praying = player(2).with_protection(Protection::MELEE);
        for _ in 0..100 {
            let mut outcome = melee_outcome();
            assert!(mitigate(&npc(1), &praying, &mut outcome, &config, &mut rng));
            assert_eq!(outcome.total_damage(), 0);
            assert_eq!(outcome.hits().len(), 2);
        }
    }

    #[test]
    fn player_attacks_are_negated_about_a_quarter_of_the_time() {
        let config = CombatConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
        let attacker = player(1);
        let praying = player(2).with_protection(Protection::MELEE);

        let trials = 20_000;
        let negated = (0..trials)
            .filter(|_| {
                let mut outcome = melee_outcome();
                mitigate(&attacker, &praying, &mut outcome, &config, &mut rng)
            })
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = negated as f64 / f64::from(trials);
        assert!((rate - 0.25).abs() < 0.03, "negation rate {rate}");
    }

    #[test]
    fn verac_hits_through_prayer() {
        let config = CombatConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let verac = player(1).with_armour(ArmourSet::Verac);
        let praying = player(2).with_protection(Protection::MELEE);
        for _ in 0..200 {
            let mut outcome = melee_outcome();
            assert!(!mitigate(&verac, &praying, &mut outcome, &config, &mut rng));
            assert_eq!(outcome.total_damage(), 10);
        }
    }

    #[test]
    fn zero_odds_never_negate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(!Negation::OneIn(0).roll(&mut rng));
        assert!(Negation::OneIn(1).roll(&mut rng));
    }
}
