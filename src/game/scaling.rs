//! # Encounter Scaling
//!
//! Turns a creature template into an [`Encounter`] sized for the current
//! floor and the player's current build.
//!
//! Two values are computed for each stat: the template scaled by floor, and
//! a "balanced" value derived from the player's damage output and HP pool.
//! The larger one wins, and boss multipliers apply on top.

use crate::content::CreatureTemplate;
use crate::game::{BalanceConfig, EffectiveStats, Encounter};
use crate::utils::{floor_f, floor_mul, Dice};

/// Stats of an opponent tuned to the player's current build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancedStats {
    pub hp: i64,
    pub atk: i64,
    pub gold: u64,
}

/// Computes an opponent that takes 5-8 turns to kill and deals 30-50% of
/// the player's HP over the fight.
pub fn balanced_stats(
    stats: &EffectiveStats,
    floor: u32,
    config: &BalanceConfig,
    dice: &mut dyn Dice,
) -> BalancedStats {
    let avg_crit = 1.0 + (stats.crit / 100.0) * stats.crit_damage;
    let player_dps = stats.atk as f64 * avg_crit;

    let (turns_lo, turns_hi) = config.turns_to_kill;
    let turns = dice.uniform(turns_lo, turns_hi);
    let (dmg_lo, dmg_hi) = config.fight_damage_fraction;
    let fight_damage = stats.max_hp as f64 * dice.uniform(dmg_lo, dmg_hi);
    let (var_lo, var_hi) = config.enemy_hp_variance;

    let hp = floor_f(player_dps * turns * dice.uniform(var_lo, var_hi)).max(1);

    // A 100% dodge build would divide by zero.
    let hit_rate = (1.0 - stats.dodge / 100.0).max(0.05);
    let per_turn = fight_damage / turns / hit_rate;
    let defense_offset = stats.def as f64 * config.defense_coefficient * 0.3;
    let atk = floor_f(per_turn + defense_offset).max(1);

    let difficulty = (hp + atk * 10) as f64 / 100.0;
    let gold = floor_f(10.0 + difficulty * (1.0 + floor as f64 * 0.1)).max(0) as u64;

    BalancedStats { hp, atk, gold }
}

/// Spawns an encounter from a template for `floor`.
pub fn spawn_encounter(
    template: &CreatureTemplate,
    floor: u32,
    stats: &EffectiveStats,
    config: &BalanceConfig,
    dice: &mut dyn Dice,
) -> Encounter {
    let depth = floor.saturating_sub(1) as f64;
    let floor_hp = floor_mul(template.base_hp, 1.0 + config.enemy_hp_per_floor * depth);
    let floor_atk = floor_mul(template.base_atk, 1.0 + config.enemy_atk_per_floor * depth);
    let floor_gold =
        floor_mul(template.base_gold as i64, 1.0 + config.enemy_gold_per_floor * depth).max(0) as u64;

    let balanced = balanced_stats(stats, floor, config, dice);

    let mut hp = floor_hp.max(balanced.hp);
    let mut atk = floor_atk.max(balanced.atk);
    let gold = floor_gold.max(balanced.gold);

    if template.is_boss {
        let (hp_lo, hp_hi) = config.boss_hp_mult;
        let (atk_lo, atk_hi) = config.boss_atk_mult;
        hp = floor_mul(hp, dice.uniform(hp_lo, hp_hi));
        atk = floor_mul(atk, dice.uniform(atk_lo, atk_hi));
    }

    log::debug!(
        "Spawned {} on floor {}: hp {} atk {} gold {}",
        template.id,
        floor,
        hp,
        atk,
        gold
    );

    Encounter::from_template(template, hp, atk, gold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{compute_stats, Element, Player};
    use crate::utils::FixedDice;

    fn base_stats() -> (EffectiveStats, BalanceConfig) {
        let config = BalanceConfig::new();
        let player = Player::new(&config);
        (compute_stats(&player, &config), config)
    }

    #[test]
    fn test_balanced_stats_at_range_floor() {
        let (stats, config) = base_stats();
        // dps = 10 * (1 + 0.05) = 10.5; turns 5; hp = floor(10.5 * 5 * 0.8) = 42
        // atk = floor(100 * 0.3 / 5 + 5 * 0.4 * 0.3) = floor(6.6) = 6
        let balanced = balanced_stats(&stats, 1, &config, &mut FixedDice(0.0));
        assert_eq!(balanced.hp, 42);
        assert_eq!(balanced.atk, 6);
        // floor(10 + (42 + 60) / 100 * 1.1) = floor(11.122) = 11
        assert_eq!(balanced.gold, 11);
    }

    #[test]
    fn test_template_wins_when_stronger() {
        let (stats, config) = base_stats();
        let template = CreatureTemplate::new("ogre", "Ogre", "O", Element::Earth, 500, 40, 90);
        let enc = spawn_encounter(&template, 1, &stats, &config, &mut FixedDice(0.0));
        assert_eq!(enc.max_hp, 500);
        assert_eq!(enc.atk, 40);
        assert_eq!(enc.gold, 90);
        assert_eq!(enc.element, Element::Earth);
    }

    #[test]
    fn test_floor_scaling() {
        let (stats, config) = base_stats();
        let template = CreatureTemplate::new("ogre", "Ogre", "O", Element::Earth, 500, 40, 90);
        // floor 6: hp *1.6, atk *1.4, gold *1.5
        let enc = spawn_encounter(&template, 6, &stats, &config, &mut FixedDice(0.0));
        assert_eq!(enc.max_hp, 800);
        assert_eq!(enc.atk, 56);
        assert_eq!(enc.gold, 135);
    }

    #[test]
    fn test_boss_multiplier_after_max() {
        let (stats, config) = base_stats();
        let template =
            CreatureTemplate::new("troll", "Troll", "T", Element::Earth, 100, 10, 50).boss();
        let enc = spawn_encounter(&template, 1, &stats, &config, &mut FixedDice(0.0));
        assert_eq!(enc.max_hp, 120);
        assert_eq!(enc.atk, 11);
        assert!(enc.is_boss);
    }

    #[test]
    fn test_full_dodge_build_does_not_explode() {
        let (mut stats, config) = base_stats();
        stats.dodge = 100.0;
        let balanced = balanced_stats(&stats, 1, &config, &mut FixedDice(0.5));
        assert!(balanced.atk > 0);
        assert!(balanced.atk < 1000);
    }
}
