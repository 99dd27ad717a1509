//! # Stats Resolver
//!
//! Computes the player's effective combat stats from base values, level,
//! house, permanent buffs and the fear debuff. Called on every tick and
//! every cast; never cached, since buffs change mid-combat.

use crate::game::{BalanceConfig, Element, Player};
use crate::utils::floor_mul;
use serde::{Deserialize, Serialize};

/// The player's resolved combat stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub atk: i64,
    pub def: i64,
    pub max_hp: i64,
    /// Crit chance, in percent
    pub crit: f64,
    /// Crit damage multiplier, `1 + buff`
    pub crit_damage: f64,
    pub gold_bonus: f64,
    pub xp_bonus: f64,
    pub lifesteal: f64,
    pub regen_flat: i64,
    /// Regen from the vitality skill
    pub passive_regen: i64,
    /// Dodge chance, in percent
    pub dodge: f64,
    pub thorns: f64,
    pub execute_bonus: f64,
    pub spell_power: f64,
    pub damage_reduction: f64,
    pub double_attack: bool,
    pub fear_immune: bool,
    /// Element of the basic attack
    pub affinity: Element,
}

/// Resolves the player's effective stats.
///
/// Level and buff additions come first, then house multipliers, then the
/// fear penalty. Each multiplication floors before the next one.
///
/// # Examples
///
/// ```
/// use wizard_duel::{compute_stats, BalanceConfig, Player};
///
/// let config = BalanceConfig::new();
/// let mut player = Player::new(&config);
/// player.level = 3;
///
/// let stats = compute_stats(&player, &config);
/// assert_eq!(stats.atk, 14);
/// assert_eq!(stats.max_hp, 120);
/// ```
pub fn compute_stats(player: &Player, config: &BalanceConfig) -> EffectiveStats {
    let levels = player.level.saturating_sub(1) as i64;
    let buffs = &player.buff_stats;
    let house = player.house.map(|h| h.modifiers());

    let mut atk = player.base_atk + levels * config.atk_per_level + buffs.atk;
    let mut def = player.base_def + levels * config.def_per_level + buffs.def;
    let mut max_hp = player.base_hp + levels * config.hp_per_level + buffs.hp;
    let mut crit = player.base_crit + buffs.crit;
    let mut xp_bonus = buffs.xp_bonus + player.skills.scholar as f64 * config.scholar_xp_per_level;

    if let Some(m) = house {
        atk = floor_mul(atk, m.atk_mult);
        def = floor_mul(def, m.def_mult);
        max_hp = floor_mul(max_hp, m.hp_mult);
        crit += m.crit_bonus;
        xp_bonus += m.xp_bonus;
    }

    if player.fear && !buffs.fear_immune {
        atk = floor_mul(atk, config.fear_atk_mult);
    }

    EffectiveStats {
        atk,
        def,
        max_hp: max_hp.max(1),
        crit,
        crit_damage: 1.0 + buffs.crit_damage,
        gold_bonus: buffs.gold_bonus + player.skills.fortune as f64 * config.fortune_gold_per_level,
        xp_bonus,
        lifesteal: buffs.lifesteal,
        regen_flat: buffs.regen_flat,
        passive_regen: player.skills.vitality as i64 * config.vitality_regen_per_level,
        dodge: buffs.dodge,
        thorns: buffs.thorns,
        execute_bonus: buffs.execute_bonus,
        spell_power: buffs.spell_power,
        damage_reduction: buffs.damage_reduction,
        double_attack: buffs.double_attack,
        fear_immune: buffs.fear_immune,
        affinity: player.house.map(|h| h.affinity()).unwrap_or(Element::Light),
    }
}
