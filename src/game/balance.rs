//! # Balance Table
//!
//! Every numeric rule of the engine lives in [`BalanceConfig`]. Where older
//! tunings disagreed (defense coefficient 0.4 vs 0.6, shield timer 1500 vs
//! 2000 ms) this table holds the one canonical value.

use crate::{DuelError, DuelResult};
use serde::{Deserialize, Serialize};

/// Balancing constants for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    // ------------------------------------------------------------------
    // Clocks
    // ------------------------------------------------------------------
    /// Battle tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Spell cooldown ticker period in milliseconds
    pub cooldown_interval_ms: u64,
    /// Shield countdown polling period in milliseconds
    pub shield_poll_ms: u64,

    // ------------------------------------------------------------------
    // Player growth
    // ------------------------------------------------------------------
    pub base_atk: i64,
    pub base_def: i64,
    pub base_hp: i64,
    /// Base crit chance, in percent
    pub base_crit: f64,
    pub atk_per_level: i64,
    pub def_per_level: i64,
    pub hp_per_level: i64,
    pub starting_exp_to_level: u64,
    /// Threshold multiplier applied on each level-up
    pub exp_growth: f64,
    /// Attack multiplier while frightened
    pub fear_atk_mult: f64,
    /// Whether a run starts with the one-time revival
    pub start_with_revival: bool,

    // ------------------------------------------------------------------
    // Damage math
    // ------------------------------------------------------------------
    /// Fraction of enemy attack subtracted from player damage
    pub armor_pierce: f64,
    /// Fraction of player defense subtracted from enemy damage
    pub defense_coefficient: f64,
    /// HP fraction below which execute damage applies
    pub execute_threshold: f64,
    /// Damage multiplier against a shielded encounter
    pub shield_damage_mult: f64,
    /// Floor for the combined weaken multiplier
    pub weaken_floor: f64,
    /// HP fraction restored by a death save or the revival
    pub death_save_heal_fraction: f64,
    /// Fraction of current HP paid by the instant-kill spell
    pub instant_kill_cost_fraction: f64,
    /// Seconds removed from other cooldowns by the cooldown-reduction spell
    pub cooldown_reduction_secs: u32,

    // ------------------------------------------------------------------
    // Encounter abilities
    // ------------------------------------------------------------------
    pub dodge_ability_chance: f64,
    pub regen_ability_fraction: f64,
    pub shield_ability_chance: f64,
    pub enrage_threshold: f64,
    pub enrage_mult: f64,
    pub poison_ability_chance: f64,
    pub max_poison_stacks: u32,
    /// Player max HP fraction lost per poison stack per tick
    pub poison_stack_fraction: f64,
    pub fear_ability_chance: f64,
    pub disarm_ability_chance: f64,
    pub reflect_ability_fraction: f64,

    // ------------------------------------------------------------------
    // Encounter scaling
    // ------------------------------------------------------------------
    pub enemy_hp_per_floor: f64,
    pub enemy_atk_per_floor: f64,
    pub enemy_gold_per_floor: f64,
    pub boss_hp_mult: (f64, f64),
    pub boss_atk_mult: (f64, f64),
    pub turns_to_kill: (f64, f64),
    pub fight_damage_fraction: (f64, f64),
    pub enemy_hp_variance: (f64, f64),

    // ------------------------------------------------------------------
    // Rewards
    // ------------------------------------------------------------------
    /// Max HP fraction restored after each kill
    pub kill_heal_fraction: f64,
    pub xp_base: u64,
    pub xp_per_floor: u64,
    pub gem_chance: f64,
    pub boss_gem_bonus: f64,
    pub vitality_regen_per_level: i64,
    pub fortune_gold_per_level: f64,
    pub scholar_xp_per_level: f64,
    /// (base, per floor, cap) chance of a legendary offer slot
    pub legendary_odds: (f64, f64, f64),
    pub epic_odds: (f64, f64, f64),
    pub rare_odds: (f64, f64, f64),

    // ------------------------------------------------------------------
    // Shield minigame
    // ------------------------------------------------------------------
    pub shield_spells_normal: usize,
    pub shield_spells_tutorial: usize,
    pub shield_time_normal_ms: u64,
    pub shield_time_tutorial_ms: u64,
    pub shield_speed_bonus_per_floor_ms: u64,
    pub shield_speed_bonus_cap_ms: u64,
    pub shield_pause_normal_ms: u64,
    pub shield_pause_tutorial_ms: u64,
    /// Fraction of enemy attack dealt to the player per failed block
    pub shield_penalty_normal: f64,
    pub shield_penalty_tutorial: f64,
    /// HP ratio at or below which the second shield phase starts
    pub shield_phase2_ratio: f64,
    /// Encounter max HP fraction dealt after a perfect session
    pub shield_bonus_fraction: f64,

    // ------------------------------------------------------------------
    // Offline progress
    // ------------------------------------------------------------------
    pub offline_min_secs: u64,
    pub offline_cap_secs: u64,
    pub offline_rate: f64,
    pub offline_base: u64,
    pub offline_per_floor: u64,
}

impl BalanceConfig {
    /// Creates the canonical balance table.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::BalanceConfig;
    ///
    /// let config = BalanceConfig::new();
    /// assert_eq!(config.tick_interval_ms, 900);
    /// assert_eq!(config.defense_coefficient, 0.4);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            tick_interval_ms: 900,
            cooldown_interval_ms: 1000,
            shield_poll_ms: 50,

            base_atk: 10,
            base_def: 5,
            base_hp: 100,
            base_crit: 5.0,
            atk_per_level: 2,
            def_per_level: 1,
            hp_per_level: 10,
            starting_exp_to_level: 100,
            exp_growth: 1.2,
            fear_atk_mult: 0.7,
            start_with_revival: false,

            armor_pierce: 0.08,
            defense_coefficient: 0.4,
            execute_threshold: 0.3,
            shield_damage_mult: 0.5,
            weaken_floor: 0.1,
            death_save_heal_fraction: 0.3,
            instant_kill_cost_fraction: 0.5,
            cooldown_reduction_secs: 2,

            dodge_ability_chance: 0.15,
            regen_ability_fraction: 0.05,
            shield_ability_chance: 0.25,
            enrage_threshold: 0.3,
            enrage_mult: 1.5,
            poison_ability_chance: 0.3,
            max_poison_stacks: 5,
            poison_stack_fraction: 0.02,
            fear_ability_chance: 0.2,
            disarm_ability_chance: 0.1,
            reflect_ability_fraction: 0.2,

            enemy_hp_per_floor: 0.12,
            enemy_atk_per_floor: 0.08,
            enemy_gold_per_floor: 0.1,
            boss_hp_mult: (1.2, 1.8),
            boss_atk_mult: (1.1, 1.4),
            turns_to_kill: (5.0, 8.0),
            fight_damage_fraction: (0.3, 0.5),
            enemy_hp_variance: (0.8, 1.0),

            kill_heal_fraction: 0.25,
            xp_base: 10,
            xp_per_floor: 5,
            gem_chance: 0.04,
            boss_gem_bonus: 0.25,
            vitality_regen_per_level: 2,
            fortune_gold_per_level: 0.1,
            scholar_xp_per_level: 0.1,
            legendary_odds: (0.03, 0.005, 0.15),
            epic_odds: (0.10, 0.01, 0.25),
            rare_odds: (0.25, 0.01, 0.35),

            shield_spells_normal: 5,
            shield_spells_tutorial: 3,
            shield_time_normal_ms: 2000,
            shield_time_tutorial_ms: 4000,
            shield_speed_bonus_per_floor_ms: 25,
            shield_speed_bonus_cap_ms: 600,
            shield_pause_normal_ms: 800,
            shield_pause_tutorial_ms: 1200,
            shield_penalty_normal: 0.5,
            shield_penalty_tutorial: 0.3,
            shield_phase2_ratio: 0.5,
            shield_bonus_fraction: 0.1,

            offline_min_secs: 60,
            offline_cap_secs: 8 * 60 * 60,
            offline_rate: 0.3,
            offline_base: 5,
            offline_per_floor: 2,
        }
    }

    /// Creates a table with fast clocks for driving sessions in tests.
    ///
    /// Only timings differ from [`BalanceConfig::new`]; every combat rule is
    /// identical.
    pub fn for_testing() -> Self {
        Self {
            tick_interval_ms: 90,
            cooldown_interval_ms: 100,
            shield_poll_ms: 10,
            ..Self::new()
        }
    }

    /// Loads and validates a table from JSON. Missing fields take their
    /// canonical values.
    pub fn from_json(json: &str) -> DuelResult<Self> {
        let config: BalanceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges that would otherwise break the engine.
    pub fn validate(&self) -> DuelResult<()> {
        let fail = |what: &str| Err(DuelError::InvalidConfig(what.to_string()));

        if self.tick_interval_ms == 0 || self.cooldown_interval_ms == 0 || self.shield_poll_ms == 0
        {
            return fail("timer periods must be non-zero");
        }
        if self.base_hp <= 0 || self.base_atk <= 0 {
            return fail("base HP and attack must be positive");
        }
        if self.starting_exp_to_level == 0 || self.exp_growth < 1.0 {
            return fail("experience threshold must be positive and non-shrinking");
        }
        if self.shield_spells_normal == 0 || self.shield_spells_tutorial == 0 {
            return fail("shield sessions need at least one spell");
        }
        if self.shield_speed_bonus_cap_ms >= self.shield_time_normal_ms
            || self.shield_speed_bonus_cap_ms >= self.shield_time_tutorial_ms
        {
            return fail("shield speed bonus cap must leave a positive deadline");
        }
        for (lo, hi) in [
            self.boss_hp_mult,
            self.boss_atk_mult,
            self.turns_to_kill,
            self.fight_damage_fraction,
            self.enemy_hp_variance,
        ] {
            if lo > hi || lo <= 0.0 {
                return fail("scaling ranges must be positive and ordered");
            }
        }
        if !(0.0..=1.0).contains(&self.weaken_floor) {
            return fail("weaken floor must be a fraction");
        }
        Ok(())
    }

    /// Deadline for one shield challenge at `floor`.
    pub fn shield_deadline_ms(&self, is_tutorial: bool, floor: u32) -> u64 {
        let base = if is_tutorial {
            self.shield_time_tutorial_ms
        } else {
            self.shield_time_normal_ms
        };
        let bonus = (floor as u64 * self.shield_speed_bonus_per_floor_ms)
            .min(self.shield_speed_bonus_cap_ms);
        base - bonus
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self::new()
    }
}
