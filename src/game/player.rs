//! # Player State
//!
//! Run-scoped protagonist state. This is the only state that is persisted;
//! encounters and shield sessions are ephemeral.

use crate::content::{BuffDescriptor, BuffKind, DebuffDescriptor, DebuffKind, House};
use crate::game::BalanceConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Unique identifier for a run.
pub type RunId = Uuid;

/// A temporary combat buff on the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub value: f64,
    pub turns: u32,
}

impl From<BuffDescriptor> for ActiveBuff {
    fn from(desc: BuffDescriptor) -> Self {
        Self {
            kind: desc.kind,
            value: desc.value,
            turns: desc.turns,
        }
    }
}

/// A temporary debuff the player has placed on the current encounter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveDebuff {
    pub kind: DebuffKind,
    pub value: f64,
    pub turns: u32,
}

impl ActiveDebuff {
    /// Applies a debuff descriptor to a debuff list.
    ///
    /// A stacking debuff adds its value to an existing debuff of the same
    /// kind and keeps the longer duration. A non-stacking debuff refreshes
    /// the duration and overwrites the value.
    pub fn apply(list: &mut Vec<ActiveDebuff>, desc: &DebuffDescriptor) {
        match list.iter_mut().find(|d| d.kind == desc.kind) {
            Some(existing) if desc.stacks => {
                existing.value += desc.value;
                existing.turns = existing.turns.max(desc.turns);
            }
            Some(existing) => {
                existing.value = desc.value;
                existing.turns = desc.turns;
            }
            None => list.push(ActiveDebuff {
                kind: desc.kind,
                value: desc.value,
                turns: desc.turns,
            }),
        }
    }
}

/// Permanent additive modifiers accumulated from buff selections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffStats {
    pub atk: i64,
    pub def: i64,
    pub hp: i64,
    /// Crit chance, in percent
    pub crit: f64,
    pub crit_damage: f64,
    pub gold_bonus: f64,
    pub xp_bonus: f64,
    pub lifesteal: f64,
    pub regen_flat: i64,
    /// Dodge chance, in percent
    pub dodge: f64,
    pub thorns: f64,
    pub execute_bonus: f64,
    pub spell_power: f64,
    pub damage_reduction: f64,
    pub death_save_charges: u32,
    pub double_attack: bool,
    pub fear_immune: bool,
}

/// Skills bought with skill points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Passive HP regeneration every tick
    Vitality,
    /// Bonus gold from kills
    Fortune,
    /// Bonus experience from kills
    Scholar,
}

/// Skill levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub vitality: u32,
    pub fortune: u32,
    pub scholar: u32,
}

impl Skills {
    /// Current level of a skill.
    pub fn level(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Vitality => self.vitality,
            Skill::Fortune => self.fortune,
            Skill::Scholar => self.scholar,
        }
    }

    fn raise(&mut self, skill: Skill) {
        match skill {
            Skill::Vitality => self.vitality += 1,
            Skill::Fortune => self.fortune += 1,
            Skill::Scholar => self.scholar += 1,
        }
    }
}

/// Statistics for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatistics {
    pub kills: u32,
    pub boss_kills: u32,
    /// Kills since the player last took lethal damage
    pub combo: u32,
    pub max_combo: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub run_gold: u64,
    pub spells_cast: u32,
    pub shields_blocked: u32,
    pub shields_failed: u32,
    pub deaths_prevented: u32,
}

/// Progress that survives across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeProgress {
    pub bosses_encountered: u32,
    pub shield_tutorial_done: bool,
    pub intro_tutorial_done: bool,
    pub total_gold_earned: u64,
    pub runs_started: u32,
}

/// The protagonist of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Identifier of the current run
    pub run_id: RunId,
    /// House, chosen once per run
    pub house: Option<House>,

    pub gold: u64,
    pub gems: u64,

    pub level: u32,
    /// Depth counter, starts at 1
    pub floor: u32,
    pub exp: u64,
    pub exp_to_level: u64,
    pub skill_points: u32,

    pub base_atk: i64,
    pub base_def: i64,
    pub base_hp: i64,
    /// Base crit chance, in percent
    pub base_crit: f64,

    /// Current HP
    pub hp: i64,

    pub combat_buffs: Vec<ActiveBuff>,
    /// Debuffs placed on the current encounter
    pub combat_debuffs: Vec<ActiveDebuff>,
    pub poison_stacks: u32,
    pub fear: bool,

    pub buff_stats: BuffStats,
    pub skills: Skills,
    /// Whether the one-time revival is still available
    pub revival_available: bool,

    pub unlocked_spells: BTreeSet<String>,
    /// Remaining cooldown seconds per spell id
    pub cooldowns: BTreeMap<String, u32>,

    /// Index of the current slot in the encounter sequence
    pub encounter_index: usize,

    pub stats: RunStatistics,
    pub lifetime: LifetimeProgress,
}

impl Player {
    /// Creates a fresh player at the start of a run.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::{BalanceConfig, Player};
    ///
    /// let player = Player::new(&BalanceConfig::new());
    /// assert_eq!(player.level, 1);
    /// assert_eq!(player.floor, 1);
    /// assert_eq!(player.hp, 100);
    /// assert!(player.house.is_none());
    /// ```
    pub fn new(config: &BalanceConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            house: None,
            gold: 0,
            gems: 0,
            level: 1,
            floor: 1,
            exp: 0,
            exp_to_level: config.starting_exp_to_level,
            skill_points: 0,
            base_atk: config.base_atk,
            base_def: config.base_def,
            base_hp: config.base_hp,
            base_crit: config.base_crit,
            hp: config.base_hp,
            combat_buffs: Vec::new(),
            combat_debuffs: Vec::new(),
            poison_stacks: 0,
            fear: false,
            buff_stats: BuffStats::default(),
            skills: Skills::default(),
            revival_available: config.start_with_revival,
            unlocked_spells: BTreeSet::new(),
            cooldowns: BTreeMap::new(),
            encounter_index: 0,
            stats: RunStatistics::default(),
            lifetime: LifetimeProgress::default(),
        }
    }

    /// Creates a fresh run that keeps the lifetime progress of `self`.
    pub fn next_run(&self, config: &BalanceConfig) -> Self {
        let mut player = Player::new(config);
        player.lifetime = self.lifetime.clone();
        player
    }

    /// Whether a spell is unlocked.
    pub fn knows_spell(&self, spell_id: &str) -> bool {
        self.unlocked_spells.contains(spell_id)
    }

    /// Unlocks a spell, ready to cast.
    pub fn unlock_spell(&mut self, spell_id: &str) {
        self.unlocked_spells.insert(spell_id.to_string());
        self.cooldowns.entry(spell_id.to_string()).or_insert(0);
    }

    /// Remaining cooldown of a spell in seconds.
    pub fn cooldown(&self, spell_id: &str) -> u32 {
        self.cooldowns.get(spell_id).copied().unwrap_or(0)
    }

    /// Spends a skill point. Returns false when none are available.
    pub fn spend_skill_point(&mut self, skill: Skill) -> bool {
        if self.skill_points == 0 {
            return false;
        }
        self.skill_points -= 1;
        self.skills.raise(skill);
        true
    }

    /// Sum of the values of active buffs of one kind.
    pub fn buff_total(&self, kind: BuffKind) -> f64 {
        self.combat_buffs
            .iter()
            .filter(|b| b.kind == kind && b.turns > 0)
            .map(|b| b.value)
            .sum()
    }

    /// Sum of the values of active debuffs of one kind.
    pub fn debuff_total(&self, kind: DebuffKind) -> f64 {
        self.combat_debuffs
            .iter()
            .filter(|d| d.kind == kind && d.turns > 0)
            .map(|d| d.value)
            .sum()
    }

    /// Drops every temporary effect at the end of an encounter.
    pub fn clear_combat_effects(&mut self) {
        self.combat_buffs.clear();
        self.combat_debuffs.clear();
    }

    /// Records a kill in the combo counter.
    pub fn record_kill(&mut self, is_boss: bool) {
        self.stats.kills += 1;
        if is_boss {
            self.stats.boss_kills += 1;
        }
        self.stats.combo += 1;
        self.stats.max_combo = self.stats.max_combo.max(self.stats.combo);
    }

    /// Adds gold to every gold counter.
    pub fn earn_gold(&mut self, amount: u64) {
        self.gold += amount;
        self.stats.run_gold += amount;
        self.lifetime.total_gold_earned += amount;
    }
}
