//! # Spellbook
//!
//! Spell templates and the effect descriptors they carry.

use crate::game::Element;
use serde::{Deserialize, Serialize};

/// Kinds of temporary combat buffs on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    /// Heals `value` HP per tick
    Regen,
    /// Returns `value` fraction of incoming damage to the attacker
    Reflect,
    /// Adds `value` attack to spell damage
    Atk,
    /// Adds `value` percent crit chance to spells
    Crit,
    /// Adds `value` to the crit damage multiplier of spells
    CritDamage,
}

/// Kinds of temporary debuffs the player places on an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebuffKind {
    Poison,
    Burn,
    Bleed,
    HellfireBurn,
    /// Encounter skips its attack while active
    Stun,
    /// Reduces encounter damage by `value` fraction
    Weaken,
}

impl DebuffKind {
    /// Whether this debuff deals its value as damage every tick.
    pub fn is_damage_over_time(self) -> bool {
        matches!(
            self,
            DebuffKind::Poison | DebuffKind::Burn | DebuffKind::Bleed | DebuffKind::HellfireBurn
        )
    }
}

/// A buff a spell grants to the caster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffDescriptor {
    pub kind: BuffKind,
    pub value: f64,
    pub turns: u32,
}

/// A debuff a spell places on the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebuffDescriptor {
    pub kind: DebuffKind,
    pub value: f64,
    pub turns: u32,
    /// Stacking debuffs accumulate value; others refresh and overwrite
    #[serde(default)]
    pub stacks: bool,
}

/// Special spell behaviors outside the damage formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpellSpecial {
    /// Removes poison, burn and bleed debuffs and clears poison stacks
    Cleanse,
    /// Clears the fear debuff
    DispelFear,
    /// Reduces every running cooldown by 2 seconds, its own included
    ReduceCooldowns,
    /// Deals this fraction of the encounter's max HP
    PercentMaxHp(f64),
    /// Kills the encounter outright at the cost of half the caster's HP
    InstantKill,
}

/// An immutable spell template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellTemplate {
    pub id: String,
    pub name: String,
    /// Cooldown in seconds
    pub cooldown_secs: u32,
    pub element: Element,
    /// Multiplier on attack for damaging spells; zero for non-damaging ones
    #[serde(default)]
    pub damage_mult: f64,
    #[serde(default)]
    pub buff: Option<BuffDescriptor>,
    #[serde(default)]
    pub debuff: Option<DebuffDescriptor>,
    /// Flat heal applied immediately
    #[serde(default)]
    pub heal_now: Option<i64>,
    /// Heal as a fraction of max HP
    #[serde(default)]
    pub heal_fraction: Option<f64>,
    /// Barrier heal as a fraction of max HP
    #[serde(default)]
    pub shield_fraction: Option<f64>,
    #[serde(default)]
    pub special: Option<SpellSpecial>,
}

impl SpellTemplate {
    fn base(id: &str, name: &str, cooldown_secs: u32, element: Element) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cooldown_secs,
            element,
            damage_mult: 0.0,
            buff: None,
            debuff: None,
            heal_now: None,
            heal_fraction: None,
            shield_fraction: None,
            special: None,
        }
    }

    /// Whether casting this spell goes through the damage step.
    pub fn deals_damage(&self) -> bool {
        self.damage_mult > 0.0
            || matches!(
                self.special,
                Some(SpellSpecial::PercentMaxHp(_)) | Some(SpellSpecial::InstantKill)
            )
    }
}

fn debuff(kind: DebuffKind, value: f64, turns: u32, stacks: bool) -> Option<DebuffDescriptor> {
    Some(DebuffDescriptor {
        kind,
        value,
        turns,
        stacks,
    })
}

fn buff(kind: BuffKind, value: f64, turns: u32) -> Option<BuffDescriptor> {
    Some(BuffDescriptor { kind, value, turns })
}

/// The built-in spell table.
pub fn standard_spells() -> Vec<SpellTemplate> {
    use Element::*;
    vec![
        SpellTemplate {
            damage_mult: 1.3,
            debuff: debuff(DebuffKind::Burn, 4.0, 3, true),
            ..SpellTemplate::base("incendio", "Incendio", 8, Fire)
        },
        SpellTemplate {
            damage_mult: 1.0,
            debuff: debuff(DebuffKind::Poison, 3.0, 4, true),
            ..SpellTemplate::base("serpensortia", "Serpensortia", 9, Water)
        },
        SpellTemplate {
            damage_mult: 1.2,
            debuff: debuff(DebuffKind::Stun, 0.0, 1, false),
            ..SpellTemplate::base("stupefy", "Stupefy", 10, Air)
        },
        SpellTemplate {
            heal_now: Some(10),
            heal_fraction: Some(0.25),
            ..SpellTemplate::base("episkey", "Episkey", 12, Light)
        },
        SpellTemplate {
            damage_mult: 1.4,
            ..SpellTemplate::base("aguamenti", "Aguamenti", 7, Water)
        },
        SpellTemplate {
            damage_mult: 0.8,
            debuff: debuff(DebuffKind::Weaken, 0.3, 3, false),
            ..SpellTemplate::base("expelliarmus", "Expelliarmus", 10, Light)
        },
        SpellTemplate {
            shield_fraction: Some(0.15),
            buff: buff(BuffKind::Reflect, 0.3, 3),
            ..SpellTemplate::base("protego", "Protego", 15, Light)
        },
        SpellTemplate {
            buff: buff(BuffKind::Regen, 6.0, 4),
            special: Some(SpellSpecial::Cleanse),
            ..SpellTemplate::base("wiggenweld", "Wiggenweld Potion", 18, Earth)
        },
        SpellTemplate {
            special: Some(SpellSpecial::DispelFear),
            buff: buff(BuffKind::Crit, 15.0, 3),
            ..SpellTemplate::base("riddikulus", "Riddikulus", 14, Light)
        },
        SpellTemplate {
            special: Some(SpellSpecial::ReduceCooldowns),
            buff: buff(BuffKind::Atk, 5.0, 3),
            ..SpellTemplate::base("tempus", "Tempus Fugit", 20, Air)
        },
        SpellTemplate {
            special: Some(SpellSpecial::PercentMaxHp(0.15)),
            ..SpellTemplate::base("confringo", "Confringo", 18, Fire)
        },
        SpellTemplate {
            damage_mult: 1.6,
            debuff: debuff(DebuffKind::Bleed, 5.0, 3, true),
            buff: buff(BuffKind::CritDamage, 0.5, 2),
            ..SpellTemplate::base("sectumsempra", "Sectumsempra", 14, Dark)
        },
        SpellTemplate {
            damage_mult: 1.1,
            debuff: debuff(DebuffKind::HellfireBurn, 12.0, 4, true),
            ..SpellTemplate::base("fiendfyre", "Fiendfyre", 30, Fire)
        },
        SpellTemplate {
            special: Some(SpellSpecial::InstantKill),
            ..SpellTemplate::base("avada_kedavra", "Avada Kedavra", 60, Dark)
        },
    ]
}
