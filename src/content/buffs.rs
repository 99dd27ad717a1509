//! # Buff Templates
//!
//! Permanent run modifiers offered after each kill.

use serde::{Deserialize, Serialize};

/// Rarity tier of a buff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers, most common first.
    pub fn all() -> [Rarity; 4] {
        [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary]
    }
}

/// What a buff does when picked.
///
/// Most variants add to the player's permanent modifiers; the rest are
/// one-shot effects applied at selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BuffEffect {
    Atk(i64),
    Def(i64),
    MaxHp(i64),
    /// Crit chance, in percent
    Crit(f64),
    CritDamage(f64),
    GoldBonus(f64),
    XpBonus(f64),
    Lifesteal(f64),
    RegenFlat(i64),
    /// Dodge chance, in percent
    Dodge(f64),
    Thorns(f64),
    ExecuteBonus(f64),
    SpellPower(f64),
    DamageReduction(f64),
    DeathSave(u32),
    DoubleAttack,
    FearImmunity,
    /// Heals this many HP now
    HealNow(i64),
    /// Grants this much gold now
    GoldNow(u64),
    /// Unlocks a spell by id
    UnlockSpell(String),
    /// Grants the one-time revival
    Revival,
}

impl BuffEffect {
    /// Whether this effect is applied once rather than accumulated.
    pub fn is_instant(&self) -> bool {
        matches!(
            self,
            BuffEffect::HealNow(_)
                | BuffEffect::GoldNow(_)
                | BuffEffect::UnlockSpell(_)
                | BuffEffect::Revival
        )
    }
}

/// An immutable buff template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub effect: BuffEffect,
}

impl BuffTemplate {
    /// Creates a buff template.
    pub fn new(id: &str, name: &str, description: &str, rarity: Rarity, effect: BuffEffect) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rarity,
            effect,
        }
    }
}

/// The built-in buff table.
pub fn standard_buffs() -> Vec<BuffTemplate> {
    use BuffEffect::*;
    use Rarity::*;
    vec![
        BuffTemplate::new("wand_polish", "Wand Polish", "+3 attack", Common, Atk(3)),
        BuffTemplate::new("dragonhide", "Dragonhide Gloves", "+2 defense", Common, Def(2)),
        BuffTemplate::new("pumpkin_juice", "Pumpkin Juice", "+15 max HP", Common, MaxHp(15)),
        BuffTemplate::new("owl_feather", "Owl Feather", "+3% crit chance", Common, Crit(3.0)),
        BuffTemplate::new("chocolate_frog", "Chocolate Frog", "Heal 30 HP", Common, HealNow(30)),
        BuffTemplate::new("gringotts_pouch", "Gringotts Pouch", "+50 gold", Common, GoldNow(50)),
        BuffTemplate::new("leprechaun_gold", "Leprechaun Gold", "+15% gold", Common, GoldBonus(0.15)),
        BuffTemplate::new("study_notes", "Study Notes", "+15% experience", Common, XpBonus(0.15)),
        BuffTemplate::new("elder_core", "Elder Wand Core", "+7 attack", Rare, Atk(7)),
        BuffTemplate::new("vampire_fang", "Vampire Fang", "Heal 10% of damage dealt", Rare, Lifesteal(0.1)),
        BuffTemplate::new("phoenix_tear", "Phoenix Tear", "+3 HP every tick", Rare, RegenFlat(3)),
        BuffTemplate::new("invisibility", "Invisibility Cloak Scrap", "+5% dodge", Rare, Dodge(5.0)),
        BuffTemplate::new("runespoor", "Runespoor Scales", "Return 20% of damage taken", Rare, Thorns(0.2)),
        BuffTemplate::new("seeker_eye", "Seeker's Eye", "+50% crit damage", Rare, CritDamage(0.5)),
        BuffTemplate::new("learn_aguamenti", "Tome: Aguamenti", "Learn Aguamenti", Rare, UnlockSpell("aguamenti".into())),
        BuffTemplate::new("learn_expelliarmus", "Tome: Expelliarmus", "Learn Expelliarmus", Rare, UnlockSpell("expelliarmus".into())),
        BuffTemplate::new("learn_protego", "Tome: Protego", "Learn Protego", Rare, UnlockSpell("protego".into())),
        BuffTemplate::new("learn_wiggenweld", "Recipe: Wiggenweld", "Learn to brew Wiggenweld", Rare, UnlockSpell("wiggenweld".into())),
        BuffTemplate::new("learn_riddikulus", "Tome: Riddikulus", "Learn Riddikulus", Rare, UnlockSpell("riddikulus".into())),
        BuffTemplate::new("executioner", "Executioner's Hex", "+50% damage below 30% enemy HP", Epic, ExecuteBonus(0.5)),
        BuffTemplate::new("spell_mastery", "Spell Mastery", "+25% spell power", Epic, SpellPower(0.25)),
        BuffTemplate::new("troll_hide", "Troll Hide", "Take 15% less damage", Epic, DamageReduction(0.15)),
        BuffTemplate::new("patronus", "Patronus Charm", "Immune to fear", Epic, FearImmunity),
        BuffTemplate::new("horcrux_shard", "Horcrux Shard", "Survive one lethal blow", Epic, DeathSave(1)),
        BuffTemplate::new("learn_tempus", "Tome: Tempus Fugit", "Learn Tempus Fugit", Epic, UnlockSpell("tempus".into())),
        BuffTemplate::new("learn_confringo", "Tome: Confringo", "Learn Confringo", Epic, UnlockSpell("confringo".into())),
        BuffTemplate::new("learn_sectumsempra", "Tome: Sectumsempra", "Learn Sectumsempra", Epic, UnlockSpell("sectumsempra".into())),
        BuffTemplate::new("time_turner", "Time-Turner", "Attack twice", Legendary, DoubleAttack),
        BuffTemplate::new("felix_felicis", "Felix Felicis", "Revive once at 30% HP", Legendary, Revival),
        BuffTemplate::new("learn_fiendfyre", "Tome: Fiendfyre", "Learn Fiendfyre", Legendary, UnlockSpell("fiendfyre".into())),
        BuffTemplate::new("learn_avada", "Forbidden Tome", "Learn Avada Kedavra", Legendary, UnlockSpell("avada_kedavra".into())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rarity_is_represented() {
        let buffs = standard_buffs();
        for rarity in Rarity::all() {
            assert!(buffs.iter().any(|b| b.rarity == rarity));
        }
    }

    #[test]
    fn test_instant_effects() {
        assert!(BuffEffect::HealNow(5).is_instant());
        assert!(BuffEffect::Revival.is_instant());
        assert!(!BuffEffect::Atk(5).is_instant());
        assert!(!BuffEffect::DoubleAttack.is_instant());
    }
}
