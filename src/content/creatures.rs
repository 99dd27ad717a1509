//! # Creature Templates
//!
//! Static stat blocks for the opponents a run can meet. Templates are never
//! mutated; an [`Encounter`](crate::game::Encounter) is spawned from one and
//! scaled to the current floor.

use crate::game::Element;
use serde::{Deserialize, Serialize};

/// Innate creature abilities, evaluated every battle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Heals 5% of max HP per tick while damaged
    Regen,
    /// 25% chance per tick to raise a one-hit damage-halving shield
    ShieldChance,
    /// Deals 50% more damage once below 30% HP
    Enrage,
    /// 30% chance per tick to add a poison stack to the player
    PoisonChance,
    /// 15% chance to evade each basic attack
    DodgeChance,
    /// Returns 20% of the player's basic-attack damage
    Reflect,
    /// 10% chance per tick to void the player's next basic attack
    Disarm,
    /// 20% chance per tick to frighten the player
    FearChance,
}

impl Ability {
    /// Short label used in log lines and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Ability::Regen => "Regenerates",
            Ability::ShieldChance => "Shields",
            Ability::Enrage => "Enrages",
            Ability::PoisonChance => "Poisons",
            Ability::DodgeChance => "Evasive",
            Ability::Reflect => "Reflects",
            Ability::Disarm => "Disarms",
            Ability::FearChance => "Terrifies",
        }
    }
}

/// An immutable creature or boss stat block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    /// Unique catalog id
    pub id: String,
    /// Display name
    pub name: String,
    /// Display icon (emoji or sprite key)
    pub icon: String,
    /// Elemental affinity
    pub element: Element,
    /// Base HP at floor 1
    pub base_hp: i64,
    /// Base attack at floor 1
    pub base_atk: i64,
    /// Base gold reward at floor 1
    pub base_gold: u64,
    /// Innate abilities
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Whether this is a boss (boss multipliers, shield minigame)
    #[serde(default)]
    pub is_boss: bool,
}

impl CreatureTemplate {
    /// Creates a plain creature template with no abilities.
    pub fn new(
        id: &str,
        name: &str,
        icon: &str,
        element: Element,
        base_hp: i64,
        base_atk: i64,
        base_gold: u64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            element,
            base_hp,
            base_atk,
            base_gold,
            abilities: Vec::new(),
            is_boss: false,
        }
    }

    /// Adds abilities to the template.
    pub fn with_abilities(mut self, abilities: &[Ability]) -> Self {
        self.abilities.extend_from_slice(abilities);
        self
    }

    /// Marks the template as a boss.
    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }
}

/// The built-in creature table.
pub fn standard_creatures() -> Vec<CreatureTemplate> {
    use Ability::*;
    use Element::*;
    vec![
        CreatureTemplate::new("pixie", "Cornish Pixie", "🧚", Air, 30, 4, 8)
            .with_abilities(&[DodgeChance]),
        CreatureTemplate::new("doxy", "Doxy", "🦟", Earth, 35, 5, 9)
            .with_abilities(&[PoisonChance]),
        CreatureTemplate::new("grindylow", "Grindylow", "🦑", Water, 45, 5, 10),
        CreatureTemplate::new("salamander", "Fire Salamander", "🦎", Fire, 40, 6, 11)
            .with_abilities(&[Regen]),
        CreatureTemplate::new("boggart", "Boggart", "👻", Dark, 50, 6, 12)
            .with_abilities(&[FearChance]),
        CreatureTemplate::new("red_cap", "Red Cap", "👺", Earth, 55, 7, 13)
            .with_abilities(&[Enrage]),
        CreatureTemplate::new("inferius", "Inferius", "🧟", Water, 65, 7, 14)
            .with_abilities(&[Regen, Disarm]),
        CreatureTemplate::new("acromantula", "Acromantula", "🕷️", Earth, 70, 8, 16)
            .with_abilities(&[PoisonChance, Enrage]),
        CreatureTemplate::new("hippogriff", "Hippogriff", "🦅", Air, 60, 9, 15)
            .with_abilities(&[DodgeChance, ShieldChance]),
        CreatureTemplate::new("dementor", "Dementor", "🌑", Dark, 80, 9, 18)
            .with_abilities(&[FearChance, Reflect]),
        CreatureTemplate::new("troll", "Mountain Troll", "🧌", Earth, 140, 10, 40)
            .with_abilities(&[Enrage, Disarm])
            .boss(),
        CreatureTemplate::new("basilisk", "Basilisk", "🐍", Water, 180, 12, 60)
            .with_abilities(&[PoisonChance, ShieldChance, FearChance])
            .boss(),
        CreatureTemplate::new("hungarian_horntail", "Hungarian Horntail", "🐉", Fire, 220, 14, 90)
            .with_abilities(&[Enrage, Reflect, ShieldChance])
            .boss(),
        CreatureTemplate::new("death_eater", "Death Eater", "💀", Light, 260, 16, 120)
            .with_abilities(&[FearChance, DodgeChance, Regen])
            .boss(),
    ]
}
