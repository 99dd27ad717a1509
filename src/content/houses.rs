//! # Houses
//!
//! The four houses a player chooses from at the start of a run. Each house
//! trades one stat for another and grants a starter spell.

use crate::game::Element;
use serde::{Deserialize, Serialize};

/// A house, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Gryffindor,
    Slytherin,
    Ravenclaw,
    Hufflepuff,
}

/// Stat modifiers contributed by a house.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseModifiers {
    /// Multiplier applied to attack after level and buff additions
    pub atk_mult: f64,
    /// Multiplier applied to defense
    pub def_mult: f64,
    /// Multiplier applied to max HP
    pub hp_mult: f64,
    /// Flat crit chance bonus, in percent
    pub crit_bonus: f64,
    /// Additive experience bonus fraction
    pub xp_bonus: f64,
}

impl HouseModifiers {
    const NEUTRAL: HouseModifiers = HouseModifiers {
        atk_mult: 1.0,
        def_mult: 1.0,
        hp_mult: 1.0,
        crit_bonus: 0.0,
        xp_bonus: 0.0,
    };
}

impl House {
    /// Returns all houses in display order.
    pub fn all() -> [House; 4] {
        [
            House::Gryffindor,
            House::Slytherin,
            House::Ravenclaw,
            House::Hufflepuff,
        ]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            House::Gryffindor => "Gryffindor",
            House::Slytherin => "Slytherin",
            House::Ravenclaw => "Ravenclaw",
            House::Hufflepuff => "Hufflepuff",
        }
    }

    /// The house's stat trade-off.
    pub fn modifiers(self) -> HouseModifiers {
        match self {
            House::Gryffindor => HouseModifiers {
                atk_mult: 1.2,
                def_mult: 0.85,
                ..HouseModifiers::NEUTRAL
            },
            House::Slytherin => HouseModifiers {
                atk_mult: 1.1,
                crit_bonus: 5.0,
                ..HouseModifiers::NEUTRAL
            },
            House::Ravenclaw => HouseModifiers {
                crit_bonus: 8.0,
                xp_bonus: 0.15,
                ..HouseModifiers::NEUTRAL
            },
            House::Hufflepuff => HouseModifiers {
                hp_mult: 1.2,
                def_mult: 1.15,
                ..HouseModifiers::NEUTRAL
            },
        }
    }

    /// Element of the player's basic attack.
    pub fn affinity(self) -> Element {
        match self {
            House::Gryffindor => Element::Fire,
            House::Slytherin => Element::Water,
            House::Ravenclaw => Element::Air,
            House::Hufflepuff => Element::Earth,
        }
    }

    /// Spell id unlocked when the house is chosen.
    pub fn starter_spell(self) -> &'static str {
        match self {
            House::Gryffindor => "incendio",
            House::Slytherin => "serpensortia",
            House::Ravenclaw => "stupefy",
            House::Hufflepuff => "episkey",
        }
    }
}
