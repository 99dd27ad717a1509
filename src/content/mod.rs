//! # Content Module
//!
//! Read-only content tables consumed by the engine: houses, creatures,
//! spells, buffs and the encounter sequence of a run.
//!
//! The engine never mutates a catalog. A catalog can be the built-in
//! [`ContentCatalog::standard`] table or loaded from JSON.

pub mod buffs;
pub mod creatures;
pub mod houses;
pub mod spellbook;

pub use buffs::*;
pub use creatures::*;
pub use houses::*;
pub use spellbook::*;

use crate::utils::Dice;
use crate::{DuelError, DuelResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A creature id with a relative spawn weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedCreature {
    pub id: String,
    pub weight: u32,
}

/// One position in the encounter sequence of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterSlot {
    /// Always spawns this creature
    Fixed(String),
    /// Spawns one creature chosen by weight
    Weighted(Vec<WeightedCreature>),
}

impl EncounterSlot {
    /// Creates a weighted slot from `(id, weight)` pairs.
    pub fn weighted(entries: &[(&str, u32)]) -> Self {
        EncounterSlot::Weighted(
            entries
                .iter()
                .map(|(id, weight)| WeightedCreature {
                    id: id.to_string(),
                    weight: *weight,
                })
                .collect(),
        )
    }

    /// Creates a fixed slot.
    pub fn fixed(id: &str) -> Self {
        EncounterSlot::Fixed(id.to_string())
    }

    /// Resolves the slot to a creature id.
    pub fn choose(&self, dice: &mut dyn Dice) -> Option<&str> {
        match self {
            EncounterSlot::Fixed(id) => Some(id.as_str()),
            EncounterSlot::Weighted(entries) => {
                let total: u32 = entries.iter().map(|e| e.weight).sum();
                if total == 0 {
                    return entries.first().map(|e| e.id.as_str());
                }
                let mut target = dice.roll() * total as f64;
                for entry in entries {
                    target -= entry.weight as f64;
                    if target < 0.0 {
                        return Some(entry.id.as_str());
                    }
                }
                entries.last().map(|e| e.id.as_str())
            }
        }
    }

    fn creature_ids(&self) -> Vec<&str> {
        match self {
            EncounterSlot::Fixed(id) => vec![id.as_str()],
            EncounterSlot::Weighted(entries) => entries.iter().map(|e| e.id.as_str()).collect(),
        }
    }
}

/// The complete set of content tables for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCatalog {
    pub creatures: Vec<CreatureTemplate>,
    pub spells: Vec<SpellTemplate>,
    pub buffs: Vec<BuffTemplate>,
    /// Encounter order; the run is won once every slot is cleared
    pub sequence: Vec<EncounterSlot>,
}

impl ContentCatalog {
    /// The built-in content tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::ContentCatalog;
    ///
    /// let catalog = ContentCatalog::standard();
    /// assert!(catalog.validate().is_ok());
    /// assert!(catalog.spell("stupefy").is_some());
    /// ```
    pub fn standard() -> Self {
        Self {
            creatures: standard_creatures(),
            spells: standard_spells(),
            buffs: standard_buffs(),
            sequence: standard_sequence(),
        }
    }

    /// Loads and validates a catalog from JSON.
    pub fn from_json(json: &str) -> DuelResult<Self> {
        let catalog: ContentCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serializes the catalog to JSON.
    pub fn to_json(&self) -> DuelResult<String> {
        serde_json::to_string_pretty(self).map_err(DuelError::from)
    }

    /// Checks that every id referenced by the tables resolves.
    pub fn validate(&self) -> DuelResult<()> {
        if self.sequence.is_empty() {
            return Err(DuelError::InvalidConfig(
                "encounter sequence is empty".to_string(),
            ));
        }

        let creature_ids: HashSet<&str> = self.creatures.iter().map(|c| c.id.as_str()).collect();
        for (index, slot) in self.sequence.iter().enumerate() {
            let ids = slot.creature_ids();
            if ids.is_empty() {
                return Err(DuelError::InvalidConfig(format!(
                    "encounter slot {index} has no creatures"
                )));
            }
            for id in ids {
                if !creature_ids.contains(id) {
                    return Err(DuelError::UnknownContent(format!(
                        "creature '{id}' in encounter slot {index}"
                    )));
                }
            }
        }

        for buff in &self.buffs {
            if let BuffEffect::UnlockSpell(spell_id) = &buff.effect {
                if self.spell(spell_id).is_none() {
                    return Err(DuelError::UnknownContent(format!(
                        "spell '{spell_id}' unlocked by buff '{}'",
                        buff.id
                    )));
                }
            }
        }

        for house in House::all() {
            if self.spell(house.starter_spell()).is_none() {
                return Err(DuelError::UnknownContent(format!(
                    "starter spell '{}' for {}",
                    house.starter_spell(),
                    house.name()
                )));
            }
        }

        Ok(())
    }

    /// Looks up a creature template.
    pub fn creature(&self, id: &str) -> Option<&CreatureTemplate> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Looks up a spell template.
    pub fn spell(&self, id: &str) -> Option<&SpellTemplate> {
        self.spells.iter().find(|s| s.id == id)
    }

    /// Looks up a buff template.
    pub fn buff(&self, id: &str) -> Option<&BuffTemplate> {
        self.buffs.iter().find(|b| b.id == id)
    }

    /// Resolves the creature for a position in the encounter sequence.
    ///
    /// Returns `None` once the sequence is exhausted.
    pub fn creature_for_slot(&self, index: usize, dice: &mut dyn Dice) -> Option<&CreatureTemplate> {
        let slot = self.sequence.get(index)?;
        let id = slot.choose(dice)?;
        self.creature(id)
    }
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// The built-in encounter sequence: four acts, each closed by a boss.
pub fn standard_sequence() -> Vec<EncounterSlot> {
    vec![
        EncounterSlot::weighted(&[("pixie", 3), ("doxy", 2), ("grindylow", 1)]),
        EncounterSlot::weighted(&[("pixie", 1), ("doxy", 2), ("grindylow", 2)]),
        EncounterSlot::weighted(&[("grindylow", 2), ("salamander", 2)]),
        EncounterSlot::fixed("troll"),
        EncounterSlot::weighted(&[("salamander", 2), ("boggart", 2), ("red_cap", 1)]),
        EncounterSlot::weighted(&[("boggart", 1), ("red_cap", 2), ("inferius", 1)]),
        EncounterSlot::weighted(&[("red_cap", 1), ("inferius", 2), ("acromantula", 1)]),
        EncounterSlot::fixed("basilisk"),
        EncounterSlot::weighted(&[("inferius", 1), ("acromantula", 2), ("hippogriff", 2)]),
        EncounterSlot::weighted(&[("acromantula", 1), ("hippogriff", 2), ("dementor", 1)]),
        EncounterSlot::weighted(&[("hippogriff", 1), ("dementor", 3)]),
        EncounterSlot::fixed("hungarian_horntail"),
        EncounterSlot::weighted(&[("dementor", 2), ("acromantula", 1)]),
        EncounterSlot::fixed("dementor"),
        EncounterSlot::fixed("death_eater"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedDice;

    #[test]
    fn test_standard_catalog_validates() {
        assert!(ContentCatalog::standard().validate().is_ok());
    }

    #[test]
    fn test_weighted_slot_selection() {
        let slot = EncounterSlot::weighted(&[("a", 1), ("b", 3)]);
        assert_eq!(slot.choose(&mut FixedDice(0.0)), Some("a"));
        assert_eq!(slot.choose(&mut FixedDice(0.24)), Some("a"));
        assert_eq!(slot.choose(&mut FixedDice(0.26)), Some("b"));
        assert_eq!(slot.choose(&mut FixedDice(0.999)), Some("b"));
    }

    #[test]
    fn test_unknown_creature_rejected() {
        let mut catalog = ContentCatalog::standard();
        catalog.sequence.push(EncounterSlot::fixed("nargle"));
        assert!(matches!(
            catalog.validate(),
            Err(DuelError::UnknownContent(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = ContentCatalog::standard();
        let json = catalog.to_json().unwrap();
        let loaded = ContentCatalog::from_json(&json).unwrap();
        assert_eq!(loaded.creatures.len(), catalog.creatures.len());
        assert_eq!(loaded.sequence, catalog.sequence);
    }

    #[test]
    fn test_creature_for_slot_past_end() {
        let catalog = ContentCatalog::standard();
        let len = catalog.sequence.len();
        assert!(catalog.creature_for_slot(len, &mut FixedDice(0.5)).is_none());
        assert!(catalog.creature_for_slot(0, &mut FixedDice(0.5)).is_some());
    }
}
