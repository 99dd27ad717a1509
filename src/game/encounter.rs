//! # Encounter State
//!
//! The current opponent. Created from a template when it spawns and thrown
//! away when it dies or the run ends.

use crate::content::{Ability, CreatureTemplate};
use crate::game::Element;
use serde::{Deserialize, Serialize};

/// Combat-scoped state of the current opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// Template the encounter was spawned from
    pub template_id: String,
    pub name: String,
    pub icon: String,
    pub element: Element,
    pub abilities: Vec<Ability>,
    pub is_boss: bool,

    /// Current HP; zero is the death sentinel
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub gold: u64,

    /// One-shot damage-halving token
    pub has_shield: bool,
    /// Set once below the enrage threshold
    pub enraged: bool,
    /// Voids the player's next basic attack
    pub disarm_armed: bool,
    pub shield_phase1_triggered: bool,
    pub shield_phase2_triggered: bool,
    /// Death rewards have been granted
    pub rewarded: bool,
}

impl Encounter {
    /// Creates a plain neutral encounter with the given stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::{Ability, Encounter};
    ///
    /// let troll = Encounter::new("Troll", 120, 9).with_abilities(&[Ability::Enrage]).boss();
    /// assert_eq!(troll.hp, 120);
    /// assert!(troll.has(Ability::Enrage));
    /// assert!(troll.is_boss);
    /// ```
    pub fn new(name: &str, max_hp: i64, atk: i64) -> Self {
        Self {
            template_id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            icon: String::new(),
            element: Element::Light,
            abilities: Vec::new(),
            is_boss: false,
            hp: max_hp,
            max_hp,
            atk,
            gold: 0,
            has_shield: false,
            enraged: false,
            disarm_armed: false,
            shield_phase1_triggered: false,
            shield_phase2_triggered: false,
            rewarded: false,
        }
    }

    /// Creates an encounter from a template with already-scaled stats.
    pub fn from_template(template: &CreatureTemplate, max_hp: i64, atk: i64, gold: u64) -> Self {
        Self {
            template_id: template.id.clone(),
            name: template.name.clone(),
            icon: template.icon.clone(),
            element: template.element,
            abilities: template.abilities.clone(),
            is_boss: template.is_boss,
            gold,
            ..Self::new(&template.name, max_hp.max(1), atk.max(1))
        }
    }

    /// Sets the elemental affinity.
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Adds abilities.
    pub fn with_abilities(mut self, abilities: &[Ability]) -> Self {
        self.abilities.extend_from_slice(abilities);
        self
    }

    /// Sets the gold reward.
    pub fn with_gold(mut self, gold: u64) -> Self {
        self.gold = gold;
        self
    }

    /// Marks the encounter as a boss.
    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    /// Whether the encounter has an ability.
    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    /// Whether the encounter is dead.
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Current HP as a fraction of max HP.
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    /// Removes HP, clamping at zero. Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: i64) -> i64 {
        if amount <= 0 || self.hp <= 0 {
            return 0;
        }
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restores HP up to max. Returns the HP actually restored.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let (next, gained) = crate::utils::heal_clamped(self.hp, amount, self.max_hp);
        self.hp = next;
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut enc = Encounter::new("Pixie", 20, 3);
        assert_eq!(enc.take_damage(15), 15);
        assert_eq!(enc.take_damage(15), 5);
        assert_eq!(enc.hp, 0);
        assert!(enc.is_dead());
        assert_eq!(enc.take_damage(5), 0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut enc = Encounter::new("Pixie", 20, 3);
        enc.hp = 18;
        assert_eq!(enc.heal(5), 2);
        assert_eq!(enc.hp, 20);
    }

    #[test]
    fn test_hp_ratio() {
        let mut enc = Encounter::new("Troll", 200, 10);
        enc.hp = 100;
        assert_eq!(enc.hp_ratio(), 0.5);
    }
}
