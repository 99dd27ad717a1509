//! # Game Module
//!
//! The rules core: player and encounter records, the stats resolver, the
//! battle engine, spell casting, run progression and the shield minigame.
//!
//! This module contains the fundamental building blocks of a duel:
//! - Run-scoped player state and combat-scoped encounter state
//! - The per-tick battle algorithm and the damage math behind it
//! - Encounter spawning, scaling and reward resolution
//! - The boss shield minigame state machine
//! - The [`GameSession`] that owns all of the above

pub mod balance;
pub mod battle;
pub mod casting;
pub mod encounter;
pub mod events;
pub mod player;
pub mod progression;
pub mod scaling;
pub mod selection;
pub mod shield;
pub mod state;
pub mod stats;

pub use balance::*;
pub use battle::*;
pub use casting::*;
pub use encounter::*;
pub use events::*;
pub use player::*;
pub use progression::*;
pub use scaling::*;
pub use selection::*;
pub use shield::*;
pub use state::*;
pub use stats::*;

use serde::{Deserialize, Serialize};

/// Elemental affinity of an attack or a creature.
///
/// Fire, Earth, Air and Water form a cycle where each beats the next:
/// Fire → Earth → Air → Water → Fire. Light and Dark are neutral and
/// never gain or lose from affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
    Light,
    Dark,
}

impl Element {
    /// Damage multiplier when attacking the element it beats.
    pub const ADVANTAGE: f64 = 1.5;

    /// Damage multiplier when attacking the element it is weak to.
    pub const DISADVANTAGE: f64 = 0.6;

    /// Returns all elements.
    pub fn all() -> [Element; 6] {
        [
            Element::Fire,
            Element::Earth,
            Element::Air,
            Element::Water,
            Element::Light,
            Element::Dark,
        ]
    }

    /// The element this one beats, if it is part of the cycle.
    pub fn beats(self) -> Option<Element> {
        match self {
            Element::Fire => Some(Element::Earth),
            Element::Earth => Some(Element::Air),
            Element::Air => Some(Element::Water),
            Element::Water => Some(Element::Fire),
            Element::Light | Element::Dark => None,
        }
    }

    /// Whether this element sits outside the cycle.
    pub fn is_neutral(self) -> bool {
        self.beats().is_none()
    }

    /// Damage multiplier for an attack of this element against `defender`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::Element;
    ///
    /// assert_eq!(Element::Fire.multiplier_against(Element::Earth), 1.5);
    /// assert_eq!(Element::Earth.multiplier_against(Element::Fire), 0.6);
    /// assert_eq!(Element::Fire.multiplier_against(Element::Air), 1.0);
    /// assert_eq!(Element::Dark.multiplier_against(Element::Fire), 1.0);
    /// ```
    pub fn multiplier_against(self, defender: Element) -> f64 {
        if self.beats() == Some(defender) {
            Self::ADVANTAGE
        } else if defender.beats() == Some(self) {
            Self::DISADVANTAGE
        } else {
            1.0
        }
    }
}
