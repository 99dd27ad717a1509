//! # Command Definitions
//!
//! The inbound commands a UI may send to a [`GameSession`](crate::GameSession).

use crate::content::House;
use crate::game::{ShieldColor, Skill};
use serde::{Deserialize, Serialize};

/// An inbound action from the input layer.
///
/// Commands serialize to JSON so they can cross a process or thread
/// boundary unchanged.
///
/// # Examples
///
/// ```
/// use wizard_duel::{Command, House};
///
/// let json = serde_json::to_string(&Command::SelectHouse(House::Ravenclaw)).unwrap();
/// let back: Command = serde_json::from_str(&json).unwrap();
/// assert_eq!(back, Command::SelectHouse(House::Ravenclaw));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Choose a house at the start of a run
    SelectHouse(House),
    /// Turn a tutorial page, or dismiss the shield tutorial
    AdvanceTutorialPage,
    /// Cast a spell by id
    CastSpell(String),
    /// Pick one of the offered buffs by id
    SelectBuff(String),
    /// Press a shield color during the minigame
    PressShieldColor(ShieldColor),
    /// Abandon the run and start over
    RestartRun,
    /// Spend a skill point
    SpendSkillPoint(Skill),
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectHouse(_) => "select_house",
            Command::AdvanceTutorialPage => "advance_tutorial_page",
            Command::CastSpell(_) => "cast_spell",
            Command::SelectBuff(_) => "select_buff",
            Command::PressShieldColor(_) => "press_shield_color",
            Command::RestartRun => "restart_run",
            Command::SpendSkillPoint(_) => "spend_skill_point",
        }
    }
}
