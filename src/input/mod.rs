//! # Input Module
//!
//! Inbound commands and a key-binding layer that turns raw key presses into
//! commands for the current screen.

pub mod commands;

pub use commands::*;

use crate::content::House;
use crate::game::{GamePhase, GameSession, ShieldColor, Skill};

/// Abstract player input, before it is interpreted for the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// A numbered choice, 1-based
    Choice(u8),
    /// A shield color key
    Color(ShieldColor),
    /// Confirm / continue
    Confirm,
    /// Start a new run
    NewGame,
    /// Train a skill
    Train(Skill),
}

/// Maps key presses to commands.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether number keys 1-4 also press shield colors
    pub number_keys_for_shield: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a handler with the default bindings.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::{Command, GameSession, House, InputHandler};
    ///
    /// let handler = InputHandler::new();
    /// let session = GameSession::new();
    /// assert_eq!(
    ///     handler.key_to_command('1', &session),
    ///     Some(Command::SelectHouse(House::Gryffindor))
    /// );
    /// ```
    pub fn new() -> Self {
        Self {
            number_keys_for_shield: true,
        }
    }

    /// Interprets a key as abstract input.
    pub fn key_to_input(&self, key: char) -> Option<PlayerInput> {
        match key.to_ascii_lowercase() {
            c @ '1'..='9' => Some(PlayerInput::Choice(c as u8 - b'0')),
            'r' => Some(PlayerInput::Color(ShieldColor::Red)),
            'b' => Some(PlayerInput::Color(ShieldColor::Blue)),
            'g' => Some(PlayerInput::Color(ShieldColor::Green)),
            'y' => Some(PlayerInput::Color(ShieldColor::Yellow)),
            ' ' | '\n' | '\r' => Some(PlayerInput::Confirm),
            'n' => Some(PlayerInput::NewGame),
            'v' => Some(PlayerInput::Train(Skill::Vitality)),
            'f' => Some(PlayerInput::Train(Skill::Fortune)),
            's' => Some(PlayerInput::Train(Skill::Scholar)),
            _ => None,
        }
    }

    /// Interprets a key for the session's current screen.
    pub fn key_to_command(&self, key: char, session: &GameSession) -> Option<Command> {
        self.input_to_command(self.key_to_input(key)?, session)
    }

    /// Converts abstract input to a command for the current screen.
    ///
    /// Returns `None` when the input means nothing on this screen.
    pub fn input_to_command(&self, input: PlayerInput, session: &GameSession) -> Option<Command> {
        if let PlayerInput::Train(skill) = input {
            return Some(Command::SpendSkillPoint(skill));
        }

        match (session.phase(), input) {
            (GamePhase::HouseSelection, PlayerInput::Choice(n)) => House::all()
                .get(n.checked_sub(1)? as usize)
                .map(|h| Command::SelectHouse(*h)),
            (GamePhase::Tutorial { .. }, PlayerInput::Confirm) => {
                Some(Command::AdvanceTutorialPage)
            }
            (GamePhase::Battle, PlayerInput::Choice(n)) => session
                .player()
                .unlocked_spells
                .iter()
                .nth(n.checked_sub(1)? as usize)
                .map(|id| Command::CastSpell(id.clone())),
            (GamePhase::ShieldMinigame, PlayerInput::Confirm) => {
                Some(Command::AdvanceTutorialPage)
            }
            (GamePhase::ShieldMinigame, PlayerInput::Color(color)) => {
                Some(Command::PressShieldColor(color))
            }
            (GamePhase::ShieldMinigame, PlayerInput::Choice(n)) if self.number_keys_for_shield => {
                ShieldColor::all()
                    .get(n.checked_sub(1)? as usize)
                    .map(|c| Command::PressShieldColor(*c))
            }
            (GamePhase::BuffSelection { offer }, PlayerInput::Choice(n)) => offer
                .get(n.checked_sub(1)? as usize)
                .map(|id| Command::SelectBuff(id.clone())),
            (
                GamePhase::GameOver | GamePhase::Victory,
                PlayerInput::Confirm | PlayerInput::NewGame,
            ) => Some(Command::RestartRun),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedDice;

    #[test]
    fn test_house_keys() {
        let handler = InputHandler::new();
        let session = GameSession::with_dice(FixedDice(0.5));
        assert_eq!(
            handler.key_to_command('4', &session),
            Some(Command::SelectHouse(House::Hufflepuff))
        );
        assert_eq!(handler.key_to_command('5', &session), None);
        assert_eq!(handler.key_to_command('x', &session), None);
    }

    #[test]
    fn test_spell_keys_follow_unlocked_order() {
        let handler = InputHandler::new();
        let mut session = GameSession::with_dice(FixedDice(0.5));
        session.player_mut().lifetime.intro_tutorial_done = true;
        session.select_house(House::Gryffindor);
        session.player_mut().unlock_spell("aguamenti");
        assert_eq!(
            handler.key_to_command('1', &session),
            Some(Command::CastSpell("aguamenti".into()))
        );
        assert_eq!(
            handler.key_to_command('2', &session),
            Some(Command::CastSpell("incendio".into()))
        );
    }

    #[test]
    fn test_restart_only_after_the_run_ends() {
        let handler = InputHandler::new();
        let mut session = GameSession::with_dice(FixedDice(0.5));
        assert_eq!(handler.key_to_command('N', &session), None);

        session.player_mut().lifetime.intro_tutorial_done = true;
        session.select_house(House::Gryffindor);
        assert_eq!(*session.phase(), GamePhase::Battle);
        assert_eq!(handler.key_to_command('n', &session), None);

        for phase in [GamePhase::GameOver, GamePhase::Victory] {
            session.phase = phase;
            assert_eq!(handler.key_to_command('N', &session), Some(Command::RestartRun));
            assert_eq!(handler.key_to_command(' ', &session), Some(Command::RestartRun));
        }
    }

    #[test]
    fn test_color_keys_only_in_minigame() {
        let handler = InputHandler::new();
        let session = GameSession::with_dice(FixedDice(0.5));
        assert_eq!(handler.key_to_command('r', &session), None);
    }
}
