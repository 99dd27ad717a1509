//! # Game Session
//!
//! Central owner of everything a run needs: the player, the current
//! encounter, the shield minigame, the content tables, the balance table and
//! the dice.
//!
//! All mutation goes through [`GameSession`] methods. The battle engine,
//! spell casting, progression and shield modules each add their own `impl`
//! block; this file holds construction, the command dispatcher and the
//! accessors.

use crate::content::{ContentCatalog, House};
use crate::game::{
    compute_stats, BalanceConfig, EffectiveStats, Encounter, EventQueue, GameEvent, LogCategory,
    Player, ShieldSession, Skill,
};
use crate::input::Command;
use crate::rendering::RenderSnapshot;
use crate::utils::{Dice, ThreadDice};
use crate::config::TUTORIAL_PAGES;
use crate::DuelResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which screen of the run is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a house to be chosen
    HouseSelection,
    /// Intro tutorial, zero-based page
    Tutorial { page: u8 },
    /// Auto-battle is running
    Battle,
    /// A shield minigame session owns the state
    ShieldMinigame,
    /// Waiting for one of the offered buffs to be picked
    BuffSelection { offer: Vec<String> },
    /// The run ended in defeat
    GameOver,
    /// Every encounter in the sequence was cleared
    Victory,
}

impl GamePhase {
    /// Whether the intro tutorial is showing.
    pub fn is_tutorial(&self) -> bool {
        matches!(self, GamePhase::Tutorial { .. })
    }

    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }

    /// Whether the run has started and not yet ended.
    pub fn is_in_run(&self) -> bool {
        matches!(
            self,
            GamePhase::Battle | GamePhase::ShieldMinigame | GamePhase::BuffSelection { .. }
        )
    }
}

/// Result of an inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// The command changed the session
    Applied,
    /// The command was not applicable and nothing changed
    Ignored,
}

impl CommandOutcome {
    /// Whether the command changed the session.
    pub fn is_applied(self) -> bool {
        self == CommandOutcome::Applied
    }
}

/// One run of the duel game.
pub struct GameSession {
    pub(crate) config: BalanceConfig,
    pub(crate) catalog: ContentCatalog,
    pub(crate) player: Player,
    pub(crate) encounter: Option<Encounter>,
    pub(crate) shield: Option<ShieldSession>,
    pub(crate) phase: GamePhase,
    pub(crate) dice: Box<dyn Dice>,
    pub(crate) events: EventQueue,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("player", &self.player)
            .field("encounter", &self.encounter)
            .field("shield", &self.shield)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Creates a session with the built-in content, the canonical balance
    /// table and unseeded dice.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::{GamePhase, GameSession};
    ///
    /// let session = GameSession::new();
    /// assert_eq!(*session.phase(), GamePhase::HouseSelection);
    /// assert!(session.encounter().is_none());
    /// ```
    pub fn new() -> Self {
        Self::with_parts(
            BalanceConfig::new(),
            ContentCatalog::standard(),
            Box::new(ThreadDice),
        )
    }

    /// Creates a session with the default tables and the given dice.
    pub fn with_dice(dice: impl Dice + 'static) -> Self {
        Self::with_parts(BalanceConfig::new(), ContentCatalog::standard(), Box::new(dice))
    }

    /// Creates a session from explicit parts.
    pub fn with_parts(config: BalanceConfig, catalog: ContentCatalog, dice: Box<dyn Dice>) -> Self {
        let player = Player::new(&config);
        Self {
            config,
            catalog,
            player,
            encounter: None,
            shield: None,
            phase: GamePhase::HouseSelection,
            dice,
            events: EventQueue::new(),
        }
    }

    /// Resumes a run from a saved player.
    ///
    /// Encounters and shield sessions are never saved, so a resumed run
    /// spawns a fresh opponent for the player's current slot.
    pub fn resume(
        player: Player,
        config: BalanceConfig,
        catalog: ContentCatalog,
        dice: Box<dyn Dice>,
    ) -> DuelResult<Self> {
        config.validate()?;
        catalog.validate()?;

        let mut session = Self::with_parts(config, catalog, dice);
        session.player = player;

        let max_hp = session.stats().max_hp;
        session.player.hp = session.player.hp.min(max_hp);

        if session.player.house.is_none() {
            session.phase = GamePhase::HouseSelection;
        } else if session.player.hp <= 0 {
            session.phase = GamePhase::GameOver;
        } else if session.player.encounter_index >= session.catalog.sequence.len() {
            session.phase = GamePhase::Victory;
        } else {
            session.spawn_next_encounter();
        }

        log::info!(
            "Resumed run {} on floor {} ({:?})",
            session.player.run_id,
            session.player.floor,
            session.phase
        );
        Ok(session)
    }

    /// Applies an inbound command.
    ///
    /// Commands that do not apply to the current state are ignored and
    /// change nothing.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        log::debug!("Command {:?} in phase {:?}", command, self.phase);
        match command {
            Command::SelectHouse(house) => self.select_house(house),
            Command::AdvanceTutorialPage => self.advance_tutorial_page(),
            Command::CastSpell(spell_id) => self.cast_spell(&spell_id),
            Command::SelectBuff(buff_id) => self.select_buff(&buff_id),
            Command::PressShieldColor(color) => self.press_shield_color(color),
            Command::RestartRun => {
                self.restart_run();
                CommandOutcome::Applied
            }
            Command::SpendSkillPoint(skill) => self.spend_skill_point(skill),
        }
    }

    /// Chooses the house for this run and unlocks its starter spell.
    pub fn select_house(&mut self, house: House) -> CommandOutcome {
        if self.phase != GamePhase::HouseSelection {
            return CommandOutcome::Ignored;
        }

        self.player.house = Some(house);
        self.player.unlock_spell(house.starter_spell());
        self.player.hp = self.stats().max_hp;
        self.player.lifetime.runs_started += 1;

        self.events
            .log(format!("You join {}.", house.name()), LogCategory::System);
        log::info!("Run {} started as {}", self.player.run_id, house.name());

        if self.player.lifetime.intro_tutorial_done {
            self.spawn_next_encounter();
        } else {
            self.phase = GamePhase::Tutorial { page: 0 };
            self.events.push(GameEvent::StateChanged);
        }
        CommandOutcome::Applied
    }

    /// Advances the intro tutorial, or dismisses the shield tutorial prompt.
    pub fn advance_tutorial_page(&mut self) -> CommandOutcome {
        match self.phase {
            GamePhase::Tutorial { page } => {
                let next = page + 1;
                if next >= TUTORIAL_PAGES {
                    self.player.lifetime.intro_tutorial_done = true;
                    self.spawn_next_encounter();
                } else {
                    self.phase = GamePhase::Tutorial { page: next };
                    self.events.push(GameEvent::StateChanged);
                }
                CommandOutcome::Applied
            }
            GamePhase::ShieldMinigame => self.acknowledge_shield_tutorial(),
            _ => CommandOutcome::Ignored,
        }
    }

    /// Spends a skill point on a skill.
    pub fn spend_skill_point(&mut self, skill: Skill) -> CommandOutcome {
        if self.player.house.is_none() || self.phase.is_terminal() {
            return CommandOutcome::Ignored;
        }
        if !self.player.spend_skill_point(skill) {
            return CommandOutcome::Ignored;
        }
        self.events.log(
            format!(
                "{:?} trained to level {}.",
                skill,
                self.player.skills.level(skill)
            ),
            LogCategory::LevelUp,
        );
        self.events.push(GameEvent::StateChanged);
        self.events.push(GameEvent::SaveRequested);
        CommandOutcome::Applied
    }

    /// Throws the current run away and starts over at house selection.
    ///
    /// Lifetime progress (tutorials seen, bosses met, gold earned) survives.
    pub fn restart_run(&mut self) {
        log::info!(
            "Restarting run {} (floor {}, {} kills)",
            self.player.run_id,
            self.player.floor,
            self.player.stats.kills
        );
        self.player = self.player.next_run(&self.config);
        self.encounter = None;
        self.shield = None;
        self.phase = GamePhase::HouseSelection;
        self.events.clear();
        self.events
            .log("A new duel begins. Choose your house.", LogCategory::System);
        self.events.push(GameEvent::StateChanged);
        self.events.push(GameEvent::SaveRequested);
    }

    /// Replaces the current encounter and enters battle.
    pub fn engage(&mut self, encounter: Encounter) {
        self.encounter = Some(encounter);
        self.shield = None;
        self.phase = GamePhase::Battle;
        self.events.push(GameEvent::StateChanged);
    }

    /// Resolves the player's effective stats right now.
    pub fn stats(&self) -> EffectiveStats {
        compute_stats(&self.player, &self.config)
    }

    /// Takes every pending outbound event.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Read-only projection of the session for drawing a frame.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }

    /// Whether the run has ended.
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player, for tools and tests.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    pub fn encounter_mut(&mut self) -> Option<&mut Encounter> {
        self.encounter.as_mut()
    }

    pub fn shield(&self) -> Option<&ShieldSession> {
        self.shield.as_ref()
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Heals the player, clamped to max HP. Returns the HP restored.
    pub(crate) fn heal_player(&mut self, amount: i64, max_hp: i64) -> i64 {
        let (next, gained) = crate::utils::heal_clamped(self.player.hp, amount, max_hp);
        self.player.hp = next;
        gained
    }

    /// Removes HP from the player, clamping at zero. Returns the HP removed.
    pub(crate) fn hurt_player(&mut self, amount: i64) -> i64 {
        if amount <= 0 || self.player.hp <= 0 {
            return 0;
        }
        let dealt = amount.min(self.player.hp);
        self.player.hp -= dealt;
        self.player.stats.damage_taken += dealt as u64;
        dealt
    }

    /// Ends the run in defeat.
    pub(crate) fn game_over(&mut self) {
        self.player.hp = 0;
        self.player.stats.combo = 0;
        self.shield = None;
        self.phase = GamePhase::GameOver;
        self.events.log(
            format!(
                "You have fallen on floor {}. Kills: {}, best combo: {}.",
                self.player.floor, self.player.stats.kills, self.player.stats.max_combo
            ),
            LogCategory::Death,
        );
        self.events
            .sound(110.0, crate::game::Waveform::Sawtooth, 0.8);
        self.events.push(GameEvent::StateChanged);
        self.events.push(GameEvent::SaveRequested);
        log::info!(
            "Run {} ended on floor {} after {} kills",
            self.player.run_id,
            self.player.floor,
            self.player.stats.kills
        );
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedDice;

    fn session() -> GameSession {
        GameSession::with_dice(FixedDice(0.99))
    }

    #[test]
    fn test_select_house_enters_tutorial() {
        let mut session = session();
        assert!(session.select_house(House::Hufflepuff).is_applied());
        assert_eq!(session.phase, GamePhase::Tutorial { page: 0 });
        assert!(session.player.knows_spell("episkey"));
        // Hufflepuff raises max HP, and the run starts at full HP
        assert_eq!(session.player.hp, 120);
    }

    #[test]
    fn test_select_house_twice_is_ignored() {
        let mut session = session();
        session.select_house(House::Gryffindor);
        assert_eq!(
            session.select_house(House::Slytherin),
            CommandOutcome::Ignored
        );
        assert_eq!(session.player.house, Some(House::Gryffindor));
    }

    #[test]
    fn test_tutorial_pages_lead_to_battle() {
        let mut session = session();
        session.select_house(House::Ravenclaw);
        for _ in 0..TUTORIAL_PAGES {
            assert!(session.phase.is_tutorial());
            session.advance_tutorial_page();
        }
        assert_eq!(session.phase, GamePhase::Battle);
        assert!(session.encounter.is_some());
        assert!(session.player.lifetime.intro_tutorial_done);
    }

    #[test]
    fn test_tutorial_skipped_once_seen() {
        let mut session = session();
        session.player.lifetime.intro_tutorial_done = true;
        session.select_house(House::Ravenclaw);
        assert_eq!(session.phase, GamePhase::Battle);
    }

    #[test]
    fn test_restart_keeps_lifetime() {
        let mut session = session();
        session.player.lifetime.intro_tutorial_done = true;
        session.select_house(House::Slytherin);
        session.player.gold = 99;
        session.restart_run();
        assert_eq!(session.phase, GamePhase::HouseSelection);
        assert_eq!(session.player.gold, 0);
        assert!(session.encounter.is_none());
        assert!(session.player.lifetime.intro_tutorial_done);
        assert_eq!(session.player.lifetime.runs_started, 1);
    }

    #[test]
    fn test_skill_point_needs_a_run() {
        let mut session = session();
        session.player.skill_points = 1;
        assert_eq!(
            session.spend_skill_point(Skill::Vitality),
            CommandOutcome::Ignored
        );
        session.select_house(House::Gryffindor);
        assert!(session.spend_skill_point(Skill::Vitality).is_applied());
        assert_eq!(session.player.skills.vitality, 1);
    }

    #[test]
    fn test_resume_spawns_encounter() {
        let config = BalanceConfig::new();
        let mut player = Player::new(&config);
        player.house = Some(House::Gryffindor);
        player.encounter_index = 2;
        player.floor = 3;
        let session = GameSession::resume(
            player,
            config,
            ContentCatalog::standard(),
            Box::new(FixedDice(0.5)),
        )
        .unwrap();
        assert_eq!(session.phase, GamePhase::Battle);
        assert!(session.encounter.is_some());
    }

    #[test]
    fn test_resume_past_sequence_is_victory() {
        let config = BalanceConfig::new();
        let catalog = ContentCatalog::standard();
        let mut player = Player::new(&config);
        player.house = Some(House::Gryffindor);
        player.encounter_index = catalog.sequence.len();
        let session =
            GameSession::resume(player, config, catalog, Box::new(FixedDice(0.5))).unwrap();
        assert_eq!(session.phase, GamePhase::Victory);
    }
}
