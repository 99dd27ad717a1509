//! # Shield Minigame
//!
//! A reflex interrupt during boss fights. The boss casts a queue of colored
//! spells; each one has to be blocked by pressing the matching color before
//! its deadline.
//!
//! [`ShieldSession`] is a pure state machine driven by button presses and
//! elapsed milliseconds. The [`GameSession`] glue at the bottom of this file
//! turns its steps into damage, rewards and events.

use crate::game::{
    Anchor, BalanceConfig, CommandOutcome, GameEvent, GamePhase, GameSession, LogCategory,
    Waveform,
};
use crate::utils::{floor_mul, Dice};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The four spell colors a boss can cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl ShieldColor {
    /// The full palette.
    pub fn all() -> [ShieldColor; 4] {
        [
            ShieldColor::Red,
            ShieldColor::Blue,
            ShieldColor::Green,
            ShieldColor::Yellow,
        ]
    }

    /// Hex color for drawing.
    pub fn hex(self) -> &'static str {
        match self {
            ShieldColor::Red => "#e53935",
            ShieldColor::Blue => "#1e88e5",
            ShieldColor::Green => "#43a047",
            ShieldColor::Yellow => "#fdd835",
        }
    }
}

/// Where a shield session is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldStage {
    /// Waiting for the player to dismiss the tutorial
    TutorialPrompt,
    /// A color is active and its timer is running
    Challenge,
    /// Showing the last result before the next color
    Pause { remaining_ms: u64 },
    /// The queue is exhausted
    Resolved,
}

/// Outcome of a single challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldResult {
    Blocked,
    WrongColor,
    TimedOut,
}

impl ShieldResult {
    /// Text shown under the shield after a challenge.
    pub fn text(self) -> &'static str {
        match self {
            ShieldResult::Blocked => "Blocked!",
            ShieldResult::WrongColor => "Wrong shield!",
            ShieldResult::TimedOut => "Too slow!",
        }
    }
}

/// A transition of the shield state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldStep {
    /// The input did not apply
    Ignored,
    /// A spell was blocked
    Blocked,
    /// A spell got through
    Failed(ShieldResult),
    /// A new color is active
    NextChallenge(ShieldColor),
    /// The queue is exhausted
    Finished { perfect: bool },
}

/// One run of the shield minigame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldSession {
    pub is_tutorial: bool,
    queue: VecDeque<ShieldColor>,
    /// Number of spells in the session
    pub total: usize,
    /// The active challenge, if any
    pub current: Option<ShieldColor>,
    pub time_left_ms: u64,
    pub deadline_ms: u64,
    pause_ms: u64,
    pub succeeded: u32,
    pub failed: u32,
    pub stage: ShieldStage,
    pub last_result: Option<ShieldResult>,
}

impl ShieldSession {
    /// Creates a session with a random queue sized and timed for `floor`.
    ///
    /// A tutorial session opens on its prompt; a normal one starts its
    /// first challenge immediately.
    pub fn new(is_tutorial: bool, floor: u32, config: &BalanceConfig, dice: &mut dyn Dice) -> Self {
        let count = if is_tutorial {
            config.shield_spells_tutorial
        } else {
            config.shield_spells_normal
        };
        let palette = ShieldColor::all();
        let queue = (0..count).map(|_| palette[dice.pick(palette.len())]);
        Self::with_queue(is_tutorial, queue, floor, config)
    }

    /// Creates a session with a fixed queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_duel::{BalanceConfig, ShieldColor, ShieldSession, ShieldStep};
    ///
    /// let config = BalanceConfig::new();
    /// let mut shield = ShieldSession::with_queue(false, [ShieldColor::Red], 1, &config);
    /// assert_eq!(shield.current, Some(ShieldColor::Red));
    /// assert_eq!(shield.press(ShieldColor::Red), ShieldStep::Blocked);
    /// ```
    pub fn with_queue(
        is_tutorial: bool,
        queue: impl IntoIterator<Item = ShieldColor>,
        floor: u32,
        config: &BalanceConfig,
    ) -> Self {
        let queue: VecDeque<ShieldColor> = queue.into_iter().collect();
        let mut session = Self {
            is_tutorial,
            total: queue.len(),
            queue,
            current: None,
            time_left_ms: 0,
            deadline_ms: config.shield_deadline_ms(is_tutorial, floor),
            pause_ms: if is_tutorial {
                config.shield_pause_tutorial_ms
            } else {
                config.shield_pause_normal_ms
            },
            succeeded: 0,
            failed: 0,
            stage: ShieldStage::TutorialPrompt,
            last_result: None,
        };
        if !is_tutorial {
            session.start_next();
        }
        session
    }

    /// Dismisses the tutorial prompt and starts the first challenge.
    pub fn acknowledge_tutorial(&mut self) -> ShieldStep {
        if self.stage != ShieldStage::TutorialPrompt {
            return ShieldStep::Ignored;
        }
        self.start_next()
    }

    /// Handles a color press.
    pub fn press(&mut self, color: ShieldColor) -> ShieldStep {
        let Some(current) = self.current else {
            return ShieldStep::Ignored;
        };
        if self.stage != ShieldStage::Challenge {
            return ShieldStep::Ignored;
        }
        if color == current {
            self.succeeded += 1;
            self.end_challenge(ShieldResult::Blocked);
            ShieldStep::Blocked
        } else {
            self.failed += 1;
            self.end_challenge(ShieldResult::WrongColor);
            ShieldStep::Failed(ShieldResult::WrongColor)
        }
    }

    /// Advances the countdown and pause timers.
    ///
    /// A single call may cross several boundaries; every transition is
    /// returned in order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<ShieldStep> {
        let mut steps = Vec::new();
        let mut budget = elapsed_ms;
        loop {
            match self.stage {
                ShieldStage::Challenge => {
                    if budget < self.time_left_ms {
                        self.time_left_ms -= budget;
                        break;
                    }
                    budget -= self.time_left_ms;
                    self.time_left_ms = 0;
                    self.failed += 1;
                    self.end_challenge(ShieldResult::TimedOut);
                    steps.push(ShieldStep::Failed(ShieldResult::TimedOut));
                }
                ShieldStage::Pause { remaining_ms } => {
                    if budget < remaining_ms {
                        self.stage = ShieldStage::Pause {
                            remaining_ms: remaining_ms - budget,
                        };
                        break;
                    }
                    budget -= remaining_ms;
                    steps.push(self.start_next());
                }
                ShieldStage::TutorialPrompt | ShieldStage::Resolved => break,
            }
        }
        steps
    }

    /// Whether the session has run out of spells.
    pub fn is_resolved(&self) -> bool {
        self.stage == ShieldStage::Resolved
    }

    /// Whether every spell was blocked. An empty session is never perfect.
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.succeeded as usize == self.total
    }

    /// Remaining time of the active challenge, from 1.0 down to 0.0.
    pub fn timer_fraction(&self) -> f64 {
        if self.stage != ShieldStage::Challenge || self.deadline_ms == 0 {
            return 0.0;
        }
        self.time_left_ms as f64 / self.deadline_ms as f64
    }

    /// Spells not yet cast.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn end_challenge(&mut self, result: ShieldResult) {
        self.current = None;
        self.last_result = Some(result);
        self.stage = ShieldStage::Pause {
            remaining_ms: self.pause_ms,
        };
    }

    fn start_next(&mut self) -> ShieldStep {
        match self.queue.pop_front() {
            Some(color) => {
                self.current = Some(color);
                self.time_left_ms = self.deadline_ms;
                self.stage = ShieldStage::Challenge;
                ShieldStep::NextChallenge(color)
            }
            None => {
                self.current = None;
                self.stage = ShieldStage::Resolved;
                ShieldStep::Finished {
                    perfect: self.is_perfect(),
                }
            }
        }
    }
}

impl GameSession {
    /// Presses a shield color during the minigame.
    pub fn press_shield_color(&mut self, color: ShieldColor) -> CommandOutcome {
        if self.phase != GamePhase::ShieldMinigame {
            return CommandOutcome::Ignored;
        }
        let step = match self.shield.as_mut() {
            Some(shield) => shield.press(color),
            None => return CommandOutcome::Ignored,
        };
        if step == ShieldStep::Ignored {
            return CommandOutcome::Ignored;
        }
        self.handle_shield_steps(vec![step]);
        CommandOutcome::Applied
    }

    /// Feeds elapsed wall-clock time to the shield minigame.
    pub fn advance_shield(&mut self, elapsed_ms: u64) -> Vec<ShieldStep> {
        if self.phase != GamePhase::ShieldMinigame {
            return Vec::new();
        }
        let steps = match self.shield.as_mut() {
            Some(shield) => shield.advance(elapsed_ms),
            None => return Vec::new(),
        };
        self.handle_shield_steps(steps.clone());
        steps
    }

    pub(crate) fn acknowledge_shield_tutorial(&mut self) -> CommandOutcome {
        let step = match self.shield.as_mut() {
            Some(shield) => shield.acknowledge_tutorial(),
            None => return CommandOutcome::Ignored,
        };
        if step == ShieldStep::Ignored {
            return CommandOutcome::Ignored;
        }
        self.handle_shield_steps(vec![step]);
        CommandOutcome::Applied
    }

    fn handle_shield_steps(&mut self, steps: Vec<ShieldStep>) {
        for step in steps {
            match step {
                ShieldStep::Ignored => {}
                ShieldStep::NextChallenge(color) => {
                    self.events.particles(Anchor::Enemy, color.hex(), 12);
                    self.events.sound(520.0, Waveform::Sine, 0.15);
                }
                ShieldStep::Blocked => {
                    self.player.stats.shields_blocked += 1;
                    self.events.float("BLOCKED", Anchor::Player, LogCategory::Shield);
                    self.events.sound(980.0, Waveform::Sine, 0.12);
                }
                ShieldStep::Failed(result) => {
                    self.player.stats.shields_failed += 1;
                    if !self.shield_penalty(result) {
                        return;
                    }
                }
                ShieldStep::Finished { perfect } => self.finish_shield(perfect),
            }
            self.events.push(GameEvent::StateChanged);
        }
    }

    /// Deals the penalty for a spell that got through. Returns false when it
    /// ended the run.
    ///
    /// This death path never consults death saves or the revival.
    fn shield_penalty(&mut self, result: ShieldResult) -> bool {
        let is_tutorial = self.shield.as_ref().map_or(false, |s| s.is_tutorial);
        let fraction = if is_tutorial {
            self.config.shield_penalty_tutorial
        } else {
            self.config.shield_penalty_normal
        };
        let enemy_atk = self.encounter.as_ref().map_or(0, |e| e.atk);
        let damage = floor_mul(enemy_atk, fraction);
        let dealt = self.hurt_player(damage);

        self.events
            .float(format!("-{dealt}"), Anchor::Player, LogCategory::Shield);
        self.events.log(
            format!("{} The spell hits you for {dealt}.", result.text()),
            LogCategory::Shield,
        );
        self.events.shake();

        if self.player.hp <= 0 {
            log::info!("Player fell during a shield session");
            self.shield = None;
            self.game_over();
            return false;
        }
        true
    }

    pub(crate) fn finish_shield(&mut self, perfect: bool) {
        let Some(shield) = self.shield.take() else {
            return;
        };
        if shield.is_tutorial {
            self.player.lifetime.shield_tutorial_done = true;
        }
        self.phase = GamePhase::Battle;
        log::debug!(
            "Shield session resolved: {}/{} blocked",
            shield.succeeded,
            shield.total
        );
        self.events.log(
            format!("You blocked {} of {} spells.", shield.succeeded, shield.total),
            LogCategory::Shield,
        );

        if !perfect {
            return;
        }
        let Some(enc) = self.encounter.as_mut() else {
            return;
        };
        let bonus = floor_mul(enc.max_hp, self.config.shield_bonus_fraction);
        let dealt = enc.take_damage(bonus);
        let name = enc.name.clone();
        self.player.stats.damage_dealt += dealt as u64;
        self.events
            .float(format!("-{bonus}"), Anchor::Enemy, LogCategory::Crit);
        self.events.log(
            format!("Perfect defense! Your counter-spell hits {name} for {bonus}."),
            LogCategory::Shield,
        );
        self.events.particles(Anchor::Enemy, "#ffffff", 40);

        if self.encounter.as_ref().map_or(false, |e| e.is_dead()) {
            self.resolve_encounter_death();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedDice;
    use ShieldColor::*;

    fn config() -> BalanceConfig {
        BalanceConfig::new()
    }

    #[test]
    fn test_queue_sizes() {
        let config = config();
        let normal = ShieldSession::new(false, 1, &config, &mut FixedDice(0.3));
        assert_eq!(normal.total, 5);
        assert_eq!(normal.stage, ShieldStage::Challenge);
        let tutorial = ShieldSession::new(true, 1, &config, &mut FixedDice(0.3));
        assert_eq!(tutorial.total, 3);
        assert_eq!(tutorial.stage, ShieldStage::TutorialPrompt);
        assert_eq!(tutorial.current, None);
    }

    #[test]
    fn test_press_ignored_during_prompt_and_pause() {
        let config = config();
        let mut shield = ShieldSession::with_queue(true, [Red, Blue], 1, &config);
        assert_eq!(shield.press(Red), ShieldStep::Ignored);
        assert_eq!(shield.acknowledge_tutorial(), ShieldStep::NextChallenge(Red));
        assert_eq!(shield.press(Red), ShieldStep::Blocked);
        assert_eq!(shield.press(Blue), ShieldStep::Ignored);
        assert_eq!(shield.acknowledge_tutorial(), ShieldStep::Ignored);
    }

    #[test]
    fn test_wrong_color_fails() {
        let config = config();
        let mut shield = ShieldSession::with_queue(false, [Green], 1, &config);
        assert_eq!(shield.press(Red), ShieldStep::Failed(ShieldResult::WrongColor));
        assert_eq!(shield.failed, 1);
        assert_eq!(shield.last_result, Some(ShieldResult::WrongColor));
    }

    #[test]
    fn test_timeout_then_pause_then_next() {
        let config = config();
        let mut shield = ShieldSession::with_queue(false, [Red, Blue], 1, &config);
        let deadline = shield.deadline_ms;
        assert_eq!(deadline, 1975);

        assert!(shield.advance(deadline - 1).is_empty());
        assert!(shield.timer_fraction() > 0.0);
        assert_eq!(
            shield.advance(1),
            vec![ShieldStep::Failed(ShieldResult::TimedOut)]
        );
        assert!(shield.advance(799).is_empty());
        assert_eq!(shield.advance(1), vec![ShieldStep::NextChallenge(Blue)]);
        assert_eq!(shield.time_left_ms, deadline);
    }

    #[test]
    fn test_one_big_advance_crosses_everything() {
        let config = config();
        let mut shield = ShieldSession::with_queue(false, [Red, Blue], 1, &config);
        let steps = shield.advance(60_000);
        assert_eq!(
            steps,
            vec![
                ShieldStep::Failed(ShieldResult::TimedOut),
                ShieldStep::NextChallenge(Blue),
                ShieldStep::Failed(ShieldResult::TimedOut),
                ShieldStep::Finished { perfect: false },
            ]
        );
        assert_eq!(shield.stage, ShieldStage::Resolved);
        assert_eq!(shield.failed, 2);
    }

    #[test]
    fn test_perfect_session() {
        let config = config();
        let mut shield = ShieldSession::with_queue(false, [Red, Yellow], 1, &config);
        shield.press(Red);
        shield.advance(800);
        shield.press(Yellow);
        assert_eq!(shield.advance(800), vec![ShieldStep::Finished { perfect: true }]);
        assert!(shield.is_perfect());
    }

    #[test]
    fn test_empty_session_is_not_perfect() {
        let config = config();
        let shield = ShieldSession::with_queue(false, [], 1, &config);
        assert!(shield.is_resolved());
        assert!(!shield.is_perfect());
    }
}
