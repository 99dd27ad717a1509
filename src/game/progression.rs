//! # Encounter Progression
//!
//! Spawning opponents from the encounter sequence and resolving their
//! deaths: gold, experience, level-ups, gems, depth, and the transition to
//! the buff prompt or to victory.

use crate::game::{
    roll_offer, spawn_encounter, Anchor, GameEvent, GamePhase, GameSession, LogCategory, Waveform,
};
use crate::utils::floor_mul;

impl GameSession {
    /// Spawns the opponent for the player's current sequence slot.
    ///
    /// Ends the run in victory when the sequence is exhausted.
    pub(crate) fn spawn_next_encounter(&mut self) {
        let index = self.player.encounter_index;
        let template = match self.catalog.creature_for_slot(index, self.dice.as_mut()) {
            Some(template) => template.clone(),
            None => {
                self.finish_victory();
                return;
            }
        };

        let stats = self.stats();
        let encounter = spawn_encounter(
            &template,
            self.player.floor,
            &stats,
            &self.config,
            self.dice.as_mut(),
        );

        if encounter.is_boss {
            self.player.lifetime.bosses_encountered += 1;
            self.events.log(
                format!("{} {} blocks your path!", encounter.icon, encounter.name),
                LogCategory::Boss,
            );
            self.events.sound(98.0, Waveform::Square, 0.6);
            self.events.shake();
        } else {
            self.events.log(
                format!("A wild {} {} appears.", encounter.icon, encounter.name),
                LogCategory::System,
            );
        }
        log::info!(
            "Floor {}: {} (hp {}, atk {})",
            self.player.floor,
            encounter.name,
            encounter.max_hp,
            encounter.atk
        );

        self.encounter = Some(encounter);
        self.shield = None;
        self.phase = GamePhase::Battle;
        self.events.push(GameEvent::StateChanged);
    }

    /// Grants the rewards for the current encounter's death.
    ///
    /// Runs at most once per encounter, wherever in the tick the death
    /// happened.
    pub(crate) fn resolve_encounter_death(&mut self) {
        let Some(enc) = self.encounter.as_mut() else {
            return;
        };
        if enc.rewarded {
            return;
        }
        enc.rewarded = true;
        enc.hp = 0;
        let (base_gold, is_boss, name) = (enc.gold, enc.is_boss, enc.name.clone());
        self.shield = None;

        let stats = self.stats();

        let gold = floor_mul(base_gold as i64, 1.0 + stats.gold_bonus).max(0) as u64;
        self.player.earn_gold(gold);
        self.player.record_kill(is_boss);

        self.player.poison_stacks = self.player.poison_stacks.saturating_sub(1);
        self.player.fear = false;
        self.heal_player(
            floor_mul(stats.max_hp, self.config.kill_heal_fraction),
            stats.max_hp,
        );
        self.player.clear_combat_effects();

        self.events.log(
            format!("{name} is defeated! +{gold} gold."),
            if is_boss {
                LogCategory::Boss
            } else {
                LogCategory::Reward
            },
        );
        self.events
            .float(format!("+{gold}g"), Anchor::Enemy, LogCategory::Reward);
        self.events.particles(Anchor::Enemy, "#ffca28", 20);
        log::info!(
            "{} defeated on floor {} (+{} gold, combo {})",
            name,
            self.player.floor,
            gold,
            self.player.stats.combo
        );

        let base_xp = self.config.xp_base + self.config.xp_per_floor * self.player.floor as u64;
        let xp = floor_mul(base_xp as i64, 1.0 + stats.xp_bonus).max(0) as u64;
        self.grant_experience(xp);

        let gem_chance = self.config.gem_chance
            + if is_boss {
                self.config.boss_gem_bonus
            } else {
                0.0
            };
        if self.dice.chance(gem_chance) {
            self.player.gems += 1;
            self.events.log("You found a gem!", LogCategory::Reward);
            self.events.particles(Anchor::Enemy, "#4dd0e1", 15);
        }

        self.player.floor += 1;
        self.player.encounter_index += 1;

        if self.player.encounter_index >= self.catalog.sequence.len() {
            self.finish_victory();
        } else {
            let offer = roll_offer(
                &self.catalog,
                &self.player,
                &self.config,
                self.dice.as_mut(),
            );
            if offer.is_empty() {
                self.spawn_next_encounter();
            } else {
                self.phase = GamePhase::BuffSelection { offer };
            }
        }

        self.events.push(GameEvent::StateChanged);
        self.events.push(GameEvent::SaveRequested);
    }

    /// Adds experience and resolves every level-up it pays for.
    pub(crate) fn grant_experience(&mut self, xp: u64) {
        self.player.exp += xp;
        self.events
            .float(format!("+{xp} XP"), Anchor::Player, LogCategory::LevelUp);

        while self.player.exp >= self.player.exp_to_level {
            self.player.exp -= self.player.exp_to_level;
            self.player.level += 1;
            self.player.skill_points += 1;
            self.player.exp_to_level =
                floor_mul(self.player.exp_to_level as i64, self.config.exp_growth).max(1) as u64;
            self.player.hp = self.stats().max_hp;

            self.events.log(
                format!("Level up! You are now level {}.", self.player.level),
                LogCategory::LevelUp,
            );
            self.events.particles(Anchor::Player, "#66bb6a", 30);
            self.events.sound(784.0, Waveform::Triangle, 0.4);
            log::info!("Reached level {}", self.player.level);
        }
    }

    fn finish_victory(&mut self) {
        self.shield = None;
        self.phase = GamePhase::Victory;
        self.events.log(
            format!(
                "Victory! Every foe has fallen. {} kills, {} gold.",
                self.player.stats.kills, self.player.stats.run_gold
            ),
            LogCategory::System,
        );
        self.events.particles(Anchor::Center, "#ffd700", 80);
        self.events.push(GameEvent::StateChanged);
        self.events.push(GameEvent::SaveRequested);
        log::info!("Run {} won on floor {}", self.player.run_id, self.player.floor);
    }
}

#[cfg(test)]
mod tests {
    use crate::content::House;
    use crate::game::{Encounter, GamePhase, GameSession, TickOutcome};
    use crate::utils::FixedDice;

    fn session() -> GameSession {
        let mut session = GameSession::with_dice(FixedDice(0.99));
        session.player.lifetime.intro_tutorial_done = true;
        session.select_house(House::Gryffindor);
        session
    }

    #[test]
    fn test_kill_rewards() {
        let mut session = session();
        session.player.hp = 50;
        session.player.poison_stacks = 2;
        session.player.fear = true;
        session.engage(Encounter::new("Dummy", 1, 1).with_gold(20));

        assert_eq!(session.tick(), TickOutcome::EncounterDefeated);
        let player = session.player();
        assert_eq!(player.gold, 20);
        assert_eq!(player.stats.run_gold, 20);
        assert_eq!(player.lifetime.total_gold_earned, 20);
        assert_eq!(player.stats.kills, 1);
        assert_eq!(player.poison_stacks, 1);
        assert!(!player.fear);
        // heal floor(100 * 0.25)
        assert_eq!(player.hp, 75);
        // xp 10 + 5 * 1
        assert_eq!(player.exp, 15);
        assert_eq!(player.floor, 2);
        assert_eq!(player.encounter_index, 1);
        assert!(matches!(session.phase(), GamePhase::BuffSelection { .. }));
    }

    #[test]
    fn test_gold_bonus_is_floored() {
        let mut session = session();
        session.player.buff_stats.gold_bonus = 0.15;
        session.engage(Encounter::new("Dummy", 1, 1).with_gold(10));
        session.tick();
        assert_eq!(session.player().gold, 11);
    }

    #[test]
    fn test_level_up_loop() {
        let mut session = session();
        session.grant_experience(100 + 120 + 5);
        let player = session.player();
        assert_eq!(player.level, 3);
        assert_eq!(player.exp, 5);
        assert_eq!(player.exp_to_level, 144);
        assert_eq!(player.skill_points, 2);
        assert_eq!(player.hp, session.stats().max_hp);
    }

    #[test]
    fn test_death_resolves_once() {
        let mut session = session();
        session.engage(Encounter::new("Dummy", 1, 1).with_gold(5));
        session.tick();
        let gold = session.player().gold;
        session.resolve_encounter_death();
        assert_eq!(session.player().gold, gold);
        assert_eq!(session.player().stats.kills, 1);
    }

    #[test]
    fn test_last_slot_is_victory() {
        let mut session = session();
        session.player.encounter_index = session.catalog.sequence.len() - 1;
        session.engage(Encounter::new("Dummy", 1, 1));
        session.tick();
        assert_eq!(*session.phase(), GamePhase::Victory);
        assert!(session.is_finished());
    }

    #[test]
    fn test_spawn_counts_bosses() {
        let mut session = session();
        session.player.encounter_index = 3;
        session.spawn_next_encounter();
        assert!(session.encounter().unwrap().is_boss);
        assert_eq!(session.player().lifetime.bosses_encountered, 1);
    }
}
