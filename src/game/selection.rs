//! # Buff Selection
//!
//! After each kill the player is offered three permanent modifiers drawn
//! from the buff table. Deeper floors skew the rarity roll upward.

use crate::config::BUFF_CHOICES;
use crate::content::{BuffEffect, BuffTemplate, ContentCatalog, Rarity};
use crate::game::{
    compute_stats, BalanceConfig, CommandOutcome, GameEvent, GamePhase, GameSession, LogCategory,
    Player,
};
use crate::utils::Dice;

/// Rolls the rarity tier of one offer slot.
///
/// # Examples
///
/// ```
/// use wizard_duel::{roll_rarity, BalanceConfig, FixedDice, Rarity};
///
/// let config = BalanceConfig::new();
/// assert_eq!(roll_rarity(1, &config, &mut FixedDice(0.0)), Rarity::Legendary);
/// assert_eq!(roll_rarity(1, &config, &mut FixedDice(0.99)), Rarity::Common);
/// ```
pub fn roll_rarity(floor: u32, config: &BalanceConfig, dice: &mut dyn Dice) -> Rarity {
    let depth = floor.saturating_sub(1) as f64;
    let odds = |(base, per_floor, cap): (f64, f64, f64)| (base + per_floor * depth).min(cap);

    let legendary = odds(config.legendary_odds);
    let epic = legendary + odds(config.epic_odds);
    let rare = epic + odds(config.rare_odds);

    let roll = dice.roll();
    if roll < legendary {
        Rarity::Legendary
    } else if roll < epic {
        Rarity::Epic
    } else if roll < rare {
        Rarity::Rare
    } else {
        Rarity::Common
    }
}

/// Whether a buff may be offered to the player.
///
/// Spells already known, a revival already held and one-time flags
/// already owned are never offered.
pub fn is_offerable(buff: &BuffTemplate, player: &Player) -> bool {
    match &buff.effect {
        BuffEffect::UnlockSpell(spell_id) => !player.knows_spell(spell_id),
        BuffEffect::Revival => !player.revival_available,
        BuffEffect::FearImmunity => !player.buff_stats.fear_immune,
        BuffEffect::DoubleAttack => !player.buff_stats.double_attack,
        _ => true,
    }
}

/// Draws up to three distinct buff ids for the prompt.
///
/// Each slot rolls a rarity and picks uniformly among the remaining buffs
/// of that tier, or among all remaining buffs when the tier is exhausted.
pub fn roll_offer(
    catalog: &ContentCatalog,
    player: &Player,
    config: &BalanceConfig,
    dice: &mut dyn Dice,
) -> Vec<String> {
    let mut pool: Vec<&BuffTemplate> = catalog
        .buffs
        .iter()
        .filter(|b| is_offerable(b, player))
        .collect();
    let mut offer = Vec::with_capacity(BUFF_CHOICES);

    while offer.len() < BUFF_CHOICES && !pool.is_empty() {
        let rarity = roll_rarity(player.floor, config, dice);
        let tier: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, b)| b.rarity == rarity)
            .map(|(i, _)| i)
            .collect();
        let index = if tier.is_empty() {
            dice.pick(pool.len())
        } else {
            tier[dice.pick(tier.len())]
        };
        offer.push(pool.remove(index).id.clone());
    }
    offer
}

/// Applies a picked buff to the player.
pub fn apply_buff(player: &mut Player, effect: &BuffEffect, config: &BalanceConfig) {
    let stats = &mut player.buff_stats;
    match effect {
        BuffEffect::Atk(n) => stats.atk += n,
        BuffEffect::Def(n) => stats.def += n,
        BuffEffect::MaxHp(n) => {
            stats.hp += n;
            player.hp += n;
        }
        BuffEffect::Crit(n) => stats.crit += n,
        BuffEffect::CritDamage(n) => stats.crit_damage += n,
        BuffEffect::GoldBonus(n) => stats.gold_bonus += n,
        BuffEffect::XpBonus(n) => stats.xp_bonus += n,
        BuffEffect::Lifesteal(n) => stats.lifesteal += n,
        BuffEffect::RegenFlat(n) => stats.regen_flat += n,
        BuffEffect::Dodge(n) => stats.dodge += n,
        BuffEffect::Thorns(n) => stats.thorns += n,
        BuffEffect::ExecuteBonus(n) => stats.execute_bonus += n,
        BuffEffect::SpellPower(n) => stats.spell_power += n,
        BuffEffect::DamageReduction(n) => {
            stats.damage_reduction = (stats.damage_reduction + n).min(0.9);
        }
        BuffEffect::DeathSave(n) => stats.death_save_charges += n,
        BuffEffect::DoubleAttack => stats.double_attack = true,
        BuffEffect::FearImmunity => {
            stats.fear_immune = true;
            player.fear = false;
        }
        BuffEffect::HealNow(n) => {
            let max_hp = compute_stats(player, config).max_hp;
            player.hp = crate::utils::heal_clamped(player.hp, *n, max_hp).0;
        }
        BuffEffect::GoldNow(n) => player.earn_gold(*n),
        BuffEffect::UnlockSpell(spell_id) => player.unlock_spell(spell_id),
        BuffEffect::Revival => player.revival_available = true,
    }

    let max_hp = compute_stats(player, config).max_hp;
    player.hp = player.hp.min(max_hp);
}

impl GameSession {
    /// Picks one of the offered buffs and moves on to the next encounter.
    pub fn select_buff(&mut self, buff_id: &str) -> CommandOutcome {
        let GamePhase::BuffSelection { offer } = &self.phase else {
            return CommandOutcome::Ignored;
        };
        if !offer.iter().any(|id| id == buff_id) {
            return CommandOutcome::Ignored;
        }
        let Some(buff) = self.catalog.buff(buff_id).cloned() else {
            return CommandOutcome::Ignored;
        };

        apply_buff(&mut self.player, &buff.effect, &self.config);
        self.events.log(
            format!("You gain {}: {}.", buff.name, buff.description),
            LogCategory::Buff,
        );
        log::debug!("Picked buff {} ({:?})", buff.id, buff.rarity);
        self.events.push(GameEvent::SaveRequested);

        self.spawn_next_encounter();
        CommandOutcome::Applied
    }

    /// Buff ids currently offered, if the prompt is open.
    pub fn offered_buffs(&self) -> &[String] {
        match &self.phase {
            GamePhase::BuffSelection { offer } => offer,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{FixedDice, SeededDice};
    use std::collections::HashSet;

    #[test]
    fn test_rarity_skews_with_depth() {
        let config = BalanceConfig::new();
        // 0.05 is above the floor-1 legendary chance (0.03) but below floor 9's (0.07)
        assert_eq!(roll_rarity(1, &config, &mut FixedDice(0.05)), Rarity::Epic);
        assert_eq!(roll_rarity(9, &config, &mut FixedDice(0.05)), Rarity::Legendary);
    }

    #[test]
    fn test_rarity_odds_are_capped() {
        let config = BalanceConfig::new();
        // at depth 1000 every tier sits at its cap: 0.15 / 0.40 / 0.75
        assert_eq!(roll_rarity(1000, &config, &mut FixedDice(0.14)), Rarity::Legendary);
        assert_eq!(roll_rarity(1000, &config, &mut FixedDice(0.39)), Rarity::Epic);
        assert_eq!(roll_rarity(1000, &config, &mut FixedDice(0.74)), Rarity::Rare);
        assert_eq!(roll_rarity(1000, &config, &mut FixedDice(0.76)), Rarity::Common);
    }

    #[test]
    fn test_offer_is_distinct() {
        let config = BalanceConfig::new();
        let catalog = ContentCatalog::standard();
        let player = Player::new(&config);
        let mut dice = SeededDice::new(11);
        for _ in 0..50 {
            let offer = roll_offer(&catalog, &player, &config, &mut dice);
            assert_eq!(offer.len(), BUFF_CHOICES);
            let unique: HashSet<&String> = offer.iter().collect();
            assert_eq!(unique.len(), BUFF_CHOICES);
        }
    }

    #[test]
    fn test_known_spells_not_offered() {
        let config = BalanceConfig::new();
        let catalog = ContentCatalog::standard();
        let mut player = Player::new(&config);
        player.unlock_spell("aguamenti");
        let tome = catalog.buff("learn_aguamenti").unwrap();
        assert!(!is_offerable(tome, &player));

        player.revival_available = true;
        assert!(!is_offerable(catalog.buff("felix_felicis").unwrap(), &player));
        assert!(is_offerable(catalog.buff("wand_polish").unwrap(), &player));
    }

    #[test]
    fn test_small_pool_offers_what_is_left() {
        let config = BalanceConfig::new();
        let mut catalog = ContentCatalog::standard();
        catalog.buffs.truncate(2);
        let player = Player::new(&config);
        let offer = roll_offer(&catalog, &player, &config, &mut FixedDice(0.5));
        assert_eq!(offer.len(), 2);
    }

    #[test]
    fn test_apply_buffs() {
        let config = BalanceConfig::new();
        let mut player = Player::new(&config);
        apply_buff(&mut player, &BuffEffect::MaxHp(15), &config);
        assert_eq!(player.buff_stats.hp, 15);
        assert_eq!(player.hp, 115);

        player.hp = 50;
        apply_buff(&mut player, &BuffEffect::HealNow(100), &config);
        assert_eq!(player.hp, 115);

        apply_buff(&mut player, &BuffEffect::DeathSave(1), &config);
        apply_buff(&mut player, &BuffEffect::UnlockSpell("protego".into()), &config);
        apply_buff(&mut player, &BuffEffect::GoldNow(50), &config);
        assert_eq!(player.buff_stats.death_save_charges, 1);
        assert!(player.knows_spell("protego"));
        assert_eq!(player.gold, 50);
    }

    #[test]
    fn test_select_buff_outside_offer_ignored() {
        let mut session = GameSession::with_dice(FixedDice(0.5));
        session.phase = GamePhase::BuffSelection {
            offer: vec!["wand_polish".to_string()],
        };
        session.player.house = Some(crate::content::House::Gryffindor);
        assert_eq!(session.select_buff("elder_core"), CommandOutcome::Ignored);
        assert!(session.select_buff("wand_polish").is_applied());
        assert_eq!(session.player().buff_stats.atk, 3);
        assert_eq!(*session.phase(), GamePhase::Battle);
    }
}
