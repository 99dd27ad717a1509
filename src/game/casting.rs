//! # Spell Casting
//!
//! Player-invoked spells, applied between battle ticks. A cast sets its
//! cooldown first, then applies its effects in a fixed order: buff, debuff,
//! flat heal, special, barrier, fractional heal, and finally damage.

use crate::content::{BuffKind, DebuffKind, SpellSpecial, SpellTemplate};
use crate::game::{
    strike_damage, ActiveDebuff, Anchor, CommandOutcome, EffectiveStats, GameEvent, GamePhase,
    GameSession, LogCategory, Strike, Waveform,
};
use crate::utils::{below_fraction, floor_f, floor_mul};

impl GameSession {
    /// Casts an unlocked spell that is off cooldown.
    ///
    /// Ignored outside the battle phase, without a live encounter, for an
    /// unknown or locked spell, or while the spell is cooling down.
    pub fn cast_spell(&mut self, spell_id: &str) -> CommandOutcome {
        if self.phase != GamePhase::Battle {
            return CommandOutcome::Ignored;
        }
        if self.encounter.as_ref().map_or(true, |e| e.is_dead()) {
            return CommandOutcome::Ignored;
        }
        if !self.player.knows_spell(spell_id) || self.player.cooldown(spell_id) > 0 {
            return CommandOutcome::Ignored;
        }
        let Some(spell) = self.catalog.spell(spell_id).cloned() else {
            return CommandOutcome::Ignored;
        };

        self.player
            .cooldowns
            .insert(spell.id.clone(), spell.cooldown_secs);
        self.player.stats.spells_cast += 1;
        self.events
            .log(format!("You cast {}!", spell.name), LogCategory::System);
        self.events.sound(600.0, Waveform::Sine, 0.2);
        log::debug!("Cast {}", spell.id);

        if let Some(buff) = spell.buff {
            self.player.combat_buffs.push(buff.into());
            self.events
                .float(format!("{:?}", buff.kind), Anchor::Player, LogCategory::Buff);
        }
        if let Some(debuff) = spell.debuff {
            ActiveDebuff::apply(&mut self.player.combat_debuffs, &debuff);
            self.events
                .float(format!("{:?}", debuff.kind), Anchor::Enemy, LogCategory::Debuff);
        }

        let max_hp = self.stats().max_hp;
        if let Some(amount) = spell.heal_now {
            self.cast_heal(amount, max_hp);
        }
        match spell.special {
            Some(SpellSpecial::Cleanse) => {
                self.player.combat_debuffs.retain(|d| {
                    !matches!(
                        d.kind,
                        DebuffKind::Poison | DebuffKind::Burn | DebuffKind::Bleed
                    )
                });
                self.player.poison_stacks = 0;
                self.events.log("The poison is purged.", LogCategory::Heal);
            }
            Some(SpellSpecial::DispelFear) => {
                self.player.fear = false;
                self.events.log("Your fear dissolves.", LogCategory::Buff);
            }
            Some(SpellSpecial::ReduceCooldowns) => {
                let reduction = self.config.cooldown_reduction_secs;
                for remaining in self.player.cooldowns.values_mut() {
                    if *remaining > 0 {
                        *remaining = remaining.saturating_sub(reduction);
                    }
                }
            }
            _ => {}
        }
        if let Some(fraction) = spell.shield_fraction {
            self.cast_heal(floor_mul(max_hp, fraction), max_hp);
        }
        if let Some(fraction) = spell.heal_fraction {
            self.cast_heal(floor_mul(max_hp, fraction), max_hp);
        }

        let heals = spell.shield_fraction.is_some() || spell.heal_fraction.is_some();
        if !heals && spell.deals_damage() {
            let stats = self.stats();
            if spell.special == Some(SpellSpecial::InstantKill) {
                self.cast_instant_kill(&spell);
            } else {
                self.cast_damage(&spell, &stats);
            }
        }

        self.events.push(GameEvent::StateChanged);
        CommandOutcome::Applied
    }

    /// Counts every running cooldown down by one second.
    ///
    /// Paused while the buff prompt is open and outside a run. Returns true
    /// when anything changed.
    pub fn tick_cooldowns(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Battle | GamePhase::ShieldMinigame) {
            return false;
        }
        let mut changed = false;
        for remaining in self.player.cooldowns.values_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                changed = true;
            }
        }
        if changed {
            self.events.push(GameEvent::StateChanged);
        }
        changed
    }

    fn cast_heal(&mut self, amount: i64, max_hp: i64) {
        let healed = self.heal_player(amount, max_hp);
        if healed > 0 {
            self.events
                .float(format!("+{healed}"), Anchor::Player, LogCategory::Heal);
            self.events
                .log(format!("You recover {healed} HP."), LogCategory::Heal);
        }
    }

    fn cast_damage(&mut self, spell: &SpellTemplate, stats: &EffectiveStats) {
        let crit_chance = stats.crit + self.player.buff_total(BuffKind::Crit);
        let crit_damage = stats.crit_damage + self.player.buff_total(BuffKind::CritDamage);
        let atk = floor_f(stats.atk as f64 + self.player.buff_total(BuffKind::Atk));
        let crit = self.dice.chance(crit_chance / 100.0);

        let Some(enc) = self.encounter.as_mut() else {
            return;
        };
        let base = match spell.special {
            Some(SpellSpecial::PercentMaxHp(fraction)) => floor_mul(enc.max_hp, fraction),
            _ => floor_mul(floor_mul(atk, spell.damage_mult), 1.0 + stats.spell_power),
        }
        .max(1);

        let strike = Strike {
            base,
            elemental: spell.element.multiplier_against(enc.element),
            crit,
            crit_damage,
            execute_bonus: stats.execute_bonus,
            in_execute_range: below_fraction(enc.hp, enc.max_hp, self.config.execute_threshold),
            shielded: enc.has_shield,
            double_attack: false,
        };
        let damage = strike_damage(&strike, &self.config);
        if strike.shielded {
            enc.has_shield = false;
        }
        let dealt = enc.take_damage(damage);
        let name = enc.name.clone();
        let dead = enc.is_dead();
        self.player.stats.damage_dealt += dealt as u64;

        let category = if crit {
            LogCategory::Crit
        } else {
            LogCategory::Damage
        };
        self.events
            .float(format!("-{damage}"), Anchor::Enemy, category);
        self.events.log(
            format!("{} hits {name} for {damage}.", spell.name),
            category,
        );
        self.events.particles(Anchor::Enemy, "#b388ff", 16);

        if stats.lifesteal > 0.0 {
            self.heal_player(floor_mul(damage, stats.lifesteal), stats.max_hp);
        }
        if dead {
            self.resolve_encounter_death();
        }
    }

    /// Kills the encounter outright for half of the caster's current HP.
    ///
    /// The self-cost is paid first. If it is lethal, a death save leaves the
    /// caster at 1 HP; the revival is never consulted and without a death
    /// save the run ends before the spell lands.
    fn cast_instant_kill(&mut self, spell: &SpellTemplate) {
        let cost = floor_mul(self.player.hp, self.config.instant_kill_cost_fraction).max(1);
        self.hurt_player(cost);
        self.events
            .float(format!("-{cost}"), Anchor::Player, LogCategory::Death);

        if self.player.hp <= 0 {
            if self.player.buff_stats.death_save_charges > 0 {
                self.player.buff_stats.death_save_charges -= 1;
                self.player.stats.deaths_prevented += 1;
                self.player.hp = 1;
                self.events
                    .log("The curse nearly takes you with it.", LogCategory::Death);
            } else {
                self.game_over();
                return;
            }
        }

        let Some(enc) = self.encounter.as_mut() else {
            return;
        };
        let dealt = enc.take_damage(enc.hp);
        let name = enc.name.clone();
        self.player.stats.damage_dealt += dealt as u64;
        self.events.log(
            format!("{} strikes {name} down!", spell.name),
            LogCategory::Crit,
        );
        self.events.particles(Anchor::Enemy, "#00e676", 50);
        self.events.shake();
        self.resolve_encounter_death();
    }
}
