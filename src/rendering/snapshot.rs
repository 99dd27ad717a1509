//! # Render Snapshot
//!
//! A read-only projection of a session, holding everything a presentation
//! layer needs to draw one frame. Building a snapshot never mutates the
//! session.

use crate::content::{Ability, BuffKind, DebuffKind, House, Rarity};
use crate::game::{
    ActiveBuff, Element, GamePhase, GameSession, LogLine, ShieldColor, ShieldStage,
};
use serde::Serialize;

/// Which popup or overlay should be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    /// Battle screen, no popup
    None,
    HouseSelection,
    Tutorial { page: u8 },
    ShieldTutorial,
    ShieldMinigame,
    BuffSelection,
    GameOver,
    Victory,
}

/// Player panel contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub house: Option<House>,
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub def: i64,
    pub crit: f64,
    pub level: u32,
    pub exp: u64,
    pub exp_to_level: u64,
    pub skill_points: u32,
    pub gold: u64,
    pub gems: u64,
    pub floor: u32,
    pub combo: u32,
    pub poison_stacks: u32,
    pub fear: bool,
    pub death_save_charges: u32,
    pub revival_available: bool,
    /// Active temporary buffs as icon and remaining turns
    pub buffs: Vec<BuffIcon>,
}

/// A temporary buff badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuffIcon {
    pub kind: BuffKind,
    pub icon: &'static str,
    pub turns: u32,
}

impl From<&ActiveBuff> for BuffIcon {
    fn from(buff: &ActiveBuff) -> Self {
        let icon = match buff.kind {
            BuffKind::Regen => "💚",
            BuffKind::Reflect => "🪞",
            BuffKind::Atk => "⚔️",
            BuffKind::Crit => "🎯",
            BuffKind::CritDamage => "💥",
        };
        Self {
            kind: buff.kind,
            icon,
            turns: buff.turns,
        }
    }
}

/// Opponent panel contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterView {
    pub name: String,
    pub icon: String,
    pub element: Element,
    pub is_boss: bool,
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub has_shield: bool,
    pub enraged: bool,
    pub abilities: Vec<&'static str>,
    /// Debuffs the player has placed, with remaining turns
    pub debuffs: Vec<(DebuffKind, u32)>,
}

/// A spell button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellView {
    pub id: String,
    pub name: String,
    pub element: Element,
    pub cooldown_secs: u32,
    pub remaining_secs: u32,
    pub ready: bool,
}

/// Shield minigame panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShieldView {
    pub is_tutorial: bool,
    pub color: Option<ShieldColor>,
    pub color_hex: Option<&'static str>,
    /// Fraction of the current deadline still left
    pub timer_fraction: f64,
    pub result_text: Option<&'static str>,
    pub succeeded: u32,
    pub failed: u32,
    pub remaining: usize,
    pub total: usize,
}

/// A card in the buff prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffOfferView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
}

/// End-of-run statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub victory: bool,
    pub floor: u32,
    pub level: u32,
    pub kills: u32,
    pub boss_kills: u32,
    pub max_combo: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub run_gold: u64,
    pub total_gold_earned: u64,
    pub spells_cast: u32,
    pub shields_blocked: u32,
    pub shields_failed: u32,
}

/// Everything needed to draw the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub overlay: Overlay,
    pub player: PlayerView,
    pub encounter: Option<EncounterView>,
    pub spells: Vec<SpellView>,
    pub shield: Option<ShieldView>,
    pub offer: Vec<BuffOfferView>,
    pub summary: Option<RunSummary>,
    pub log: Vec<LogLine>,
}

impl RenderSnapshot {
    /// Projects the session's current state.
    pub fn capture(session: &GameSession) -> Self {
        let stats = session.stats();
        let player = session.player();

        let shield_tutorial = session
            .shield()
            .is_some_and(|s| s.stage == ShieldStage::TutorialPrompt);
        let overlay = match session.phase() {
            GamePhase::HouseSelection => Overlay::HouseSelection,
            GamePhase::Tutorial { page } => Overlay::Tutorial { page: *page },
            GamePhase::Battle => Overlay::None,
            GamePhase::ShieldMinigame if shield_tutorial => Overlay::ShieldTutorial,
            GamePhase::ShieldMinigame => Overlay::ShieldMinigame,
            GamePhase::BuffSelection { .. } => Overlay::BuffSelection,
            GamePhase::GameOver => Overlay::GameOver,
            GamePhase::Victory => Overlay::Victory,
        };

        let player_view = PlayerView {
            house: player.house,
            hp: player.hp,
            max_hp: stats.max_hp,
            atk: stats.atk,
            def: stats.def,
            crit: stats.crit,
            level: player.level,
            exp: player.exp,
            exp_to_level: player.exp_to_level,
            skill_points: player.skill_points,
            gold: player.gold,
            gems: player.gems,
            floor: player.floor,
            combo: player.stats.combo,
            poison_stacks: player.poison_stacks,
            fear: player.fear,
            death_save_charges: player.buff_stats.death_save_charges,
            revival_available: player.revival_available,
            buffs: player.combat_buffs.iter().map(BuffIcon::from).collect(),
        };

        let encounter = session.encounter().map(|enc| EncounterView {
            name: enc.name.clone(),
            icon: enc.icon.clone(),
            element: enc.element,
            is_boss: enc.is_boss,
            hp: enc.hp,
            max_hp: enc.max_hp,
            atk: enc.atk,
            has_shield: enc.has_shield,
            enraged: enc.enraged,
            abilities: enc.abilities.iter().copied().map(Ability::label).collect(),
            debuffs: player
                .combat_debuffs
                .iter()
                .map(|d| (d.kind, d.turns))
                .collect(),
        });

        let spells = player
            .unlocked_spells
            .iter()
            .filter_map(|id| session.catalog().spell(id))
            .map(|spell| {
                let remaining = player.cooldown(&spell.id);
                SpellView {
                    id: spell.id.clone(),
                    name: spell.name.clone(),
                    element: spell.element,
                    cooldown_secs: spell.cooldown_secs,
                    remaining_secs: remaining,
                    ready: remaining == 0,
                }
            })
            .collect();

        let shield = session.shield().map(|s| ShieldView {
            is_tutorial: s.is_tutorial,
            color: s.current,
            color_hex: s.current.map(ShieldColor::hex),
            timer_fraction: s.timer_fraction(),
            result_text: s.last_result.map(|r| r.text()),
            succeeded: s.succeeded,
            failed: s.failed,
            remaining: s.remaining(),
            total: s.total,
        });

        let offer = session
            .offered_buffs()
            .iter()
            .filter_map(|id| session.catalog().buff(id))
            .map(|buff| BuffOfferView {
                id: buff.id.clone(),
                name: buff.name.clone(),
                description: buff.description.clone(),
                rarity: buff.rarity,
            })
            .collect();

        let summary = session.phase().is_terminal().then(|| RunSummary {
            victory: *session.phase() == GamePhase::Victory,
            floor: player.floor,
            level: player.level,
            kills: player.stats.kills,
            boss_kills: player.stats.boss_kills,
            max_combo: player.stats.max_combo,
            damage_dealt: player.stats.damage_dealt,
            damage_taken: player.stats.damage_taken,
            run_gold: player.stats.run_gold,
            total_gold_earned: player.lifetime.total_gold_earned,
            spells_cast: player.stats.spells_cast,
            shields_blocked: player.stats.shields_blocked,
            shields_failed: player.stats.shields_failed,
        });

        Self {
            overlay,
            player: player_view,
            encounter,
            spells,
            shield,
            offer,
            summary,
            log: session.events().recent_log().cloned().collect(),
        }
    }
}
