//! # Persistence Module
//!
//! Only the [`Player`] is ever saved. Encounters and shield sessions are
//! rebuilt when a run resumes.
//!
//! A save is a versioned JSON blob with a wall-clock timestamp. Loading a
//! save grants gold for the time the game was closed.

pub mod store;

pub use store::*;

use crate::config::SAVE_FORMAT_VERSION;
use crate::content::ContentCatalog;
use crate::game::{BalanceConfig, GameSession, LogCategory, Player};
use crate::utils::{floor_f, Dice};
use crate::DuelResult;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Serialized form of a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBlob {
    pub version: u32,
    /// Unix seconds at save time
    pub saved_at: u64,
    pub player: Player,
}

/// Current wall-clock time in Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Gold earned while the game was closed.
///
/// Returns `None` below the minimum absence; elapsed time is capped.
///
/// # Examples
///
/// ```
/// use wizard_duel::{offline_reward, BalanceConfig};
///
/// let config = BalanceConfig::new();
/// assert_eq!(offline_reward(5, 3600, &config), Some(16200));
/// assert_eq!(offline_reward(5, 30, &config), None);
/// ```
pub fn offline_reward(floor: u32, elapsed_secs: u64, config: &BalanceConfig) -> Option<u64> {
    if elapsed_secs < config.offline_min_secs {
        return None;
    }
    let elapsed = elapsed_secs.min(config.offline_cap_secs) as f64;
    let per_sec = (config.offline_base + floor as u64 * config.offline_per_floor) as f64;
    Some(floor_f(elapsed * config.offline_rate * per_sec).max(0) as u64)
}

/// Serializes a player into a save blob.
pub fn save_player(player: &Player, saved_at: u64) -> DuelResult<String> {
    let blob = SaveBlob {
        version: SAVE_FORMAT_VERSION,
        saved_at,
        player: player.clone(),
    };
    Ok(serde_json::to_string(&blob)?)
}

/// Parses a save blob.
///
/// Malformed blobs and unknown versions are treated as no save: the result
/// is `None` and a warning is logged.
pub fn parse_save(json: &str) -> Option<SaveBlob> {
    match serde_json::from_str::<SaveBlob>(json) {
        Ok(blob) if blob.version <= SAVE_FORMAT_VERSION => Some(blob),
        Ok(blob) => {
            log::warn!("Ignoring save with unknown version {}", blob.version);
            None
        }
        Err(e) => {
            log::warn!("Ignoring malformed save: {e}");
            None
        }
    }
}

/// A loaded player plus the offline gold already credited to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlayer {
    pub player: Player,
    pub offline_gold: Option<u64>,
}

/// Loads a player from a blob, crediting offline gold up to `now`.
///
/// Anything unreadable yields a fresh player.
pub fn load_player(json: Option<&str>, now: u64, config: &BalanceConfig) -> LoadedPlayer {
    let Some(blob) = json.and_then(parse_save) else {
        return LoadedPlayer {
            player: Player::new(config),
            offline_gold: None,
        };
    };

    let mut player = blob.player;
    let elapsed = now.saturating_sub(blob.saved_at);
    let offline_gold = if player.house.is_some() {
        offline_reward(player.floor, elapsed, config)
    } else {
        None
    };
    if let Some(gold) = offline_gold {
        player.earn_gold(gold);
        log::info!("Granted {gold} offline gold for {elapsed}s away");
    }
    LoadedPlayer {
        player,
        offline_gold,
    }
}

impl GameSession {
    /// Writes the player to a store.
    pub fn save_to(&self, store: &dyn SaveStore) -> DuelResult<()> {
        store.write(&save_player(&self.player, now_unix_secs())?)
    }

    /// Resumes a session from a store, or starts fresh when it holds no
    /// usable save.
    ///
    /// Returns the session and the offline gold credited on load.
    pub fn load_from(
        store: &dyn SaveStore,
        config: BalanceConfig,
        catalog: ContentCatalog,
        dice: Box<dyn Dice>,
    ) -> DuelResult<(Self, Option<u64>)> {
        let json = store.read()?;
        let loaded = load_player(json.as_deref(), now_unix_secs(), &config);
        let mut session = GameSession::resume(loaded.player, config, catalog, dice)?;
        if let Some(gold) = loaded.offline_gold {
            session.events.log(
                format!("While you were away you earned {gold} gold."),
                LogCategory::Reward,
            );
        }
        Ok((session, loaded.offline_gold))
    }
}
