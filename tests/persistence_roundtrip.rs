//! Save blobs, offline progress and the save stores.

use std::sync::Arc;
use wizard_duel::{
    compute_stats, load_player, offline_reward, save_player, BalanceConfig, Command,
    ContentCatalog, DuelResult, FileStore, FixedDice, GamePhase, GameSession, House, MemoryStore,
    SaveStore, Skill,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A session several kills deep with buffs, skills and spells.
fn seasoned_session() -> GameSession {
    init_logging();
    let mut session = GameSession::with_dice(FixedDice(0.99));
    session.apply(Command::SelectHouse(House::Slytherin));
    while session.phase().is_tutorial() {
        session.apply(Command::AdvanceTutorialPage);
    }
    let player = session.player_mut();
    player.level = 4;
    player.skill_points = 1;
    player.buff_stats.atk = 6;
    player.buff_stats.hp = 30;
    player.buff_stats.crit = 7.5;
    player.buff_stats.gold_bonus = 0.2;
    player.buff_stats.death_save_charges = 1;
    player.unlock_spell("protego");
    player.cooldowns.insert("protego".into(), 3);
    session.apply(Command::SpendSkillPoint(Skill::Vitality));
    session
}

#[test]
fn test_roundtrip_preserves_effective_stats() -> DuelResult<()> {
    let session = seasoned_session();
    let config = session.config().clone();
    let json = save_player(session.player(), 1_000)?;

    let loaded = load_player(Some(&json), 1_010, &config);
    assert_eq!(loaded.offline_gold, None);
    assert_eq!(loaded.player, *session.player());
    assert_eq!(
        compute_stats(&loaded.player, &config),
        compute_stats(session.player(), &config)
    );
    Ok(())
}

#[test]
fn test_offline_reward_scenarios() {
    let config = BalanceConfig::new();
    assert_eq!(offline_reward(5, 3600, &config), Some(16200));
    assert_eq!(offline_reward(5, 30, &config), None);
}

#[test]
fn test_garbage_in_store_starts_fresh() -> DuelResult<()> {
    init_logging();
    let store = MemoryStore::with_blob("\u{0}\u{1} definitely not a save");
    let (session, gold) = GameSession::load_from(
        &store,
        BalanceConfig::new(),
        ContentCatalog::standard(),
        Box::new(FixedDice(0.5)),
    )?;
    assert_eq!(gold, None);
    assert_eq!(*session.phase(), GamePhase::HouseSelection);
    assert_eq!(session.player().level, 1);
    Ok(())
}

#[test]
fn test_file_store_resume() -> DuelResult<()> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path().join("duel.json"))?;
    let session = seasoned_session();
    session.save_to(&store)?;
    assert!(store.exists());

    let (resumed, _) = GameSession::load_from(
        &store,
        BalanceConfig::new(),
        ContentCatalog::standard(),
        Box::new(FixedDice(0.99)),
    )?;
    assert_eq!(resumed.player().house, Some(House::Slytherin));
    assert_eq!(resumed.player().skills.vitality, 1);
    assert_eq!(resumed.player().cooldown("protego"), 3);
    assert!(resumed.encounter().is_some());
    assert_eq!(*resumed.phase(), GamePhase::Battle);
    Ok(())
}

#[test]
fn test_resume_after_defeat_stays_over() -> DuelResult<()> {
    let store: Arc<dyn SaveStore> = Arc::new(MemoryStore::new());
    let mut session = seasoned_session();
    session.player_mut().hp = 0;
    session.save_to(store.as_ref())?;

    let (resumed, _) = GameSession::load_from(
        store.as_ref(),
        BalanceConfig::new(),
        ContentCatalog::standard(),
        Box::new(FixedDice(0.99)),
    )?;
    assert_eq!(*resumed.phase(), GamePhase::GameOver);
    assert!(resumed.encounter().is_none());
    Ok(())
}
