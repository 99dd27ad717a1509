//! Whole runs: house selection, tutorial, fights, buff picks, victory and
//! restart.

use wizard_duel::{
    BalanceConfig, Command, CommandOutcome, ContentCatalog, EncounterSlot, GamePhase, GameSession,
    House, Overlay, SeededDice,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn short_run(seed: u64) -> GameSession {
    init_logging();
    let mut catalog = ContentCatalog::standard();
    catalog.sequence = vec![EncounterSlot::fixed("pixie"), EncounterSlot::fixed("doxy")];
    assert!(catalog.validate().is_ok());
    GameSession::with_parts(BalanceConfig::new(), catalog, Box::new(SeededDice::new(seed)))
}

/// Plays until the run ends, picking the first buff every time.
fn play_out(session: &mut GameSession, spell: &str) {
    for _ in 0..1_000 {
        match session.phase().clone() {
            GamePhase::BuffSelection { offer } => {
                assert!(session.apply(Command::SelectBuff(offer[0].clone())).is_applied());
            }
            GamePhase::ShieldMinigame => {
                session.advance_shield(60_000);
            }
            GamePhase::Victory | GamePhase::GameOver => return,
            _ => {
                session.apply(Command::CastSpell(spell.to_string()));
                session.tick();
                session.tick_cooldowns();
            }
        }
    }
    panic!("run did not finish");
}

#[test]
fn test_house_then_tutorial_then_battle() {
    let mut session = short_run(1);
    assert_eq!(session.snapshot().overlay, Overlay::HouseSelection);
    assert_eq!(
        session.apply(Command::AdvanceTutorialPage),
        CommandOutcome::Ignored
    );

    assert!(session.apply(Command::SelectHouse(House::Gryffindor)).is_applied());
    assert_eq!(*session.phase(), GamePhase::Tutorial { page: 0 });
    assert!(session.player().knows_spell("incendio"));
    assert_eq!(
        session.apply(Command::SelectHouse(House::Slytherin)),
        CommandOutcome::Ignored
    );

    session.apply(Command::AdvanceTutorialPage);
    session.apply(Command::AdvanceTutorialPage);
    assert_eq!(session.snapshot().overlay, Overlay::Tutorial { page: 2 });
    session.apply(Command::AdvanceTutorialPage);

    assert_eq!(*session.phase(), GamePhase::Battle);
    assert!(session.player().lifetime.intro_tutorial_done);
    assert_eq!(session.encounter().unwrap().template_id, "pixie");
}

#[test]
fn test_short_run_ends_in_victory() {
    let mut session = short_run(7);
    session.apply(Command::SelectHouse(House::Ravenclaw));
    while session.phase().is_tutorial() {
        session.apply(Command::AdvanceTutorialPage);
    }
    session.player_mut().buff_stats.death_save_charges = 10;
    play_out(&mut session, "stupefy");

    assert_eq!(*session.phase(), GamePhase::Victory);
    let player = session.player();
    assert_eq!(player.stats.kills, 2);
    assert_eq!(player.floor, 3);
    assert!(player.gold > 0);
    assert!(player.stats.spells_cast > 0);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.overlay, Overlay::Victory);
    let summary = snapshot.summary.unwrap();
    assert!(summary.victory);
    assert_eq!(summary.kills, 2);
}

#[test]
fn test_restart_keeps_lifetime_progress() {
    let mut session = short_run(3);
    session.apply(Command::SelectHouse(House::Hufflepuff));
    while session.phase().is_tutorial() {
        session.apply(Command::AdvanceTutorialPage);
    }
    session.player_mut().buff_stats.death_save_charges = 10;
    play_out(&mut session, "episkey");
    let earned = session.player().lifetime.total_gold_earned;
    let run_id = session.player().run_id;

    assert!(session.apply(Command::RestartRun).is_applied());
    assert_eq!(*session.phase(), GamePhase::HouseSelection);
    assert!(session.encounter().is_none());
    let player = session.player();
    assert_ne!(player.run_id, run_id);
    assert_eq!(player.gold, 0);
    assert_eq!(player.stats.kills, 0);
    assert_eq!(player.lifetime.total_gold_earned, earned);
    assert_eq!(player.lifetime.runs_started, 1);

    // the intro is only shown once
    session.apply(Command::SelectHouse(House::Gryffindor));
    assert_eq!(*session.phase(), GamePhase::Battle);
    assert_eq!(session.player().lifetime.runs_started, 2);
}

#[test]
fn test_buff_prompt_pauses_the_fight() {
    let mut session = short_run(5);
    session.apply(Command::SelectHouse(House::Gryffindor));
    while session.phase().is_tutorial() {
        session.apply(Command::AdvanceTutorialPage);
    }
    session.player_mut().buff_stats.atk = 10_000;
    // the pixie may dodge a few swings
    for _ in 0..50 {
        if *session.phase() != GamePhase::Battle {
            break;
        }
        session.tick();
    }
    assert!(matches!(session.phase(), GamePhase::BuffSelection { .. }));
    assert_eq!(session.snapshot().offer.len(), 3);

    let floor = session.player().floor;
    assert_eq!(
        session.apply(Command::CastSpell("incendio".into())),
        CommandOutcome::Ignored
    );
    assert!(!session.tick_cooldowns());
    assert_eq!(session.player().floor, floor);
    assert_eq!(
        session.apply(Command::SelectBuff("no_such_buff".into())),
        CommandOutcome::Ignored
    );
}
