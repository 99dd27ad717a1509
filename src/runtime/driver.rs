//! # Game Driver
//!
//! Runs a [`GameSession`] in real time. Three timer loops share the session
//! behind an async mutex:
//!
//! - the battle tick, every `tick_interval_ms`
//! - the spell cooldown ticker, every `cooldown_interval_ms`
//! - the shield countdown, every `shield_poll_ms`
//!
//! The session's phase decides which loop actually changes anything; the
//! mutex only serializes access. Every loop exits once the run ends, and
//! starting a loop first aborts any previous loop of the same kind.

use crate::config::EVENT_CHANNEL_CAPACITY;
use crate::game::{CommandOutcome, GameEvent, GameSession};
use crate::input::Command;
use crate::persistence::SaveStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Shared handle to a driven session.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// The timer loops a driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Battle,
    Cooldown,
    Shield,
}

#[derive(Clone)]
struct Publisher {
    events: broadcast::Sender<GameEvent>,
    store: Option<Arc<dyn SaveStore>>,
}

impl Publisher {
    /// Broadcasts every pending event and saves once if any asked for it.
    fn flush(&self, session: &mut GameSession) {
        let events = session.drain_events();
        if events.is_empty() {
            return;
        }
        let wants_save = events.contains(&GameEvent::SaveRequested);
        for event in events {
            // no subscribers is fine
            let _ = self.events.send(event);
        }
        if let (true, Some(store)) = (wants_save, &self.store) {
            if let Err(e) = session.save_to(store.as_ref()) {
                log::warn!("Autosave failed: {e}");
            }
        }
    }
}

/// Drives a session with tokio timers.
pub struct GameDriver {
    session: SharedSession,
    publisher: Publisher,
    battle: Option<JoinHandle<()>>,
    cooldown: Option<JoinHandle<()>>,
    shield: Option<JoinHandle<()>>,
}

impl GameDriver {
    /// Wraps a session. No loop runs until [`GameDriver::start`] or the
    /// first command that begins a run.
    pub fn new(session: GameSession) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(Mutex::new(session)),
            publisher: Publisher {
                events,
                store: None,
            },
            battle: None,
            cooldown: None,
            shield: None,
        }
    }

    /// Saves the player to `store` whenever the session asks for it.
    pub fn with_store(mut self, store: Arc<dyn SaveStore>) -> Self {
        self.publisher.store = Some(store);
        self
    }

    /// Subscribes to outbound events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.publisher.events.subscribe()
    }

    /// The shared session, for reading snapshots.
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Whether a loop is currently running.
    pub fn is_running(&self, kind: LoopKind) -> bool {
        self.handle(kind).is_some_and(|h| !h.is_finished())
    }

    fn handle(&self, kind: LoopKind) -> Option<&JoinHandle<()>> {
        match kind {
            LoopKind::Battle => self.battle.as_ref(),
            LoopKind::Cooldown => self.cooldown.as_ref(),
            LoopKind::Shield => self.shield.as_ref(),
        }
    }

    fn slot(&mut self, kind: LoopKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            LoopKind::Battle => &mut self.battle,
            LoopKind::Cooldown => &mut self.cooldown,
            LoopKind::Shield => &mut self.shield,
        }
    }

    /// Starts all three loops, replacing any that are running.
    pub async fn start(&mut self) {
        let config = self.session.lock().await.config().clone();
        self.start_loop(LoopKind::Battle, config.tick_interval_ms);
        self.start_loop(LoopKind::Cooldown, config.cooldown_interval_ms);
        self.start_loop(LoopKind::Shield, config.shield_poll_ms);
        log::debug!("Started timer loops");
    }

    fn start_loop(&mut self, kind: LoopKind, period_ms: u64) {
        self.stop_loop(kind);
        let handle = tokio::spawn(run_loop(
            kind,
            Arc::clone(&self.session),
            self.publisher.clone(),
            Duration::from_millis(period_ms.max(1)),
        ));
        *self.slot(kind) = Some(handle);
    }

    fn stop_loop(&mut self, kind: LoopKind) {
        if let Some(handle) = self.slot(kind).take() {
            handle.abort();
        }
    }

    /// Aborts every loop.
    pub fn stop_all(&mut self) {
        for kind in [LoopKind::Battle, LoopKind::Cooldown, LoopKind::Shield] {
            self.stop_loop(kind);
        }
    }

    /// Stops every loop, then restarts the run at house selection.
    pub async fn restart(&mut self) {
        self.stop_all();
        let mut session = self.session.lock().await;
        session.restart_run();
        self.publisher.flush(&mut session);
    }

    /// Applies a command and keeps the loops in step with the new phase.
    pub async fn command(&mut self, command: Command) -> CommandOutcome {
        if command == Command::RestartRun {
            self.restart().await;
            return CommandOutcome::Applied;
        }

        let (outcome, in_run, finished) = {
            let mut session = self.session.lock().await;
            let outcome = session.apply(command);
            self.publisher.flush(&mut session);
            (
                outcome,
                session.phase().is_in_run(),
                session.is_finished(),
            )
        };

        if finished {
            self.stop_all();
        } else if in_run && !self.is_running(LoopKind::Battle) {
            self.start().await;
        }
        outcome
    }
}

impl Drop for GameDriver {
    fn drop(&mut self) {
        self.stop_all();
    }
}

async fn run_loop(kind: LoopKind, shared: SharedSession, publisher: Publisher, period: Duration) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    timer.tick().await;

    loop {
        timer.tick().await;
        let mut session = shared.lock().await;
        if session.is_finished() {
            break;
        }
        match kind {
            LoopKind::Battle => {
                session.tick();
            }
            LoopKind::Cooldown => {
                session.tick_cooldowns();
            }
            LoopKind::Shield => {
                session.advance_shield(period.as_millis() as u64);
            }
        }
        publisher.flush(&mut session);
        if session.is_finished() {
            break;
        }
    }
    log::debug!("{kind:?} loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::House;
    use crate::game::{BalanceConfig, Encounter, GamePhase};
    use crate::utils::FixedDice;
    use crate::ContentCatalog;

    fn driver() -> GameDriver {
        let mut session = GameSession::with_parts(
            BalanceConfig::new(),
            ContentCatalog::standard(),
            Box::new(FixedDice(0.99)),
        );
        session.player_mut().lifetime.intro_tutorial_done = true;
        GameDriver::new(session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_house_selection_starts_loops() {
        let mut driver = driver();
        assert!(!driver.is_running(LoopKind::Battle));
        let outcome = driver.command(Command::SelectHouse(House::Gryffindor)).await;
        assert!(outcome.is_applied());
        assert!(driver.is_running(LoopKind::Battle));
        assert!(driver.is_running(LoopKind::Cooldown));
        assert!(driver.is_running(LoopKind::Shield));
    }

    #[test]
    fn test_start_replaces_running_loops() {
        tokio_test::block_on(async {
            let mut driver = driver();
            driver.start().await;
            driver.start().await;
            assert!(driver.is_running(LoopKind::Battle));
            assert!(driver.is_running(LoopKind::Shield));
            driver.stop_all();
            assert!(!driver.is_running(LoopKind::Battle));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_stops_loops() {
        let mut driver = driver();
        driver.command(Command::SelectHouse(House::Gryffindor)).await;
        driver.command(Command::RestartRun).await;
        assert!(!driver.is_running(LoopKind::Battle));
        let session = driver.session();
        let session = session.lock().await;
        assert_eq!(*session.phase(), GamePhase::HouseSelection);
    }

    #[tokio::test(start_paused = true)]
    async fn test_battle_loop_ticks() {
        let mut driver = driver();
        let mut rx = driver.subscribe();
        driver.command(Command::SelectHouse(House::Gryffindor)).await;
        {
            let session = driver.session();
            let mut session = session.lock().await;
            session.engage(Encounter::new("Dummy", 10_000, 0));
        }
        tokio::time::sleep(Duration::from_millis(950)).await;

        let session = driver.session();
        let hp = session.lock().await.encounter().map(|e| e.hp);
        assert!(hp.is_some_and(|hp| hp < 10_000));

        let mut saw_state_change = false;
        while let Ok(event) = rx.try_recv() {
            saw_state_change |= event == GameEvent::StateChanged;
        }
        assert!(saw_state_change);
    }
}
