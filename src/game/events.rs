//! # Outbound Events
//!
//! The engine never draws or plays anything. Every effect a presentation
//! layer may want to show is published as a [`GameEvent`] into an
//! [`EventQueue`], which the owner drains after each operation.

use crate::config::MAX_LOG_LINES;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Category of a log line or floating text, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    Damage,
    Crit,
    Heal,
    Buff,
    Debuff,
    Enemy,
    Reward,
    LevelUp,
    Boss,
    Shield,
    Death,
    System,
}

/// Where on screen a floating effect should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Player,
    Enemy,
    Center,
}

/// Oscillator shape for synthesized sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A notification for the rendering, audio or persistence layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Append a line to the combat log
    Log { text: String, category: LogCategory },
    /// Show a floating text near an anchor
    FloatingText {
        text: String,
        anchor: Anchor,
        category: LogCategory,
    },
    /// Spawn a particle burst
    Particles {
        anchor: Anchor,
        color: String,
        count: u32,
    },
    /// Play a synthesized tone
    Sound {
        frequency: f32,
        waveform: Waveform,
        duration_secs: f32,
    },
    /// Shake the screen
    ScreenShake,
    /// Session state changed; redraw from a fresh snapshot
    StateChanged,
    /// Player state reached a save point
    SaveRequested,
}

/// A line kept in the session's recent combat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub category: LogCategory,
}

/// Pending outbound events plus a bounded history of log lines.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: Vec<GameEvent>,
    history: VecDeque<LogLine>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a raw event.
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    /// Appends a combat log line.
    pub fn log(&mut self, text: impl Into<String>, category: LogCategory) {
        let text = text.into();
        if self.history.len() == MAX_LOG_LINES {
            self.history.pop_front();
        }
        self.history.push_back(LogLine {
            text: text.clone(),
            category,
        });
        self.pending.push(GameEvent::Log { text, category });
    }

    /// Requests floating text.
    pub fn float(&mut self, text: impl Into<String>, anchor: Anchor, category: LogCategory) {
        self.pending.push(GameEvent::FloatingText {
            text: text.into(),
            anchor,
            category,
        });
    }

    /// Requests a particle burst.
    pub fn particles(&mut self, anchor: Anchor, color: &str, count: u32) {
        self.pending.push(GameEvent::Particles {
            anchor,
            color: color.to_string(),
            count,
        });
    }

    /// Requests a sound cue.
    pub fn sound(&mut self, frequency: f32, waveform: Waveform, duration_secs: f32) {
        self.pending.push(GameEvent::Sound {
            frequency,
            waveform,
            duration_secs,
        });
    }

    /// Requests a screen shake.
    pub fn shake(&mut self) {
        self.pending.push(GameEvent::ScreenShake);
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Number of events not yet drained.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Recent log lines, oldest first.
    pub fn recent_log(&self) -> impl Iterator<Item = &LogLine> {
        self.history.iter()
    }

    /// Forgets everything, pending and historical.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.history.clear();
    }
}
