//! # Dice
//!
//! The single source of randomness for the engine.
//!
//! Every probabilistic rule (crit rolls, dodge rolls, ability procs, scaling
//! ranges, buff rarity) draws a uniform value in `[0, 1)` from a [`Dice`].
//! The engine makes no replay guarantee; production sessions use the
//! unseeded [`ThreadDice`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform rolls in `[0, 1)`.
pub trait Dice: Send {
    /// Returns a uniform value in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.roll() < p
    }

    /// Returns a uniform value in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.roll() * (hi - lo)
    }

    /// Picks an index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        let index = (self.roll() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Unseeded dice backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Seeded dice for reproducible simulations.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Creates dice from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Dice that always return the same value.
///
/// `FixedDice(0.99)` makes every low-probability proc fail, `FixedDice(0.0)`
/// makes every proc succeed.
#[derive(Debug, Clone, Copy)]
pub struct FixedDice(pub f64);

impl Dice for FixedDice {
    fn roll(&mut self) -> f64 {
        self.0
    }
}

/// Dice that replay a script, then fall back to a constant.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedDice {
    /// Creates scripted dice. Once the script is exhausted every roll
    /// returns `fallback`.
    pub fn new(script: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Number of scripted rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
