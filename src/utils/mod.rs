//! # Utilities Module
//!
//! Randomness and arithmetic helpers shared by every combat formula.

pub mod dice;
pub mod math;

pub use dice::*;
pub use math::*;
