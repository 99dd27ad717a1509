//! # Runtime Module
//!
//! Real-time driving of a session with tokio timers and a broadcast event
//! channel.

pub mod driver;

pub use driver::*;
