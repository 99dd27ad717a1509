//! # Rendering Module
//!
//! The engine draws nothing itself. It exposes a serializable snapshot of
//! the session and a stream of [`GameEvent`](crate::GameEvent)s; any
//! presentation layer can build a frame from those two.

pub mod snapshot;

pub use snapshot::*;
