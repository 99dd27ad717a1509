//! # Wizard Duel
//!
//! An auto-battling wizard duel engine with roguelike run progression.
//!
//! ## Architecture Overview
//!
//! The crate is the rules core of an idle duel game. It owns no rendering,
//! audio or storage technology; instead it consumes read-only content tables
//! and publishes notifications for whatever layer sits on top of it.
//!
//! - **Content**: immutable catalogs of houses, creatures, spells and buffs
//! - **Game Session**: one object owning the player, the current encounter
//!   and the shield minigame, mutated only through its own methods
//! - **Battle Engine**: the fixed-interval tick resolving one combat round
//! - **Shield Minigame**: a timing interrupt during boss fights
//! - **Commands**: serializable inbound actions from the input layer
//! - **Rendering Snapshot**: a read-only projection for drawing a frame
//! - **Persistence**: player save blobs with offline progress
//! - **Runtime**: tokio timer loops that drive a session in real time
//!
//! ## Example
//!
//! ```
//! use wizard_duel::{Command, GameSession, House};
//!
//! let mut session = GameSession::new();
//! session.apply(Command::SelectHouse(House::Gryffindor));
//! while session.phase().is_tutorial() {
//!     session.apply(Command::AdvanceTutorialPage);
//! }
//! session.tick();
//! assert!(session.player().level >= 1);
//! ```

pub mod content;
pub mod game;
pub mod input;
pub mod persistence;
pub mod rendering;
pub mod runtime;
pub mod utils;

pub use content::*;
pub use game::*;
pub use input::*;
pub use persistence::*;
pub use rendering::*;
pub use runtime::*;
pub use utils::*;

/// Core error type for the duel engine.
///
/// Game-rule edge cases are never errors; these variants only cover the
/// data and I/O boundaries of the crate.
#[derive(thiserror::Error, Debug)]
pub enum DuelError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Session state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// A content id could not be resolved
    #[error("Unknown content: {0}")]
    UnknownContent(String),

    /// A balance or content table failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the crate.
pub type DuelResult<T> = Result<T, DuelError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed engine constants that are not balancing knobs.
pub mod config {
    /// Number of combat log lines kept for the render snapshot
    pub const MAX_LOG_LINES: usize = 50;

    /// Version tag written into every save blob
    pub const SAVE_FORMAT_VERSION: u32 = 1;

    /// Number of pages in the intro tutorial shown after house selection
    pub const TUTORIAL_PAGES: u8 = 3;

    /// Number of buffs offered after each kill
    pub const BUFF_CHOICES: usize = 3;

    /// Capacity of the runtime event broadcast channel
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;
}
