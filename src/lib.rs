//! 2048 Nexus - A combo-scoring 2048 variant for the browser
//!
//! Core modules:
//! - `sim`: Deterministic game core (grid, move resolution, scoring, state machine)
//! - `session`: Owns a running game plus its persisted collaborators
//! - `renderer`: View-model consumed by the DOM front end
//! - `platform`: Browser/native platform abstraction (input decoding, clock)
//! - `persistence`: Key/value storage for scores, achievements and the save slot

pub mod achievements;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use achievements::{Achievement, Achievements};
pub use leaderboard::Leaderboard;
pub use session::Session;
pub use settings::{ModeKind, Settings};

/// Game configuration constants
pub mod consts {
    /// Tile value that wins the game (outside Zen mode)
    pub const WIN_TILE: u32 = 2048;
    /// Maximum gap between merge-producing moves for the combo to continue
    pub const COMBO_WINDOW_MS: u64 = 800;
    /// How long a move holds the input lock while the board animates
    pub const MOVE_SETTLE_MS: u64 = 120;
    /// Default time-attack duration
    pub const DEFAULT_TIME_LIMIT_SECS: u32 = 180;
    /// Countdown at or below this is shown as urgent
    pub const URGENT_TIME_SECS: u32 = 30;
    /// Supported board sizes
    pub const BOARD_SIZES: [usize; 4] = [3, 4, 5, 6];
    pub const DEFAULT_BOARD_SIZE: usize = 4;
    /// Swipes shorter than this (CSS px) are treated as noise
    pub const SWIPE_THRESHOLD: f32 = 18.0;
}
