//! Game settings and preferences
//!
//! Persisted separately from the save slot. Changing the board size or mode
//! starts a new game.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, SETTINGS_KEY, Storage};
use crate::sim::GameMode;

/// Mode as selected in the UI (duration lives in `Settings`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModeKind {
    #[default]
    Classic,
    Time,
    Extreme,
    Zen,
}

impl ModeKind {
    pub const ALL: [ModeKind; 4] = [
        ModeKind::Classic,
        ModeKind::Time,
        ModeKind::Extreme,
        ModeKind::Zen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Classic => "classic",
            ModeKind::Time => "time",
            ModeKind::Extreme => "extreme",
            ModeKind::Zen => "zen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(ModeKind::Classic),
            "time" | "time-attack" => Some(ModeKind::Time),
            "extreme" => Some(ModeKind::Extreme),
            "zen" => Some(ModeKind::Zen),
            _ => None,
        }
    }

    pub fn of(mode: &GameMode) -> Self {
        match mode {
            GameMode::Classic => ModeKind::Classic,
            GameMode::TimeAttack { .. } => ModeKind::Time,
            GameMode::Extreme => ModeKind::Extreme,
            GameMode::Zen => ModeKind::Zen,
        }
    }

    /// Announcement shown when the mode is picked
    pub fn announcement(&self, time_limit_secs: u32) -> String {
        match self {
            ModeKind::Classic => "Classic mode".to_string(),
            ModeKind::Time => format!(
                "Time attack - {}:{:02} on the clock!",
                time_limit_secs / 60,
                time_limit_secs % 60
            ),
            ModeKind::Extreme => "Extreme mode - only 4s spawn!".to_string(),
            ModeKind::Zen => "Zen mode - no game over, relax".to_string(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Board edge length (3-6)
    pub board_size: usize,
    pub mode: ModeKind,
    /// Time-attack duration
    pub time_limit_secs: u32,

    // === Visual Effects ===
    /// Particle bursts on merges
    pub particles: bool,
    /// Reduced motion (no particles, no merge pop)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            mode: ModeKind::Classic,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn is_valid_board_size(size: usize) -> bool {
        BOARD_SIZES.contains(&size)
    }

    /// Set the board size. Unsupported sizes are ignored.
    pub fn set_board_size(&mut self, size: usize) -> bool {
        if !Self::is_valid_board_size(size) {
            log::warn!("Ignoring unsupported board size {}", size);
            return false;
        }
        self.board_size = size;
        true
    }

    /// Rule set for the next game
    pub fn game_mode(&self) -> GameMode {
        match self.mode {
            ModeKind::Classic => GameMode::Classic,
            ModeKind::Time => GameMode::TimeAttack {
                duration_secs: self.time_limit_secs,
            },
            ModeKind::Extreme => GameMode::Extreme,
            ModeKind::Zen => GameMode::Zen,
        }
    }

    /// Effective particle effects (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Load settings, falling back to defaults for missing or invalid data
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Settings>(storage, SETTINGS_KEY) {
            Some(mut settings) => {
                if !Self::is_valid_board_size(settings.board_size) {
                    settings.board_size = DEFAULT_BOARD_SIZE;
                }
                if settings.time_limit_secs == 0 {
                    settings.time_limit_secs = DEFAULT_TIME_LIMIT_SECS;
                }
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save_json(storage, SETTINGS_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
