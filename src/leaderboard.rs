//! Local leaderboard
//!
//! Persisted to LocalStorage, tracks the top 5 finished games.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, LEADERBOARD_KEY, Storage};
use crate::settings::ModeKind;

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 5;

/// A single finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    pub mode: ModeKind,
    pub board_size: usize,
    /// Unix timestamp (ms) when the game ended
    pub timestamp: f64,
}

impl LeaderboardEntry {
    /// e.g. `4×4 · classic`
    pub fn label(&self) -> String {
        format!(
            "{}×{} · {}",
            self.board_size,
            self.board_size,
            self.mode.as_str()
        )
    }
}

/// Top scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a finished game. Returns the rank achieved (1-indexed) or None
    /// if it didn't make the board. Ties rank below existing entries.
    pub fn record(
        &mut self,
        score: u64,
        mode: ModeKind,
        board_size: usize,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry {
            score,
            mode,
            board_size,
            timestamp,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Leaderboard>(storage, LEADERBOARD_KEY) {
            Some(mut board) => {
                board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                board.entries.truncate(MAX_ENTRIES);
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            None => Self::new(),
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save_json(storage, LEADERBOARD_KEY, self) {
            log::info!("Leaderboard saved ({} entries)", self.entries.len());
        }
    }
}

/// Format a timestamp as `DD/MM`
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    format!("{:02}/{:02}", date.get_date(), date.get_month() + 1)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}
