//! Score and combo bookkeeping
//!
//! A combo is a run of merge-producing moves, each landing within
//! `COMBO_WINDOW_MS` of the previous one. Every merge in a move is scored with
//! the same multiplier, derived from the combo level the move started at.

use serde::{Deserialize, Serialize};

use super::resolve::MergeEvent;
use crate::consts::COMBO_WINDOW_MS;

/// Score multiplier for a combo level: 1.0, 1.0, 1.5, 2.0, 2.5, ...
pub fn combo_multiplier(combo: u32) -> f64 {
    (1.0 + (f64::from(combo) - 1.0) * 0.5).max(1.0)
}

/// Rolling combo counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    /// Current combo level (0 = no combo)
    pub count: u32,
    /// Time of the last merge-producing move, in caller milliseconds
    pub last_merge_ms: Option<u64>,
}

impl ComboState {
    /// Update the combo for a move that changed the grid and return the new level.
    ///
    /// The last merge time survives a reset, so a merge following a slide-only
    /// move inside the window resumes at level 1.
    pub fn record_move(&mut self, merged: bool, now_ms: u64) -> u32 {
        if !merged {
            self.count = 0;
            return 0;
        }

        let within_window = self
            .last_merge_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < COMBO_WINDOW_MS);
        self.count = if within_window { self.count + 1 } else { 1 };
        self.last_merge_ms = Some(now_ms);
        self.count
    }

    /// Drop the combo without touching the merge clock
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Whether the combo banner should be showing
    pub fn is_streak(&self) -> bool {
        self.count >= 2
    }
}

/// Per-game score counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    /// Moves that changed the grid
    pub moves: u32,
    pub best_combo: u32,
    pub highest_tile: u32,
}

impl ScoreState {
    /// Score a move's merges at one combo level (the level the move started
    /// at). Returns the points added.
    pub fn apply_merges(&mut self, merges: &[MergeEvent], combo: u32) -> u64 {
        let multiplier = combo_multiplier(combo);
        let mut delta = 0;
        for merge in merges {
            delta += (f64::from(merge.value) * multiplier) as u64;
            self.observe_tile(merge.value);
        }
        self.score += delta;
        delta
    }

    /// Track the longest combo reached this game
    pub fn observe_combo(&mut self, combo: u32) {
        self.best_combo = self.best_combo.max(combo);
    }

    /// Track the largest tile seen this game
    pub fn observe_tile(&mut self, value: u32) {
        self.highest_tile = self.highest_tile.max(value);
    }

    /// Average points per move, rounded. `None` before the first move.
    pub fn efficiency(&self) -> Option<u64> {
        if self.moves == 0 {
            return None;
        }
        Some((self.score as f64 / f64::from(self.moves)).round() as u64)
    }
}
