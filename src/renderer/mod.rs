//! Render view-model
//!
//! Turns game state into plain data the DOM front end draws: per-cell
//! animation classes, the HUD, and particle-burst cues. Nothing here touches
//! the DOM, so it is shared by the wasm build and the native tests.

use crate::settings::Settings;
use crate::sim::{GameState, GameStatus, MergeEvent, Spawned};

/// How a cell should be drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Empty,
    /// Tile that simply slid or stayed
    Filled,
    /// Tile produced by a merge this move
    Merged,
    /// Tile spawned this move
    New,
}

impl CellClass {
    pub fn css(&self) -> &'static str {
        match self {
            CellClass::Empty => "tile",
            CellClass::Filled => "tile filled",
            CellClass::Merged => "tile merged",
            CellClass::New => "tile filled new",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub value: u32,
    pub class: CellClass,
}

/// Row-major cells for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub size: usize,
    pub cells: Vec<CellView>,
}

impl BoardView {
    /// View after an accepted move. Merge beats spawn if both hit one cell.
    pub fn after_move(state: &GameState, merges: &[MergeEvent], spawned: Option<Spawned>) -> Self {
        let grid = &state.grid;
        let n = grid.size();
        let mut cells = Vec::with_capacity(n * n);

        for row in 0..n {
            for col in 0..n {
                let value = grid.get(row, col);
                let class = if value == 0 {
                    CellClass::Empty
                } else if merges.iter().any(|m| m.row == row && m.col == col) {
                    CellClass::Merged
                } else if spawned.is_some_and(|s| s.row == row && s.col == col) {
                    CellClass::New
                } else {
                    CellClass::Filled
                };
                cells.push(CellView {
                    row,
                    col,
                    value,
                    class,
                });
            }
        }

        Self { size: n, cells }
    }

    /// View without animation (new game, undo, load)
    pub fn still(state: &GameState) -> Self {
        Self::after_move(state, &[], None)
    }

    /// CSS class for the board container
    pub fn board_class(&self) -> String {
        format!("board-{}", self.size)
    }

    /// Inner HTML for the board container
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.cells.len() * 48);
        for cell in &self.cells {
            if cell.value == 0 {
                html.push_str(r#"<div class="tile"></div>"#);
            } else {
                html.push_str(&format!(
                    r#"<div class="{}" data-v="{}">{}</div>"#,
                    cell.class.css(),
                    cell.value,
                    cell.value
                ));
            }
        }
        html
    }
}

/// Particle colour for a tile value
pub fn tile_color(value: u32) -> &'static str {
    match value {
        2 => "#a8d8ff",
        4 => "#7ec8ff",
        8 => "#55b8ff",
        16 => "#00f3ff",
        32 => "#ff80ff",
        64 => "#ff55ff",
        128 => "#ff33dd",
        256 => "#ffcc55",
        512 => "#ffbb00",
        1024 => "#66ffcc",
        2048 => "#00ffaa",
        4096 => "#cc66ff",
        8192 => "#ff6666",
        _ => "#ffffff",
    }
}

/// A burst of particles at one merged cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleBurst {
    pub row: usize,
    pub col: usize,
    pub color: &'static str,
    pub count: usize,
}

/// Bigger bursts for longer combos, capped at combo 8
pub fn burst_size(combo: u32) -> usize {
    10 + combo.min(8) as usize * 2
}

/// One burst per merge, or none when effects are off
pub fn particle_bursts(merges: &[MergeEvent], combo: u32, settings: &Settings) -> Vec<ParticleBurst> {
    if !settings.effective_particles() {
        return Vec::new();
    }
    merges
        .iter()
        .map(|m| ParticleBurst {
            row: m.row,
            col: m.col,
            color: tile_color(m.value),
            count: burst_size(combo),
        })
        .collect()
}

/// Text and flags for the score panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    pub best: u64,
    pub moves: u32,
    pub highest_tile: Option<u32>,
    pub best_combo: u32,
    pub efficiency: Option<u64>,
    /// `MM:SS` in time attack
    pub timer: Option<String>,
    pub timer_urgent: bool,
    pub undo_enabled: bool,
    /// e.g. `COMBO ×3`
    pub combo_banner: Option<String>,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let countdown = state.countdown.as_ref();
        Self {
            score: state.score.score,
            best: state.best_score,
            moves: state.score.moves,
            highest_tile: Some(state.score.highest_tile).filter(|&t| t > 0),
            best_combo: state.score.best_combo,
            efficiency: state.score.efficiency(),
            timer: countdown.map(|c| c.display()),
            timer_urgent: countdown.is_some_and(|c| c.is_urgent()),
            undo_enabled: state.can_undo(),
            combo_banner: state
                .combo
                .is_streak()
                .then(|| format!("COMBO ×{}", state.combo.count)),
        }
    }
}

/// Modal shown on a terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndScreen {
    pub won: bool,
    pub title: &'static str,
    pub score: u64,
    pub message: String,
    /// Only a win can be continued
    pub can_continue: bool,
}

impl EndScreen {
    pub fn from_state(state: &GameState) -> Option<Self> {
        let (won, title, reason) = match state.status {
            GameStatus::Active => return None,
            GameStatus::Won => (true, "VICTORY!", "You reached 2048!"),
            GameStatus::Lost => {
                let timed_out = state.countdown.as_ref().is_some_and(|c| c.remaining_ms == 0);
                let reason = if timed_out {
                    "Time's up!"
                } else {
                    "No moves left."
                };
                (false, "GAME OVER", reason)
            }
        };
        Some(Self {
            won,
            title,
            score: state.score.score,
            message: format!(
                "{} {} moves · Best tile: {}",
                reason, state.score.moves, state.score.highest_tile
            ),
            can_continue: won,
        })
    }
}
