//! Tile spawning

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::state::GameMode;

/// A tile placed after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawned {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Value of the next spawned tile: always 4 in Extreme, otherwise 2 (90%) or 4 (10%)
pub fn spawn_value<R: Rng + ?Sized>(mode: &GameMode, rng: &mut R) -> u32 {
    if matches!(mode, GameMode::Extreme) || rng.random_bool(0.1) {
        4
    } else {
        2
    }
}

/// Place one tile in a uniformly chosen empty cell.
/// Returns `None` when the grid is full.
pub fn spawn_tile<R: Rng + ?Sized>(grid: &mut Grid, mode: &GameMode, rng: &mut R) -> Option<Spawned> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let (row, col) = empty[rng.random_range(0..empty.len())];
    let value = spawn_value(mode, rng);
    grid.set(row, col, value);
    Some(Spawned { row, col, value })
}
