//! Move resolution: slide and merge every line toward one edge
//!
//! Pure function of `(grid, direction)`. No randomness, no scoring; the state
//! machine consumes the merge list afterwards.

use serde::{Deserialize, Serialize};

use super::grid::{Direction, Grid};

/// One merge produced by a move, at the merged tile's final position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEvent {
    pub row: usize,
    pub col: usize,
    /// Value of the tile after merging
    pub value: u32,
}

/// Result of resolving one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub grid: Grid,
    /// Merges in line order, then slide order within each line
    pub merges: Vec<MergeEvent>,
    /// Whether any tile moved or merged
    pub changed: bool,
}

impl Resolution {
    /// A resolution that leaves `grid` untouched
    pub fn unchanged(grid: &Grid) -> Self {
        Self {
            grid: grid.clone(),
            merges: Vec::new(),
            changed: false,
        }
    }

    /// Sum of all merge results
    pub fn merged_value(&self) -> u64 {
        self.merges.iter().map(|m| u64::from(m.value)).sum()
    }
}

/// Slide and merge `grid` toward `dir`
pub fn resolve(grid: &Grid, dir: Direction) -> Resolution {
    let n = grid.size();
    let mut out = Grid::new(n);
    let mut merges = Vec::new();

    for line in 0..n {
        let tiles: Vec<u32> = grid.line(dir, line).into_iter().filter(|&v| v != 0).collect();
        let (packed, merged_at) = merge_line(&tiles);

        out.write_line(dir, line, &packed);
        for pos in merged_at {
            let (row, col) = dir.cell(n, line, pos);
            merges.push(MergeEvent {
                row,
                col,
                value: packed[pos],
            });
        }
    }

    let changed = out != *grid;
    Resolution {
        grid: out,
        merges,
        changed,
    }
}

/// Resolve a direction given by name. Anything other than
/// up/down/left/right leaves the grid unchanged.
pub fn resolve_named(grid: &Grid, dir: &str) -> Resolution {
    match Direction::from_str(dir) {
        Some(dir) => resolve(grid, dir),
        None => Resolution::unchanged(grid),
    }
}

/// Merge a compacted line (no zeros). Returns the packed line and the packed
/// indices that hold freshly merged tiles.
///
/// Pairs are consumed left to right, so `[2, 2, 2]` becomes `[4, 2]` and a
/// merged tile never merges again in the same pass.
fn merge_line(tiles: &[u32]) -> (Vec<u32>, Vec<usize>) {
    let mut packed = Vec::with_capacity(tiles.len());
    let mut merged_at = Vec::new();

    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            merged_at.push(packed.len());
            packed.push(tiles[i] * 2);
            i += 2;
        } else {
            packed.push(tiles[i]);
            i += 1;
        }
    }

    (packed, merged_at)
}
