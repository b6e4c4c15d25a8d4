//! Square tile grid and move directions
//!
//! Every direction is expressed through one mapping from
//! `(line, position-in-slide-order)` to `(row, col)`, so readers and writers
//! never need per-direction code paths.

use serde::{Deserialize, Serialize};

use crate::consts::BOARD_SIZES;

/// Slide direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Grid coordinate of the `pos`-th cell (counted from the edge tiles slide
    /// toward) of the `line`-th row or column on an `n`×`n` grid.
    ///
    /// Left/right walk rows, up/down walk columns; right/down walk backwards.
    #[inline]
    pub fn cell(&self, n: usize, line: usize, pos: usize) -> (usize, usize) {
        match self {
            Direction::Left => (line, pos),
            Direction::Right => (line, n - 1 - pos),
            Direction::Up => (pos, line),
            Direction::Down => (n - 1 - pos, line),
        }
    }
}

/// N×N board, row-major. 0 is an empty cell.
///
/// Deserialization checks the shape and tile values, so a damaged save never
/// yields a grid that indexes out of bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

/// Unchecked wire form of [`Grid`]
#[derive(Deserialize)]
struct GridRepr {
    size: usize,
    cells: Vec<u32>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = String;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        let GridRepr { size, cells } = repr;
        if !BOARD_SIZES.contains(&size) {
            return Err(format!("unsupported board size {}", size));
        }
        if cells.len() != size * size {
            return Err(format!(
                "{} cells for a {}×{} board",
                cells.len(),
                size,
                size
            ));
        }
        if let Some(bad) = cells.iter().find(|&&v| v == 1 || (v != 0 && !v.is_power_of_two())) {
            return Err(format!("invalid tile value {}", bad));
        }
        Ok(Self { size, cells })
    }
}

impl Grid {
    /// Empty `size`×`size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build from rows. Returns `None` unless the rows form a non-empty square.
    pub fn from_rows(rows: &[Vec<u32>]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|r| r.len() != size) {
            return None;
        }
        let cells = rows.iter().flatten().copied().collect();
        Some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.size + col] = value;
    }

    /// Values along one line in slide order for `dir`
    pub fn line(&self, dir: Direction, line: usize) -> Vec<u32> {
        (0..self.size)
            .map(|pos| {
                let (r, c) = dir.cell(self.size, line, pos);
                self.get(r, c)
            })
            .collect()
    }

    /// Write `values` along one line in slide order, padding with empty cells
    pub fn write_line(&mut self, dir: Direction, line: usize, values: &[u32]) {
        for pos in 0..self.size {
            let (r, c) = dir.cell(self.size, line, pos);
            self.set(r, c, values.get(pos).copied().unwrap_or(0));
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&v| v != 0)
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// True while some move could still change the grid: an empty cell exists
    /// or two orthogonal neighbours hold the same value.
    pub fn has_moves(&self) -> bool {
        let n = self.size;
        for r in 0..n {
            for c in 0..n {
                let v = self.get(r, c);
                if v == 0 {
                    return true;
                }
                if c + 1 < n && v == self.get(r, c + 1) {
                    return true;
                }
                if r + 1 < n && v == self.get(r + 1, c) {
                    return true;
                }
            }
        }
        false
    }
}

impl<const N: usize> From<[[u32; N]; N]> for Grid {
    fn from(rows: [[u32; N]; N]) -> Self {
        Self {
            size: N,
            cells: rows.iter().flatten().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_non_square() {
        assert!(Grid::from_rows(&[vec![2, 4], vec![4, 2]]).is_some());
        assert!(Grid::from_rows(&[vec![2, 4], vec![4]]).is_none());
        assert!(Grid::from_rows(&[]).is_none());
    }

    #[test]
    fn test_line_follows_slide_order() {
        let grid = Grid::from([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        assert_eq!(grid.line(Direction::Left, 1), vec![4, 5, 6]);
        assert_eq!(grid.line(Direction::Right, 1), vec![6, 5, 4]);
        assert_eq!(grid.line(Direction::Up, 2), vec![3, 6, 9]);
        assert_eq!(grid.line(Direction::Down, 0), vec![7, 4, 1]);
    }

    #[test]
    fn test_write_line_pads_with_empty() {
        let mut grid = Grid::from([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        grid.write_line(Direction::Down, 0, &[10]);
        assert_eq!(grid.to_rows(), vec![vec![0, 2, 3], vec![0, 5, 6], vec![10, 8, 9]]);
    }

    #[test]
    fn test_has_moves() {
        let stuck = Grid::from([[2, 4], [4, 2]]);
        assert!(!stuck.has_moves());

        let vertical_pair = Grid::from([[2, 4], [2, 8]]);
        assert!(vertical_pair.has_moves());

        let with_gap = Grid::from([[2, 0], [4, 2]]);
        assert!(with_gap.has_moves());
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!(Direction::from_str("Left"), Some(Direction::Left));
        assert_eq!(Direction::from_str("diagonal"), None);
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let ok: Grid = serde_json::from_str(r#"{"size":3,"cells":[2,0,0,0,4,0,0,0,2048]}"#).unwrap();
        assert_eq!(ok.get(2, 2), 2048);

        for bad in [
            r#"{"size":4,"cells":[2,2]}"#,
            r#"{"size":8,"cells":[]}"#,
            r#"{"size":3,"cells":[3,0,0,0,0,0,0,0,0]}"#,
            r#"{"size":3,"cells":[1,0,0,0,0,0,0,0,0]}"#,
        ] {
            assert!(serde_json::from_str::<Grid>(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_empty_cells_row_major() {
        let grid = Grid::from([[0, 2], [2, 0]]);
        assert_eq!(grid.empty_cells(), vec![(0, 0), (1, 1)]);
        assert_eq!(grid.tile_count(), 2);
    }
}
