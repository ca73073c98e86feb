//! Cell states and the 8x8 board each peer keeps two copies of: its own
//! fleet grid and a mirror of the opponent populated only from results.

use crate::common::RuleError;
use crate::config::GRID_SIZE;

/// Contents of a single grid cell. The opponent mirror only ever holds
/// `Empty`, `Hit` or `Miss`; un-hit enemy ships are never revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship,
    Hit,
    Miss,
}

/// An 8x8 board of cells with bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[Cell; GRID_SIZE as usize]; GRID_SIZE as usize],
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; GRID_SIZE as usize]; GRID_SIZE as usize],
        }
    }

    /// Whether (`row`, `col`) lies on the board.
    pub fn in_bounds(row: u8, col: u8) -> bool {
        row < GRID_SIZE && col < GRID_SIZE
    }

    pub fn get(&self, row: u8, col: u8) -> Result<Cell, RuleError> {
        if !Self::in_bounds(row, col) {
            return Err(RuleError::OutOfBounds);
        }
        Ok(self.cells[row as usize][col as usize])
    }

    pub fn set(&mut self, row: u8, col: u8, cell: Cell) -> Result<(), RuleError> {
        if !Self::in_bounds(row, col) {
            return Err(RuleError::OutOfBounds);
        }
        self.cells[row as usize][col as usize] = cell;
        Ok(())
    }

    /// Iterate all cells as (row, col, state).
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (r as u8, c as u8, *cell))
        })
    }

    /// Count of cells in the given state.
    pub fn count(&self, state: Cell) -> usize {
        self.iter().filter(|(_, _, cell)| *cell == state).count()
    }

    /// Reset every cell to `Empty`.
    pub fn clear(&mut self) {
        self.cells = [[Cell::Empty; GRID_SIZE as usize]; GRID_SIZE as usize];
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let grid = Grid::new();
        assert_eq!(grid.count(Cell::Empty), 64);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut grid = Grid::new();
        grid.set(3, 4, Cell::Ship).unwrap();
        assert_eq!(grid.get(3, 4).unwrap(), Cell::Ship);
        assert_eq!(grid.get(4, 3).unwrap(), Cell::Empty);
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut grid = Grid::new();
        assert_eq!(grid.get(8, 0), Err(RuleError::OutOfBounds));
        assert_eq!(grid.set(0, 8, Cell::Miss), Err(RuleError::OutOfBounds));
    }
}
