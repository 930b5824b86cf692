//! Grid geometry: cells, doors, the safety zone, and corners.
//!
//! The open grid is `size x size`. The safety zone is an L-shaped strip
//! just outside the bottom-right corner:
//!
//! ```text
//!        col: ... N-2 N-1  N
//! row N-2          .   .   S
//! row N-1          .   W   S      W = chaser start
//! row N            S   S   S      S = safety zone
//! ```
//!
//! It is entered only from the two doors, `(N-1, N-2)` straight down and
//! `(N-2, N-1)` straight right.

use serde::{Deserialize, Serialize};

/// A board position. Safety-zone cells sit just outside the open grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i16,
    pub col: i16,
}

impl Cell {
    #[must_use]
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Manhattan distance.
    #[must_use]
    pub fn distance(self, other: Cell) -> u32 {
        (self.row - other.row).unsigned_abs() as u32 + (self.col - other.col).unsigned_abs() as u32
    }

    /// Orthogonal neighbours: down, up, right, left.
    #[must_use]
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.row + 1, self.col),
            Cell::new(self.row - 1, self.col),
            Cell::new(self.row, self.col + 1),
            Cell::new(self.row, self.col - 1),
        ]
    }
}

/// Column letter and 1-based row, as printed around the board ("A1").
impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match u8::try_from(self.col) {
            Ok(col) if col < 26 => write!(f, "{}{}", (b'A' + col) as char, self.row + 1),
            _ => write!(f, "({},{})", self.row, self.col),
        }
    }
}

/// Static geometry of a square board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: i16,
}

impl Grid {
    #[must_use]
    pub const fn new(size: i16) -> Self {
        Self { size }
    }

    #[must_use]
    pub const fn size(&self) -> i16 {
        self.size
    }

    /// Inside the `size x size` playing area.
    #[must_use]
    pub fn in_open_grid(&self, cell: Cell) -> bool {
        (0..self.size).contains(&cell.row) && (0..self.size).contains(&cell.col)
    }

    #[must_use]
    pub fn in_safety_zone(&self, cell: Cell) -> bool {
        let n = self.size;
        (cell.row == n && (n - 2..=n).contains(&cell.col))
            || (cell.col == n && (n - 2..=n).contains(&cell.row))
    }

    /// Either on the open grid or in the safety zone.
    #[must_use]
    pub fn on_board(&self, cell: Cell) -> bool {
        self.in_open_grid(cell) || self.in_safety_zone(cell)
    }

    /// Bottom door then right door.
    #[must_use]
    pub fn doors(&self) -> [Cell; 2] {
        let n = self.size;
        [Cell::new(n - 1, n - 2), Cell::new(n - 2, n - 1)]
    }

    #[must_use]
    pub fn is_door(&self, cell: Cell) -> bool {
        self.doors().contains(&cell)
    }

    /// The open cell diagonally inside both doors.
    #[must_use]
    pub fn door_approach(&self) -> Cell {
        Cell::new(self.size - 2, self.size - 2)
    }

    /// All four corners of the open grid.
    #[must_use]
    pub fn corners(&self) -> [Cell; 4] {
        let last = self.size - 1;
        [
            Cell::new(0, 0),
            Cell::new(last, 0),
            Cell::new(0, last),
            Cell::new(last, last),
        ]
    }

    /// Corners an evader may start from or respawn on.
    #[must_use]
    pub fn evader_corners(&self) -> [Cell; 3] {
        let last = self.size - 1;
        [Cell::new(0, 0), Cell::new(last, 0), Cell::new(0, last)]
    }

    /// Distance from `cell` to the closer door.
    #[must_use]
    pub fn door_distance(&self, cell: Cell) -> u32 {
        self.doors()
            .iter()
            .map(|d| d.distance(cell))
            .min()
            .unwrap_or(0)
    }

    /// Every open-grid cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Cell::new(row, col)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_distance_and_display() {
        assert_eq!(Cell::new(0, 0).distance(Cell::new(7, 7)), 14);
        assert_eq!(Cell::new(3, 1).distance(Cell::new(1, 4)), 5);
        assert_eq!(Cell::new(0, 0).to_string(), "A1");
        assert_eq!(Cell::new(7, 6).to_string(), "G8");
        assert_eq!(Cell::new(0, -1).to_string(), "(0,-1)");
    }

    #[test]
    fn test_safety_zone_shape() {
        let grid = Grid::new(8);
        let zone: Vec<_> = [
            Cell::new(8, 6),
            Cell::new(8, 7),
            Cell::new(8, 8),
            Cell::new(6, 8),
            Cell::new(7, 8),
        ]
        .to_vec();
        for cell in &zone {
            assert!(grid.in_safety_zone(*cell), "{cell:?}");
            assert!(!grid.in_open_grid(*cell));
        }
        assert!(!grid.in_safety_zone(Cell::new(8, 5)));
        assert!(!grid.in_safety_zone(Cell::new(5, 8)));
        assert!(!grid.in_safety_zone(Cell::new(7, 7)));
        assert!(!grid.on_board(Cell::new(-1, 0)));
    }

    #[test]
    fn test_doors_touch_safety_zone() {
        let grid = Grid::new(8);
        let [bottom, right] = grid.doors();
        assert_eq!(bottom, Cell::new(7, 6));
        assert_eq!(right, Cell::new(6, 7));
        assert!(grid.in_safety_zone(Cell::new(bottom.row + 1, bottom.col)));
        assert!(grid.in_safety_zone(Cell::new(right.row, right.col + 1)));
        assert_eq!(grid.door_approach(), Cell::new(6, 6));
    }

    #[test]
    fn test_door_distance() {
        let grid = Grid::new(8);
        assert_eq!(grid.door_distance(Cell::new(7, 6)), 0);
        assert_eq!(grid.door_distance(Cell::new(0, 0)), 13);
    }

    #[test]
    fn test_cells_row_major() {
        let grid = Grid::new(4);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[5], Cell::new(1, 1));
    }
}
