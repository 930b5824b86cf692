//! Board state: water layout plus the ephemeral tiles currently showing.
//!
//! Water (impassable) tiles are placed once per match. A layout is only
//! accepted when every corner of the grid can still walk to a door;
//! generation gives up with `GenerationFailure` after a bounded number of
//! attempts instead of spinning forever.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::grid::{Cell, Grid};
use crate::core::{GameRng, MatchError};
use crate::movement::path_exists;

/// Kind of ephemeral tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Carrot: +1 point for the evader who picks it up.
    Bonus,
    /// Dice: the piece landing here rolls and moves again.
    MoveAgain,
}

/// A tile with a remaining lifespan in rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedTile {
    pub cell: Cell,
    pub rounds_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    grid: Grid,
    impassable: FxHashSet<Cell>,
    bonus: Option<TimedTile>,
    move_again: SmallVec<[TimedTile; 2]>,
}

impl BoardState {
    /// A board with a fixed water layout and no tiles.
    pub fn with_impassable(grid: Grid, impassable: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            grid,
            impassable: impassable.into_iter().filter(|c| grid.in_open_grid(*c)).collect(),
            bonus: None,
            move_again: SmallVec::new(),
        }
    }

    /// Random water layout that keeps every corner connected to a door.
    pub fn generate(
        grid: Grid,
        count: usize,
        max_attempts: u32,
        rng: &mut GameRng,
    ) -> Result<Self, MatchError> {
        let reserved: SmallVec<[Cell; 6]> = grid.corners().into_iter().chain(grid.doors()).collect();
        let mut candidates: Vec<Cell> = grid.cells().filter(|c| !reserved.contains(c)).collect();
        if count > candidates.len() {
            return Err(MatchError::GenerationFailure { attempts: 0 });
        }

        for attempt in 1..=max_attempts {
            rng.shuffle(&mut candidates);
            let board = Self::with_impassable(grid, candidates.iter().take(count).copied());
            if board.corners_connected() {
                debug!(attempt, count, "board generated");
                return Ok(board);
            }
        }

        warn!(max_attempts, count, "no connected water layout found");
        Err(MatchError::GenerationFailure { attempts: max_attempts })
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn is_impassable(&self, cell: Cell) -> bool {
        self.impassable.contains(&cell)
    }

    /// Water tiles in row-major order.
    #[must_use]
    pub fn impassable_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<_> = self.impassable.iter().copied().collect();
        cells.sort();
        cells
    }

    /// Open grid and not water.
    #[must_use]
    pub fn is_passable(&self, cell: Cell) -> bool {
        self.grid.in_open_grid(cell) && !self.is_impassable(cell)
    }

    /// `cell` can walk to at least one door through passable cells.
    #[must_use]
    pub fn connects_to_door(&self, cell: Cell) -> bool {
        self.grid
            .doors()
            .iter()
            .any(|&door| path_exists(cell, door, |c| self.is_passable(c)))
    }

    /// Every corner of the grid reaches a door.
    #[must_use]
    pub fn corners_connected(&self) -> bool {
        self.grid.corners().iter().all(|&c| self.connects_to_door(c))
    }

    // === Tiles ===

    #[must_use]
    pub fn bonus(&self) -> Option<TimedTile> {
        self.bonus
    }

    #[must_use]
    pub fn move_again_tiles(&self) -> &[TimedTile] {
        &self.move_again
    }

    #[must_use]
    pub fn has_bonus_at(&self, cell: Cell) -> bool {
        self.bonus.is_some_and(|t| t.cell == cell)
    }

    #[must_use]
    pub fn has_move_again_at(&self, cell: Cell) -> bool {
        self.move_again.iter().any(|t| t.cell == cell)
    }

    /// Any ephemeral tile on `cell`.
    #[must_use]
    pub fn tile_at(&self, cell: Cell) -> Option<TileKind> {
        if self.has_bonus_at(cell) {
            Some(TileKind::Bonus)
        } else if self.has_move_again_at(cell) {
            Some(TileKind::MoveAgain)
        } else {
            None
        }
    }

    /// Remove the bonus tile if it sits on `cell`.
    pub fn take_bonus_at(&mut self, cell: Cell) -> bool {
        if self.has_bonus_at(cell) {
            self.bonus = None;
            true
        } else {
            false
        }
    }

    /// Remove a move-again tile on `cell`.
    pub fn take_move_again_at(&mut self, cell: Cell) -> bool {
        match self.move_again.iter().position(|t| t.cell == cell) {
            Some(i) => {
                self.move_again.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn place_bonus(&mut self, cell: Cell, rounds: u32) {
        self.bonus = Some(TimedTile { cell, rounds_left: rounds });
    }

    pub fn place_move_again(&mut self, cell: Cell, rounds: u32) {
        if !self.has_move_again_at(cell) {
            self.move_again.push(TimedTile { cell, rounds_left: rounds });
        }
    }

    pub(crate) fn bonus_mut(&mut self) -> &mut Option<TimedTile> {
        &mut self.bonus
    }

    pub(crate) fn move_again_mut(&mut self) -> &mut SmallVec<[TimedTile; 2]> {
        &mut self.move_again
    }

    pub fn clear_tiles(&mut self) {
        self.bonus = None;
        self.move_again.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_impassable_ignores_off_grid() {
        let board = BoardState::with_impassable(Grid::new(8), [Cell::new(3, 3), Cell::new(9, 9)]);
        assert_eq!(board.impassable_cells(), vec![Cell::new(3, 3)]);
        assert!(!board.is_passable(Cell::new(3, 3)));
        assert!(board.is_passable(Cell::new(3, 4)));
        assert!(!board.is_passable(Cell::new(8, 7)));
    }

    #[test]
    fn test_generate_respects_reserved_cells() {
        let grid = Grid::new(8);
        let mut rng = GameRng::new(5);
        let board = BoardState::generate(grid, 8, 1000, &mut rng).unwrap();

        assert_eq!(board.impassable_cells().len(), 8);
        for cell in grid.corners().into_iter().chain(grid.doors()) {
            assert!(!board.is_impassable(cell));
        }
        assert!(board.corners_connected());
    }

    #[test]
    fn test_generate_is_seeded() {
        let grid = Grid::new(8);
        let a = BoardState::generate(grid, 8, 1000, &mut GameRng::new(11)).unwrap();
        let b = BoardState::generate(grid, 8, 1000, &mut GameRng::new(11)).unwrap();
        assert_eq!(a.impassable_cells(), b.impassable_cells());
    }

    #[test]
    fn test_generate_fails_when_walled_in() {
        // 57 of 58 free cells as water cannot leave a corridor for every corner.
        let grid = Grid::new(8);
        let result = BoardState::generate(grid, 57, 5, &mut GameRng::new(1));
        assert_eq!(result, Err(MatchError::GenerationFailure { attempts: 5 }));

        let result = BoardState::generate(grid, 100, 5, &mut GameRng::new(1));
        assert!(matches!(result, Err(MatchError::GenerationFailure { .. })));
    }

    #[test]
    fn test_disconnected_corner_detected() {
        // Wall off the top-left corner.
        let board = BoardState::with_impassable(Grid::new(8), [Cell::new(0, 1), Cell::new(1, 0)]);
        assert!(!board.connects_to_door(Cell::new(0, 0)));
        assert!(!board.corners_connected());
        assert!(board.connects_to_door(Cell::new(7, 0)));
    }

    #[test]
    fn test_tile_take() {
        let mut board = BoardState::with_impassable(Grid::new(8), []);
        board.place_bonus(Cell::new(2, 2), 2);
        board.place_move_again(Cell::new(4, 4), 1);
        board.place_move_again(Cell::new(4, 4), 1);

        assert_eq!(board.move_again_tiles().len(), 1);
        assert_eq!(board.tile_at(Cell::new(2, 2)), Some(TileKind::Bonus));
        assert_eq!(board.tile_at(Cell::new(4, 4)), Some(TileKind::MoveAgain));
        assert_eq!(board.tile_at(Cell::new(0, 0)), None);

        assert!(!board.take_bonus_at(Cell::new(4, 4)));
        assert!(board.take_bonus_at(Cell::new(2, 2)));
        assert!(board.bonus().is_none());
        assert!(board.take_move_again_at(Cell::new(4, 4)));
        assert!(!board.take_move_again_at(Cell::new(4, 4)));
    }
}
