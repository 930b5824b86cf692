//! Breadth-first reachability over exact step counts.
//!
//! A search state is `(cell, steps remaining)`. A cell may be revisited
//! with a different budget, which is how a piece walks out and back to
//! land exactly on its budget. Only states with zero steps left are
//! reported. The origin is never reported for a non-zero roll: a piece
//! always leaves its cell.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::board::{BoardState, Cell};
use crate::core::{PlayerId, Roster, DIE_FACES};

/// Who is moving. Evaders carry their id so they do not block themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mover {
    Chaser,
    Evader(PlayerId),
}

/// Where every piece stands, as seen by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    chaser: Cell,
    evaders: SmallVec<[(PlayerId, Cell); 3]>,
}

impl Occupancy {
    pub fn new(chaser: Cell, evaders: impl IntoIterator<Item = (PlayerId, Cell)>) -> Self {
        Self {
            chaser,
            evaders: evaders.into_iter().collect(),
        }
    }

    /// Snapshot of the roster's current positions.
    #[must_use]
    pub fn from_roster(roster: &Roster) -> Self {
        let chaser = roster
            .position(roster.chaser())
            .unwrap_or(Cell::new(-1, -1));
        Self::new(chaser, roster.evaders().map(|p| (p.id, p.position)))
    }

    #[must_use]
    pub fn chaser(&self) -> Cell {
        self.chaser
    }

    pub fn evader_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.evaders.iter().map(|&(_, cell)| cell)
    }

    #[must_use]
    pub fn evader_at(&self, cell: Cell) -> Option<PlayerId> {
        self.evaders.iter().find(|&&(_, c)| c == cell).map(|&(id, _)| id)
    }

    /// Every occupied cell, chaser first.
    #[must_use]
    pub fn occupied_cells(&self) -> SmallVec<[Cell; 4]> {
        std::iter::once(self.chaser).chain(self.evader_cells()).collect()
    }

    fn blocks_evader(&self, mover: PlayerId, cell: Cell) -> bool {
        cell == self.chaser
            || self
                .evaders
                .iter()
                .any(|&(id, c)| id != mover && c == cell)
    }
}

/// Can `mover` take a single orthogonal step `from -> to`?
fn step_allowed(board: &BoardState, occupancy: &Occupancy, mover: Mover, from: Cell, to: Cell) -> bool {
    let grid = board.grid();
    if !grid.on_board(to) || board.is_impassable(to) {
        return false;
    }
    match mover {
        Mover::Chaser => !grid.in_safety_zone(to),
        Mover::Evader(id) => {
            let entering_zone = grid.in_safety_zone(to) && !grid.in_safety_zone(from);
            if entering_zone && !grid.is_door(from) {
                return false;
            }
            !occupancy.blocks_evader(id, to)
        }
    }
}

/// Cells where `mover` can finish after exactly `steps` moves from `origin`.
///
/// ```
/// use run_run_rabbit::board::{BoardState, Cell, Grid};
/// use run_run_rabbit::core::PlayerId;
/// use run_run_rabbit::movement::{reachable, Mover, Occupancy};
///
/// let board = BoardState::with_impassable(Grid::new(8), []);
/// let occupancy = Occupancy::new(Cell::new(7, 7), [(PlayerId::new(0), Cell::new(0, 0))]);
/// let cells = reachable(Cell::new(0, 0), 1, &board, &occupancy, Mover::Evader(PlayerId::new(0)));
/// assert_eq!(cells.into_iter().collect::<Vec<_>>(), vec![Cell::new(0, 1), Cell::new(1, 0)]);
/// ```
#[must_use]
pub fn reachable(
    origin: Cell,
    steps: u8,
    board: &BoardState,
    occupancy: &Occupancy,
    mover: Mover,
) -> BTreeSet<Cell> {
    let mut result = BTreeSet::new();
    if steps == 0 {
        result.insert(origin);
        return result;
    }

    let mut visited: FxHashSet<(Cell, u8)> = FxHashSet::default();
    let mut queue = VecDeque::from([(origin, steps)]);

    while let Some((cell, remaining)) = queue.pop_front() {
        if !visited.insert((cell, remaining)) {
            continue;
        }
        if remaining == 0 {
            if cell != origin {
                result.insert(cell);
            }
            continue;
        }
        for next in cell.neighbors() {
            if step_allowed(board, occupancy, mover, cell, next) && !visited.contains(&(next, remaining - 1)) {
                queue.push_back((next, remaining - 1));
            }
        }
    }

    result
}

/// No roll of the die, plus `step_bonus`, gives `mover` anywhere to go.
#[must_use]
pub fn is_trapped(
    origin: Cell,
    step_bonus: u8,
    board: &BoardState,
    occupancy: &Occupancy,
    mover: Mover,
) -> bool {
    (1..=DIE_FACES).all(|roll| reachable(origin, roll + step_bonus, board, occupancy, mover).is_empty())
}

/// Plain BFS connectivity through cells accepted by `passable`.
///
/// `from` itself is not checked, only the cells walked into.
pub fn path_exists(from: Cell, to: Cell, passable: impl Fn(Cell) -> bool) -> bool {
    if from == to {
        return true;
    }
    let mut seen: FxHashSet<Cell> = FxHashSet::default();
    let mut queue = VecDeque::from([from]);
    seen.insert(from);

    while let Some(cell) = queue.pop_front() {
        for next in cell.neighbors() {
            if next == to && passable(next) {
                return true;
            }
            if passable(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
