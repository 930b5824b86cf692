//! Spawning and ageing of bonus and move-again tiles.
//!
//! [`TileSchedule::end_of_round`] runs once each time a movement phase
//! closes. It first ages existing tiles, then spawns new ones whose
//! interval has elapsed. A tile spawned by one call is not aged by the
//! next; its lifespan starts counting the round after it first shows.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::grid::Cell;
use super::layout::{BoardState, TileKind};
use crate::core::{GameRng, TileConfig};

/// Something that happened to a tile during the round-end update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileChange {
    Spawned { kind: TileKind, cell: Cell, rounds: u32 },
    Expired { kind: TileKind, cell: Cell },
}

/// Round counters for both tile kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSchedule {
    rounds_since_bonus: u32,
    next_bonus_in: u32,
    bonus_just_spawned: bool,
    rounds_since_move_again: u32,
    next_move_again_in: u32,
    move_again_just_spawned: bool,
}

impl TileSchedule {
    /// Fresh counters with the first spawn intervals drawn.
    pub fn new(config: &TileConfig, evaders: usize, rng: &mut GameRng) -> Self {
        let bonus = config.bonus_interval_for(evaders);
        let move_again = config.move_again_interval;
        Self {
            rounds_since_bonus: 0,
            next_bonus_in: rng.between(bonus.min, bonus.max),
            bonus_just_spawned: false,
            rounds_since_move_again: 0,
            next_move_again_in: rng.between(move_again.min, move_again.max),
            move_again_just_spawned: false,
        }
    }

    /// Age existing tiles, then spawn any that are due.
    ///
    /// `occupied` are the cells pieces currently stand on.
    pub fn end_of_round(
        &mut self,
        board: &mut BoardState,
        occupied: &[Cell],
        config: &TileConfig,
        evaders: usize,
        rng: &mut GameRng,
    ) -> SmallVec<[TileChange; 4]> {
        let mut changes = SmallVec::new();
        self.rounds_since_bonus += 1;
        self.rounds_since_move_again += 1;

        self.age_bonus(board, &mut changes);
        self.age_move_again(board, &mut changes);

        if board.bonus().is_none() && self.rounds_since_bonus >= self.next_bonus_in {
            if let Some(change) = spawn_bonus(board, occupied, config, rng) {
                changes.push(change);
                self.bonus_just_spawned = true;
                self.rounds_since_bonus = 0;
                let interval = config.bonus_interval_for(evaders);
                self.next_bonus_in = rng.between(interval.min, interval.max);
            }
        }

        if self.rounds_since_move_again >= self.next_move_again_in {
            let spawned = spawn_move_again(board, occupied, config, rng);
            if !spawned.is_empty() {
                self.move_again_just_spawned = true;
            }
            changes.extend(spawned);
            self.rounds_since_move_again = 0;
            let interval = config.move_again_interval;
            self.next_move_again_in = rng.between(interval.min, interval.max);
        }

        changes
    }

    fn age_bonus(&mut self, board: &mut BoardState, changes: &mut SmallVec<[TileChange; 4]>) {
        let slot = board.bonus_mut();
        let Some(tile) = slot.as_mut() else {
            return;
        };
        if self.bonus_just_spawned {
            self.bonus_just_spawned = false;
            return;
        }
        tile.rounds_left = tile.rounds_left.saturating_sub(1);
        if tile.rounds_left == 0 {
            let cell = tile.cell;
            *slot = None;
            debug!(%cell, "bonus tile expired");
            changes.push(TileChange::Expired { kind: TileKind::Bonus, cell });
        }
    }

    fn age_move_again(&mut self, board: &mut BoardState, changes: &mut SmallVec<[TileChange; 4]>) {
        let tiles = board.move_again_mut();
        if tiles.is_empty() {
            return;
        }
        if self.move_again_just_spawned {
            self.move_again_just_spawned = false;
            return;
        }
        for tile in tiles.iter_mut() {
            tile.rounds_left = tile.rounds_left.saturating_sub(1);
        }
        tiles.retain(|tile| {
            if tile.rounds_left == 0 {
                changes.push(TileChange::Expired { kind: TileKind::MoveAgain, cell: tile.cell });
                false
            } else {
                true
            }
        });
    }
}

/// Cells where a bonus may appear.
fn bonus_candidates(board: &BoardState, occupied: &[Cell]) -> Vec<Cell> {
    let grid = *board.grid();
    grid.cells()
        .filter(|&c| {
            !grid.is_door(c)
                && !occupied.contains(&c)
                && !board.is_impassable(c)
                && !board.has_move_again_at(c)
        })
        .collect()
}

/// Cells where a move-again tile may appear.
fn move_again_candidates(board: &BoardState, occupied: &[Cell]) -> Vec<Cell> {
    let grid = *board.grid();
    let approach = grid.door_approach();
    grid.cells()
        .filter(|&c| {
            !grid.is_door(c)
                && c != approach
                && !occupied.contains(&c)
                && !board.is_impassable(c)
                && board.tile_at(c).is_none()
        })
        .collect()
}

fn spawn_bonus(
    board: &mut BoardState,
    occupied: &[Cell],
    config: &TileConfig,
    rng: &mut GameRng,
) -> Option<TileChange> {
    let candidates = bonus_candidates(board, occupied);
    let Some(&cell) = rng.choose(&candidates) else {
        debug!("no free cell for a bonus tile");
        return None;
    };
    let rounds = rng.between(config.bonus_lifespan.min, config.bonus_lifespan.max);
    board.place_bonus(cell, rounds);
    debug!(%cell, rounds, "bonus tile spawned");
    Some(TileChange::Spawned { kind: TileKind::Bonus, cell, rounds })
}

fn spawn_move_again(
    board: &mut BoardState,
    occupied: &[Cell],
    config: &TileConfig,
    rng: &mut GameRng,
) -> SmallVec<[TileChange; 2]> {
    let mut spawned = SmallVec::new();
    let room = config.move_again_max.saturating_sub(board.move_again_tiles().len());
    if room == 0 {
        return spawned;
    }
    let batch = rng.between(config.move_again_batch.min, config.move_again_batch.max) as usize;

    let mut candidates = move_again_candidates(board, occupied);
    rng.shuffle(&mut candidates);
    for cell in candidates.into_iter().take(batch.min(room)) {
        board.place_move_again(cell, config.move_again_lifespan);
        debug!(%cell, "move-again tile spawned");
        spawned.push(TileChange::Spawned {
            kind: TileKind::MoveAgain,
            cell,
            rounds: config.move_again_lifespan,
        });
    }
    spawned
}
