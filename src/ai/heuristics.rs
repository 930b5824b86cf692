//! Destination heuristics for computer-controlled pieces.
//!
//! Policies are trait-based so a host can swap in something smarter:
//! - [`DestinationPolicy`]: pick one cell out of the reachable set
//! - [`Greedy`]: the classroom AI (capture or flee, no lookahead)

use std::collections::BTreeSet;

use crate::board::{BoardState, Cell};
use crate::core::{GameRng, Role};
use crate::movement::Occupancy;

/// Chooses where a computer player moves.
pub trait DestinationPolicy: Send + Sync {
    /// Pick a destination from `reachable`. `None` only when it is empty.
    fn choose(
        &self,
        role: Role,
        reachable: &BTreeSet<Cell>,
        board: &BoardState,
        occupancy: &Occupancy,
        rng: &mut GameRng,
    ) -> Option<Cell>;
}

/// One-step greedy heuristics.
///
/// Evaders take, in order: the bonus tile, any safety-zone cell, a
/// move-again tile, and otherwise the cell maximising
/// `distance to chaser + (door_bias - distance to nearest door)` plus a
/// little jitter. The chaser captures if it can, else closes on the
/// nearest evader.
#[derive(Clone, Debug)]
pub struct Greedy {
    pub door_bias: f64,
    /// Upper bound of the random tie-breaker added to evader scores.
    pub jitter: f64,
}

impl Default for Greedy {
    fn default() -> Self {
        Self {
            door_bias: 20.0,
            jitter: 0.01,
        }
    }
}

impl Greedy {
    fn evader_cell(
        &self,
        reachable: &BTreeSet<Cell>,
        board: &BoardState,
        occupancy: &Occupancy,
        rng: &mut GameRng,
    ) -> Option<Cell> {
        if let Some(bonus) = board.bonus().filter(|t| reachable.contains(&t.cell)) {
            return Some(bonus.cell);
        }
        let grid = board.grid();
        if let Some(&safe) = reachable.iter().find(|c| grid.in_safety_zone(**c)) {
            return Some(safe);
        }
        if let Some(&again) = reachable.iter().find(|c| board.has_move_again_at(**c)) {
            return Some(again);
        }

        let chaser = occupancy.chaser();
        let mut best: Option<(Cell, f64)> = None;
        for &cell in reachable {
            let score = f64::from(cell.distance(chaser)) + self.door_bias
                - f64::from(grid.door_distance(cell))
                + rng.jitter(self.jitter);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((cell, score));
            }
        }
        best.map(|(cell, _)| cell)
    }

    fn chaser_cell(&self, reachable: &BTreeSet<Cell>, occupancy: &Occupancy) -> Option<Cell> {
        if let Some(&capture) = reachable.iter().find(|c| occupancy.evader_at(**c).is_some()) {
            return Some(capture);
        }
        reachable
            .iter()
            .min_by_key(|&&cell| {
                occupancy
                    .evader_cells()
                    .map(|e| cell.distance(e))
                    .min()
                    .unwrap_or(u32::MAX)
            })
            .copied()
    }
}

impl DestinationPolicy for Greedy {
    fn choose(
        &self,
        role: Role,
        reachable: &BTreeSet<Cell>,
        board: &BoardState,
        occupancy: &Occupancy,
        rng: &mut GameRng,
    ) -> Option<Cell> {
        match role {
            Role::Chaser => self.chaser_cell(reachable, occupancy),
            Role::Evader(_) => self.evader_cell(reachable, board, occupancy, rng),
        }
    }
}

/// Pick a destination with the default [`Greedy`] policy.
pub fn choose_destination(
    role: Role,
    reachable: &BTreeSet<Cell>,
    board: &BoardState,
    occupancy: &Occupancy,
    rng: &mut GameRng,
) -> Option<Cell> {
    Greedy::default().choose(role, reachable, board, occupancy, rng)
}
