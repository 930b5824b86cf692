//! What a landing means: captures, goals, tile effects, and where a
//! scored evader comes back.

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, Cell, TileKind};
use crate::core::{MatchError, PlayerId, Role, Roster};

/// Everything triggered by a piece arriving on its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Evader caught by the chaser.
    pub capture: Option<PlayerId>,
    /// The mover is an evader now in the safety zone.
    pub goal: bool,
    /// Evader standing on the bonus tile.
    pub bonus: bool,
    /// Standing on a move-again tile.
    pub move_again: bool,
}

impl MoveOutcome {
    /// The mover's turn ends on this move. Reaching safety always ends it.
    #[must_use]
    pub fn ends_turn(&self) -> bool {
        self.goal || !self.move_again
    }
}

/// Inspect the board after `mover` has landed. Pure; nothing is consumed.
pub fn evaluate_move(board: &BoardState, roster: &Roster, mover: PlayerId) -> Result<MoveOutcome, MatchError> {
    let player = roster.require(mover)?;
    let cell = player.position;
    let tile = board.tile_at(cell);

    let outcome = match player.role {
        Role::Chaser => MoveOutcome {
            capture: roster
                .evaders()
                .find(|e| e.position == cell)
                .map(|e| e.id),
            move_again: tile == Some(TileKind::MoveAgain),
            ..MoveOutcome::default()
        },
        Role::Evader(_) => MoveOutcome {
            goal: board.grid().in_safety_zone(cell),
            bonus: tile == Some(TileKind::Bonus),
            move_again: tile == Some(TileKind::MoveAgain),
            ..MoveOutcome::default()
        },
    };
    Ok(outcome)
}

/// Evader corner farthest from the chaser that nobody else stands on.
///
/// Ties keep corner order. `None` when every corner is taken.
#[must_use]
pub fn respawn_corner(board: &BoardState, roster: &Roster, evader: PlayerId) -> Option<Cell> {
    let chaser = roster.position(roster.chaser())?;
    let taken = |cell: Cell| roster.iter().any(|p| p.id != evader && p.position == cell);

    let mut best: Option<(Cell, u32)> = None;
    for corner in board.grid().evader_corners() {
        if taken(corner) {
            continue;
        }
        let distance = corner.distance(chaser);
        if best.map_or(true, |(_, d)| distance > d) {
            best = Some((corner, distance));
        }
    }
    best.map(|(cell, _)| cell)
}
