//! Match state: everything the controller mutates, in one place.
//!
//! ## MatchState
//!
//! - Configuration, roster, board and tile counters
//! - Score tracks and the terminal lock
//! - Phase, movement queue and the turn in progress
//! - Penalty round bookkeeping
//! - Turn history
//!
//! The history uses an `im` persistent vector, so cloning a state for a
//! snapshot or replay is cheap no matter how long the match has run.

use std::collections::BTreeSet;

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::events::PromptId;
use crate::ai::ModalState;
use crate::board::{BoardState, Cell, TileKind, TileSchedule};
use crate::core::{MatchConfig, PlayerId, Roster};
use crate::questions::Question;
use crate::rules::{ScoreReason, Scoreboard};
use crate::turns::{TurnPhase, TurnQueue};

/// The turn currently being played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTurn {
    pub player: PlayerId,
    /// Interjected by a move-again tile on respawn; does not touch the queue.
    pub extra: bool,
    /// Face shown, once rolled.
    pub roll: Option<u8>,
    /// Face plus any role bonus.
    pub steps: u8,
    pub reachable: BTreeSet<Cell>,
}

impl ActiveTurn {
    pub fn new(player: PlayerId, extra: bool) -> Self {
        Self {
            player,
            extra,
            roll: None,
            steps: 0,
            reachable: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn awaiting_roll(&self) -> bool {
        self.roll.is_none()
    }

    #[must_use]
    pub fn awaiting_move(&self) -> bool {
        self.roll.is_some() && !self.reachable.is_empty()
    }
}

/// A question shown to a penalty loser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPrompt {
    pub id: PromptId,
    pub player: PlayerId,
    pub question: Question,
    pub revealed: bool,
}

/// Penalty round bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyState {
    /// Roster index of the player who throws in rock-paper-scissors.
    pub actor: usize,
    /// Players who must answer, in roster order.
    pub losers: Vec<PlayerId>,
    /// Next loser to be asked.
    pub cursor: usize,
    pub prompt: Option<OpenPrompt>,
}

impl PenaltyState {
    /// Forget this round's losers; the actor pointer is kept.
    pub fn clear_round(&mut self) {
        self.losers.clear();
        self.cursor = 0;
        self.prompt = None;
    }
}

/// One entry in the match history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRecord {
    Rolled { round: u32, player: PlayerId, roll: u8, steps: u8 },
    Moved { round: u32, player: PlayerId, from: Cell, to: Cell },
    Skipped { round: u32, player: PlayerId },
    Scored { round: u32, player: PlayerId, reason: ScoreReason },
    Respawned { round: u32, player: PlayerId, cell: Cell },
    Picked { round: u32, player: PlayerId, kind: TileKind },
    Penalized { round: u32, losers: Vec<PlayerId> },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    pub config: MatchConfig,
    pub roster: Roster,
    pub board: BoardState,
    pub tiles: TileSchedule,
    pub scores: Scoreboard,

    pub phase: TurnPhase,
    /// The opening roll has been made.
    pub started: bool,
    /// Movement phases begun so far.
    pub round: u32,

    /// Movement queue, present during the movement phase.
    pub queue: Option<TurnQueue>,
    /// Evader order set by the opening roll.
    pub evader_order: Vec<PlayerId>,
    /// Bumped each time a queue is built.
    pub rotation: usize,
    pub turn: Option<ActiveTurn>,
    /// Evaders owed a bonus turn once the current one ends.
    pub interjected: SmallVec<[PlayerId; 2]>,

    pub penalty: PenaltyState,
    pub modal: ModalState,

    pub history: Vector<TurnRecord>,
}

impl MatchState {
    pub fn new(config: MatchConfig, roster: Roster, board: BoardState, tiles: TileSchedule) -> Self {
        let scores = Scoreboard::new(roster.len(), config.victory_points);
        let actor = roster.iter().position(|p| p.is_human).unwrap_or(0);
        Self {
            config,
            roster,
            board,
            tiles,
            scores,
            phase: TurnPhase::RollOrder,
            started: false,
            round: 0,
            queue: None,
            evader_order: Vec::new(),
            rotation: 0,
            turn: None,
            interjected: SmallVec::new(),
            penalty: PenaltyState {
                actor,
                ..PenaltyState::default()
            },
            modal: ModalState::Closed,
            history: Vector::new(),
        }
    }

    /// Whether the match has been won.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.scores.is_locked()
    }

    /// Player whose turn or prompt the match is waiting on.
    #[must_use]
    pub fn active_player(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::Movement => self.turn.as_ref().map(|t| t.player),
            TurnPhase::PenaltyResolution => self.penalty.prompt.as_ref().map(|p| p.player),
            TurnPhase::PenaltySelection => self.rps_actor(),
            TurnPhase::RollOrder => None,
        }
    }

    /// The rock-paper-scissors thrower, in two-player matches.
    #[must_use]
    pub fn rps_actor(&self) -> Option<PlayerId> {
        if self.roster.len() != 2 {
            return None;
        }
        self.roster.iter().nth(self.penalty.actor % self.roster.len()).map(|p| p.id)
    }

    /// Cells pieces currently stand on.
    #[must_use]
    pub fn occupied_cells(&self) -> SmallVec<[Cell; 4]> {
        self.roster.iter().map(|p| p.position).collect()
    }

    pub fn record(&mut self, record: TurnRecord) {
        self.history.push_back(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;
    use crate::core::{GameRng, Role};

    fn state(config: MatchConfig) -> MatchState {
        let grid = Grid::new(config.grid_size);
        let roster = Roster::seat(config.player_count, &config.humans, &grid).unwrap();
        let board = BoardState::with_impassable(grid, []);
        let tiles = TileSchedule::new(&config.tiles, roster.evader_count(), &mut GameRng::new(1));
        MatchState::new(config, roster, board, tiles)
    }

    #[test]
    fn test_new_state() {
        let s = state(MatchConfig::new(3));
        assert_eq!(s.phase, TurnPhase::RollOrder);
        assert!(!s.started && !s.is_over());
        assert_eq!(s.occupied_cells().len(), 3);
        assert_eq!(s.rps_actor(), None);
        assert!(s.history.is_empty());
    }

    #[test]
    fn test_rps_actor_starts_with_human() {
        let s = state(MatchConfig::new(2).with_human(Role::Chaser));
        assert_eq!(s.rps_actor(), Some(s.roster.chaser()));

        let s = state(MatchConfig::new(2));
        assert_eq!(s.rps_actor(), s.roster.iter().next().map(|p| p.id));
    }

    #[test]
    fn test_history_snapshot_is_independent() {
        let mut s = state(MatchConfig::new(2));
        s.record(TurnRecord::Skipped { round: 1, player: PlayerId::new(0) });
        let snapshot = s.clone();
        s.record(TurnRecord::Skipped { round: 1, player: PlayerId::new(0) });
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_turn_flags() {
        let mut turn = ActiveTurn::new(PlayerId::new(0), false);
        assert!(turn.awaiting_roll() && !turn.awaiting_move());
        turn.roll = Some(3);
        turn.reachable.insert(Cell::new(1, 1));
        assert!(turn.awaiting_move());
    }
}
