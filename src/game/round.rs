//! Movement phase: the queue, rolls, moves and what landings trigger.

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::controller::Match;
use super::events::{MatchEvent, SkipReason};
use super::state::{ActiveTurn, MatchState, TurnRecord};
use crate::ai::AiIntent;
use crate::board::{Cell, TileChange, TileKind};
use crate::core::{MatchError, PlayerId};
use crate::movement::{is_trapped, reachable, Mover, Occupancy};
use crate::rules::{evaluate_move, respawn_corner, ScoreReason};
use crate::turns::{TurnPhase, TurnQueue};

impl Match {
    /// Enter the movement phase with a freshly built queue.
    pub(super) fn begin_movement(&mut self, events: &mut Vec<MatchEvent>) {
        if !self.enter(TurnPhase::Movement, events) {
            return;
        }
        let queue = match TurnQueue::build(&self.state.roster, &self.state.evader_order, self.state.rotation) {
            Ok(queue) => queue,
            Err(e) => {
                warn!(error = %e, "no turn queue, movement phase is empty");
                self.end_movement(events);
                return;
            }
        };
        self.state.queue = Some(queue);
        self.state.rotation += 1;
        self.state.round += 1;
        self.next_turn(events);
    }

    /// Hand the turn to whoever is next, skipping trapped evaders.
    pub(super) fn next_turn(&mut self, events: &mut Vec<MatchEvent>) {
        if self.state.is_over() {
            return;
        }
        while !self.state.interjected.is_empty() {
            let player = self.state.interjected.remove(0);
            if self.state.roster.contains(player) {
                self.start_turn(player, true, events);
                return;
            }
        }

        let MatchState { queue, roster, board, config, round, .. } = &mut self.state;
        let Some(queue) = queue.as_mut() else {
            warn!("movement phase without a queue");
            return;
        };
        let (roster, board) = (&*roster, &*board);
        queue.normalize(roster);

        let occupancy = Occupancy::from_roster(roster);
        let bonus = config.evader_step_bonus;
        let mut skipped: SmallVec<[PlayerId; 4]> = SmallVec::new();
        let next = queue.skip_if_trapped(|id| {
            let trapped = match roster.position(id) {
                Some(origin) => is_trapped(origin, bonus, board, &occupancy, Mover::Evader(id)),
                None => true,
            };
            if trapped {
                skipped.push(id);
            }
            trapped
        });

        let round = *round;
        for player in skipped {
            info!(%player, "trapped, turn skipped");
            events.push(MatchEvent::TurnSkipped { player, reason: SkipReason::Trapped });
            events.push(MatchEvent::Message(format!("{} is trapped and skips a turn", self.name(player))));
            self.state.record(TurnRecord::Skipped { round, player });
        }

        match next {
            Some(player) => self.start_turn(player, false, events),
            None => self.end_movement(events),
        }
    }

    fn start_turn(&mut self, player: PlayerId, extra: bool, events: &mut Vec<MatchEvent>) {
        debug!(%player, extra, "turn started");
        self.state.turn = Some(ActiveTurn::new(player, extra));
        events.push(MatchEvent::TurnStarted { player, extra });
        if !self.state.roster.is_human(player) {
            self.schedule(player, AiIntent::Roll);
        }
    }

    /// Roll for the current turn and offer the reachable cells.
    pub(super) fn roll_for_turn(&mut self, events: &mut Vec<MatchEvent>) {
        let Some(player) = self.state.turn.as_ref().filter(|t| t.awaiting_roll()).map(|t| t.player) else {
            return;
        };
        let (Some(role), Some(origin)) = (self.state.roster.role(player), self.state.roster.position(player)) else {
            warn!(error = %MatchError::UnknownPlayer(player), "turn for a player not seated");
            self.finish_turn(events);
            return;
        };

        let roll = self.dice.roll();
        let steps = if role.is_evader() {
            roll.saturating_add(self.state.config.evader_step_bonus)
        } else {
            roll
        };
        let mover = if role.is_chaser() { Mover::Chaser } else { Mover::Evader(player) };
        let occupancy = Occupancy::from_roster(&self.state.roster);
        let cells = reachable(origin, steps, &self.state.board, &occupancy, mover);

        debug!(%player, roll, steps, reachable = cells.len(), "rolled");
        events.push(MatchEvent::DiceRolled { player, roll, steps });
        let round = self.state.round;
        self.state.record(TurnRecord::Rolled { round, player, roll, steps });

        if cells.is_empty() {
            info!(%player, steps, "no reachable cell, turn skipped");
            events.push(MatchEvent::TurnSkipped { player, reason: SkipReason::NoMoves });
            events.push(MatchEvent::Message(format!("{} has nowhere to go", self.name(player))));
            self.state.record(TurnRecord::Skipped { round, player });
            self.finish_turn(events);
            return;
        }

        events.push(MatchEvent::HighlightReachable {
            player,
            cells: cells.iter().copied().collect(),
        });
        if let Some(turn) = self.state.turn.as_mut() {
            turn.roll = Some(roll);
            turn.steps = steps;
            turn.reachable = cells;
        }
        if !self.state.roster.is_human(player) {
            self.schedule(player, AiIntent::Move);
        }
    }

    pub(super) fn ai_move(&mut self, player: PlayerId, events: &mut Vec<MatchEvent>) {
        let Some(role) = self.state.roster.role(player) else {
            return;
        };
        let occupancy = Occupancy::from_roster(&self.state.roster);
        let choice = match self.state.turn.as_ref() {
            Some(turn) => self
                .policy
                .choose(role, &turn.reachable, &self.state.board, &occupancy, &mut self.ai_rng),
            None => None,
        };
        match choice {
            Some(cell) => self.move_piece(cell, events),
            None => {
                warn!(%player, "policy picked nothing, turn ends");
                self.finish_turn(events);
            }
        }
    }

    /// Move the current piece to `cell` and resolve the landing.
    ///
    /// A cell outside the offered set is rejected and nothing changes.
    pub(super) fn move_piece(&mut self, cell: Cell, events: &mut Vec<MatchEvent>) {
        let Some(turn) = self.state.turn.as_ref().filter(|t| t.awaiting_move()) else {
            return;
        };
        let player = turn.player;
        if !turn.reachable.contains(&cell) {
            warn!(error = %MatchError::UnreachableRequestedMove { cell }, %player, "move rejected");
            return;
        }
        let Some(piece) = self.state.roster.get_mut(player) else {
            return;
        };
        let from = piece.position;
        piece.position = cell;
        debug!(%player, %from, to = %cell, "moved");
        events.push(MatchEvent::PieceMoved { player, from, to: cell });
        let round = self.state.round;
        self.state.record(TurnRecord::Moved { round, player, from, to: cell });

        let outcome = match evaluate_move(&self.state.board, &self.state.roster, player) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "could not evaluate landing");
                self.finish_turn(events);
                return;
            }
        };

        if let Some(captured) = outcome.capture {
            events.push(MatchEvent::Message(format!(
                "{} caught {}!",
                self.name(player),
                self.name(captured)
            )));
            if self.award(player, ScoreReason::Capture, events) || self.respawn(captured, events) {
                return;
            }
        }
        if outcome.goal {
            events.push(MatchEvent::Message(format!("{} reached safety!", self.name(player))));
            if self.award(player, ScoreReason::Goal, events) || self.respawn(player, events) {
                return;
            }
        } else if outcome.bonus {
            self.consume(TileKind::Bonus, cell, player, events);
            if self.award(player, ScoreReason::Bonus, events) {
                return;
            }
        }

        if !outcome.ends_turn() {
            self.consume(TileKind::MoveAgain, cell, player, events);
            events.push(MatchEvent::Message(format!("{} rolls again!", self.name(player))));
            if let Some(turn) = self.state.turn.as_mut() {
                turn.roll = None;
                turn.reachable.clear();
            }
            self.roll_for_turn(events);
            return;
        }

        self.finish_turn(events);
    }

    /// Put a scored evader back on a corner. `true` when a pickup there
    /// ended the match.
    fn respawn(&mut self, evader: PlayerId, events: &mut Vec<MatchEvent>) -> bool {
        let Some(corner) = respawn_corner(&self.state.board, &self.state.roster, evader) else {
            warn!(player = %evader, "no free corner, evader stays put");
            return false;
        };
        if let Some(piece) = self.state.roster.get_mut(evader) {
            piece.position = corner;
        }
        info!(player = %evader, %corner, "respawned");
        events.push(MatchEvent::Respawned { player: evader, cell: corner });
        let round = self.state.round;
        self.state.record(TurnRecord::Respawned { round, player: evader, cell: corner });

        if self.state.board.has_bonus_at(corner) {
            self.consume(TileKind::Bonus, corner, evader, events);
            if self.award(evader, ScoreReason::Bonus, events) {
                return true;
            }
        }
        if self.state.board.has_move_again_at(corner) {
            self.consume(TileKind::MoveAgain, corner, evader, events);
            events.push(MatchEvent::Message(format!("{} gets a bonus turn!", self.name(evader))));
            self.state.interjected.push(evader);
        }
        false
    }

    fn consume(&mut self, kind: TileKind, cell: Cell, player: PlayerId, events: &mut Vec<MatchEvent>) {
        let taken = match kind {
            TileKind::Bonus => self.state.board.take_bonus_at(cell),
            TileKind::MoveAgain => self.state.board.take_move_again_at(cell),
        };
        if taken {
            debug!(%player, ?kind, %cell, "tile picked up");
            events.push(MatchEvent::TileConsumed { kind, cell, player });
            let round = self.state.round;
            self.state.record(TurnRecord::Picked { round, player, kind });
        }
    }

    /// Close the current turn and move on.
    pub(super) fn finish_turn(&mut self, events: &mut Vec<MatchEvent>) {
        if let Some(turn) = self.state.turn.take() {
            if !turn.extra {
                if let Some(queue) = self.state.queue.as_mut() {
                    queue.finish_current();
                }
            }
        }
        self.next_turn(events);
    }

    /// Everyone has moved: update tiles and start the penalty round.
    fn end_movement(&mut self, events: &mut Vec<MatchEvent>) {
        self.state.turn = None;
        self.state.queue = None;
        self.state.interjected.clear();

        let occupied = self.state.occupied_cells();
        let evaders = self.state.roster.evader_count();
        let MatchState { tiles, board, config, .. } = &mut self.state;
        let changes = tiles.end_of_round(board, &occupied, &config.tiles, evaders, &mut self.tile_rng);
        for change in changes {
            events.push(match change {
                TileChange::Spawned { kind, cell, rounds } => MatchEvent::TileSpawned { kind, cell, rounds },
                TileChange::Expired { kind, cell } => MatchEvent::TileExpired { kind, cell },
            });
        }

        if self.enter(TurnPhase::PenaltySelection, events) {
            self.begin_penalty(events);
        }
    }

    pub(super) fn name(&self, player: PlayerId) -> &'static str {
        self.state.roster.role(player).map_or("Nobody", |r| r.name())
    }
}
