//! The match controller.
//!
//! [`Match`] owns the [`MatchState`] and every collaborator that acts on
//! it: dice, RNG streams, the destination policy and the AI scheduler.
//! Hosts drive it with two calls:
//!
//! - [`Match::handle`] for UI input (clicks, dialog callbacks)
//! - [`Match::advance_time`] with the current time, which fires due AI
//!   actions and stalled-dialog recovery
//!
//! Both return the render intents produced. Time is logical: an AI action
//! runs at its due time and anything it schedules counts from there, so a
//! single `advance_time` call far in the future plays every due action in
//! order. Inputs are stamped with the last time passed to `advance_time`.

use tracing::{debug, info, warn};

use super::events::{Input, MatchEvent, PromptId};
use super::state::{MatchState, TurnRecord};
use crate::ai::{AiIntent, AiScheduler, DestinationPolicy, DueAction, Greedy, ModalState};
use crate::board::{BoardState, Cell, Grid, TileSchedule};
use crate::core::{Dice, GameRng, MatchConfig, MatchError, PlayerId, Roster};
use crate::questions::QuestionDeck;
use crate::rules::{MatchOutcome, ScoreReason};
use crate::turns::{roll_order, Throw, TurnPhase};

/// Upper bound on actions fired by one `advance_time` call.
const MAX_STEPS_PER_ADVANCE: usize = 4096;

pub struct Match {
    pub(super) state: MatchState,
    pub(super) deck: QuestionDeck,
    pub(super) dice: Box<dyn Dice>,
    pub(super) board_rng: GameRng,
    pub(super) tile_rng: GameRng,
    pub(super) ai_rng: GameRng,
    pub(super) policy: Box<dyn DestinationPolicy>,
    pub(super) scheduler: AiScheduler,
    pub(super) clock_ms: u64,
    /// Forced dismissal time for a dialog closed before its answer was shown.
    pub(super) stall_deadline: Option<u64>,
    pub(super) next_prompt: u32,
    /// Restart keeps the water layout instead of generating a new one.
    fixed_board: bool,
}

impl Match {
    /// Set up a match with a freshly generated board.
    ///
    /// Fails on an invalid config or when no connected water layout is
    /// found within the attempt cap.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let root = GameRng::new(config.seed);
        let mut board_rng = root.for_context("board");
        let board = BoardState::generate(
            Grid::new(config.grid_size),
            config.impassable_count,
            config.max_generation_attempts,
            &mut board_rng,
        )?;
        let dice = Box::new(root.for_context("dice"));
        Self::assemble(config, board, dice, board_rng, false)
    }

    /// Set up a match on a given board with given dice.
    pub fn with_parts(config: MatchConfig, board: BoardState, dice: Box<dyn Dice>) -> Result<Self, MatchError> {
        config.validate()?;
        if board.grid().size() != config.grid_size {
            return Err(MatchError::InvalidConfig(format!(
                "board is {} wide, config says {}",
                board.grid().size(),
                config.grid_size
            )));
        }
        let board_rng = GameRng::new(config.seed).for_context("board");
        Self::assemble(config, board, dice, board_rng, true)
    }

    fn assemble(
        config: MatchConfig,
        board: BoardState,
        dice: Box<dyn Dice>,
        board_rng: GameRng,
        fixed_board: bool,
    ) -> Result<Self, MatchError> {
        let grid = *board.grid();
        let roster = Roster::seat(config.player_count, &config.humans, &grid)?;
        let root = GameRng::new(config.seed);
        let mut tile_rng = root.for_context("tiles");
        let tiles = TileSchedule::new(&config.tiles, roster.evader_count(), &mut tile_rng);
        let scheduler = AiScheduler::new(config.retry.clone());
        info!(
            players = config.player_count,
            humans = config.humans.len(),
            seed = config.seed,
            water = ?board.impassable_cells(),
            "match set up"
        );
        Ok(Self {
            state: MatchState::new(config, roster, board, tiles),
            deck: QuestionDeck::default(),
            dice,
            board_rng,
            tile_rng,
            ai_rng: root.for_context("ai"),
            policy: Box::new(Greedy::default()),
            scheduler,
            clock_ms: 0,
            stall_deadline: None,
            next_prompt: 0,
            fixed_board,
        })
    }

    /// Replace the destination policy used by computer players.
    #[must_use]
    pub fn with_policy(mut self, policy: impl DestinationPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Replace the built-in question deck.
    #[must_use]
    pub fn with_questions(mut self, deck: QuestionDeck) -> Self {
        self.deck = deck;
        self
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// When the host should call [`Match::advance_time`] next, if anything
    /// is waiting on the clock.
    #[must_use]
    pub fn next_wakeup(&self) -> Option<u64> {
        match (self.scheduler.next_due(), self.stall_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply one UI input.
    ///
    /// Never fails: input that does not fit the current state is logged and
    /// produces no events.
    pub fn handle(&mut self, input: Input) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        match input {
            Input::ModalOpening => self.state.modal = ModalState::Opening,
            Input::ModalOpened => self.state.modal = ModalState::Open,
            Input::ModalClosing => self.state.modal = ModalState::Closing,
            Input::ModalClosed { prompt } => {
                self.state.modal = ModalState::Closed;
                if !self.state.is_over() {
                    self.on_modal_closed(prompt, &mut events);
                }
            }
            _ if self.state.is_over() => debug!(?input, "match is over, input ignored"),
            Input::StartMatch => self.start(&mut events),
            Input::RollDice => self.on_roll_clicked(&mut events),
            Input::CellClicked(cell) => self.on_cell_clicked(cell, &mut events),
            Input::OptionSelected(index) => self.on_option_selected(index, &mut events),
        }
        events
    }

    /// Move the clock to `now_ms`, firing whatever came due on the way.
    pub fn advance_time(&mut self, now_ms: u64) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        let mut steps = 0;
        while !self.state.is_over() {
            let action_due = self.scheduler.next_due().filter(|&due| due <= now_ms);
            let stall_due = self.stall_deadline.filter(|&due| due <= now_ms);
            match (action_due, stall_due) {
                (None, None) => break,
                (action, Some(stall)) if action.map_or(true, |a| stall <= a) => {
                    self.expire_stall(stall, &mut events);
                }
                _ => {
                    if let Some(action) = self.scheduler.poll(now_ms, self.state.modal) {
                        self.clock_ms = self.clock_ms.max(action.due_ms);
                        self.execute(action, &mut events);
                        self.scheduler.complete(action.token, self.clock_ms);
                    }
                }
            }
            steps += 1;
            if steps >= MAX_STEPS_PER_ADVANCE {
                warn!(now_ms, "too many actions in one time step, deferring the rest");
                break;
            }
        }
        self.clock_ms = self.clock_ms.max(now_ms);
        events
    }

    /// Back to a fresh match with the same roster.
    ///
    /// Every pending AI action and stall deadline is cancelled first. A
    /// generated board is regenerated; a board passed to
    /// [`Match::with_parts`] is kept with its tiles cleared.
    pub fn restart(&mut self) -> Result<Vec<MatchEvent>, MatchError> {
        self.scheduler.cancel_all();
        self.stall_deadline = None;

        let grid = *self.state.board.grid();
        let board = if self.fixed_board {
            let mut board = self.state.board.clone();
            board.clear_tiles();
            board
        } else {
            BoardState::generate(
                grid,
                self.state.config.impassable_count,
                self.state.config.max_generation_attempts,
                &mut self.board_rng,
            )?
        };
        let mut roster = self.state.roster.clone();
        roster.reset_positions(&grid);
        let tiles = TileSchedule::new(&self.state.config.tiles, roster.evader_count(), &mut self.tile_rng);

        let from = self.state.phase;
        self.state = MatchState::new(self.state.config.clone(), roster, board, tiles);
        self.deck.rewind();
        info!("match restarted");

        let mut events = Vec::new();
        if from != TurnPhase::RollOrder {
            events.push(MatchEvent::PhaseChanged { from, to: TurnPhase::RollOrder });
        }
        Ok(events)
    }

    fn start(&mut self, events: &mut Vec<MatchEvent>) {
        if self.state.started {
            debug!("match already started");
            return;
        }
        let players: Vec<PlayerId> = self.state.roster.iter().map(|p| p.id).collect();
        let opening = roll_order(self.dice.as_mut(), &players);
        let roster = &self.state.roster;
        self.state.evader_order = opening
            .order
            .iter()
            .copied()
            .filter(|&id| roster.role(id).is_some_and(|r| r.is_evader()))
            .collect();
        self.state.started = true;
        info!(rolls = ?opening.rolls, order = ?self.state.evader_order, "opening roll");
        events.push(MatchEvent::OrderRolled {
            rolls: opening.rolls,
            order: self.state.evader_order.clone(),
        });
        self.begin_movement(events);
    }

    fn on_roll_clicked(&mut self, events: &mut Vec<MatchEvent>) {
        match self.state.phase {
            TurnPhase::Movement => {
                let human_turn = self
                    .state
                    .turn
                    .as_ref()
                    .is_some_and(|t| t.awaiting_roll() && self.state.roster.is_human(t.player));
                if human_turn {
                    self.roll_for_turn(events);
                } else {
                    debug!("roll ignored, not a human turn");
                }
            }
            TurnPhase::PenaltySelection if self.state.roster.len() > 2 && self.state.roster.has_human() => {
                self.low_roll_round(events);
            }
            phase => debug!(%phase, "roll ignored"),
        }
    }

    fn on_cell_clicked(&mut self, cell: Cell, events: &mut Vec<MatchEvent>) {
        let human_turn = self.state.phase == TurnPhase::Movement
            && self
                .state
                .turn
                .as_ref()
                .is_some_and(|t| t.awaiting_move() && self.state.roster.is_human(t.player));
        if human_turn {
            self.move_piece(cell, events);
        } else {
            debug!(%cell, "click ignored");
        }
    }

    fn on_option_selected(&mut self, index: usize, events: &mut Vec<MatchEvent>) {
        match self.state.phase {
            TurnPhase::PenaltySelection => {
                let Some(actor) = self.state.rps_actor().filter(|&a| self.state.roster.is_human(a)) else {
                    debug!(index, "throw ignored, no human thrower");
                    return;
                };
                match Throw::from_index(index) {
                    Some(throw) => self.throw(actor, throw, events),
                    None => debug!(index, "unknown throw"),
                }
            }
            TurnPhase::PenaltyResolution => {
                let waiting = self
                    .state
                    .penalty
                    .prompt
                    .as_ref()
                    .is_some_and(|p| !p.revealed && self.state.roster.is_human(p.player));
                if !waiting {
                    debug!(index, "option ignored");
                    return;
                }
                self.reveal(Some(index), events);
                if self.stall_deadline.is_some() {
                    self.dismiss(events);
                }
            }
            phase => debug!(%phase, index, "option ignored"),
        }
    }

    fn on_modal_closed(&mut self, prompt: PromptId, events: &mut Vec<MatchEvent>) {
        let Some(open) = self.state.penalty.prompt.as_ref().filter(|p| p.id == prompt) else {
            debug!(%prompt, "stale dialog close ignored");
            return;
        };
        if open.revealed {
            self.dismiss(events);
        } else if self.stall_deadline.is_none() {
            let deadline = self.clock_ms.saturating_add(self.state.config.stall_grace_ms);
            debug!(%prompt, deadline, "dialog closed before an answer, waiting");
            self.stall_deadline = Some(deadline);
        }
    }

    fn expire_stall(&mut self, deadline: u64, events: &mut Vec<MatchEvent>) {
        self.clock_ms = self.clock_ms.max(deadline);
        self.stall_deadline = None;
        warn!(
            error = %MatchError::StalledAsyncCallback { what: "answer selection" },
            "forcing the question to close"
        );
        self.reveal(None, events);
        self.dismiss(events);
    }

    /// Run a fired AI action if it still fits the state.
    fn execute(&mut self, action: DueAction, events: &mut Vec<MatchEvent>) {
        let DueAction { player, intent, forced, .. } = action;
        if forced {
            debug!(%player, ?intent, "running forced action");
        }
        if !self.action_fits(player, intent) {
            debug!(%player, ?intent, "stale AI action dropped");
            return;
        }
        match intent {
            AiIntent::Roll => self.roll_for_turn(events),
            AiIntent::Move => self.ai_move(player, events),
            AiIntent::Throw => {
                let throw = Throw::random(&mut self.ai_rng);
                self.throw(player, throw, events);
            }
            AiIntent::PenaltyRoll => self.low_roll_round(events),
            AiIntent::RevealAnswer => {
                self.reveal(None, events);
                if self.stall_deadline.is_some() {
                    self.dismiss(events);
                } else {
                    self.schedule(player, AiIntent::DismissQuestion);
                }
            }
            AiIntent::DismissQuestion => self.dismiss(events),
        }
    }

    fn action_fits(&self, player: PlayerId, intent: AiIntent) -> bool {
        let state = &self.state;
        if state.roster.is_human(player) {
            return false;
        }
        let turn = state.turn.as_ref().filter(|t| t.player == player);
        let prompt = state.penalty.prompt.as_ref().filter(|p| p.player == player);
        match intent {
            AiIntent::Roll => state.phase == TurnPhase::Movement && turn.is_some_and(|t| t.awaiting_roll()),
            AiIntent::Move => state.phase == TurnPhase::Movement && turn.is_some_and(|t| t.awaiting_move()),
            AiIntent::Throw => state.phase == TurnPhase::PenaltySelection && state.rps_actor() == Some(player),
            AiIntent::PenaltyRoll => state.phase == TurnPhase::PenaltySelection && state.roster.len() > 2,
            AiIntent::RevealAnswer => state.phase == TurnPhase::PenaltyResolution && prompt.is_some_and(|p| !p.revealed),
            AiIntent::DismissQuestion => state.phase == TurnPhase::PenaltyResolution && prompt.is_some_and(|p| p.revealed),
        }
    }

    /// Schedule an AI action with its pacing delay.
    pub(super) fn schedule(&mut self, player: PlayerId, intent: AiIntent) {
        let delay = intent.delay(&self.state.config.ai);
        self.scheduler.schedule(player, intent, self.clock_ms, delay);
    }

    /// Switch phase through the transition table.
    pub(super) fn enter(&mut self, to: TurnPhase, events: &mut Vec<MatchEvent>) -> bool {
        let from = self.state.phase;
        match self.state.phase.transition(to) {
            Ok(()) => {
                info!(%from, %to, round = self.state.round, "phase changed");
                events.push(MatchEvent::PhaseChanged { from, to });
                true
            }
            Err(e) => {
                warn!(error = %e, "phase change rejected");
                false
            }
        }
    }

    /// Add a point; `true` when it ended the match.
    pub(super) fn award(&mut self, player: PlayerId, reason: ScoreReason, events: &mut Vec<MatchEvent>) -> bool {
        match self.state.scores.award(player, reason) {
            Ok(result) => {
                let score = self.state.scores.score(player);
                events.push(MatchEvent::ScoreChanged { player, score, reason });
                let round = self.state.round;
                self.state.record(TurnRecord::Scored { round, player, reason });
                match result {
                    Some(outcome) => {
                        self.finish_match(outcome, events);
                        true
                    }
                    None => false,
                }
            }
            Err(e) => {
                warn!(error = %e, %player, ?reason, "point rejected");
                self.state.is_over()
            }
        }
    }

    fn finish_match(&mut self, outcome: MatchOutcome, events: &mut Vec<MatchEvent>) {
        self.scheduler.cancel_all();
        self.stall_deadline = None;
        self.state.turn = None;
        self.state.interjected.clear();
        info!(?outcome, "match locked");
        events.push(MatchEvent::MatchOver(outcome));
    }
}
