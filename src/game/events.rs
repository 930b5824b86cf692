//! What the host feeds in, and what it is told to render.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, TileKind};
use crate::core::PlayerId;
use crate::questions::Question;
use crate::rules::{MatchOutcome, ScoreReason};
use crate::turns::{Throw, TurnPhase};

/// Identifies one question dialog.
///
/// Dialog callbacks carry it back so a late or repeated close for an old
/// question cannot touch the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromptId(pub u32);

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prompt #{}", self.0)
    }
}

/// Primitive UI events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// Run the opening roll and begin the first movement phase.
    StartMatch,
    /// Dice button. Also starts a low-roll penalty round.
    RollDice,
    CellClicked(Cell),
    /// Rock/paper/scissors button, or a choice in the question dialog.
    OptionSelected(usize),
    ModalOpening,
    ModalOpened,
    ModalClosing,
    ModalClosed { prompt: PromptId },
}

/// Why a turn produced no move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No die roll could move the piece.
    Trapped,
    /// This particular roll had nowhere to go.
    NoMoves,
}

/// Render intents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    PhaseChanged { from: TurnPhase, to: TurnPhase },
    /// Opening roll result: final rolls and the evader order they set.
    OrderRolled { rolls: Vec<(PlayerId, u8)>, order: Vec<PlayerId> },
    /// `extra` marks a bonus turn from a move-again tile on respawn.
    TurnStarted { player: PlayerId, extra: bool },
    DiceRolled { player: PlayerId, roll: u8, steps: u8 },
    HighlightReachable { player: PlayerId, cells: Vec<Cell> },
    PieceMoved { player: PlayerId, from: Cell, to: Cell },
    TurnSkipped { player: PlayerId, reason: SkipReason },
    TileSpawned { kind: TileKind, cell: Cell, rounds: u32 },
    TileExpired { kind: TileKind, cell: Cell },
    TileConsumed { kind: TileKind, cell: Cell, player: PlayerId },
    ScoreChanged { player: PlayerId, score: u32, reason: ScoreReason },
    Respawned { player: PlayerId, cell: Cell },
    /// Rock-paper-scissors: waiting on this player's throw.
    ThrowRequested { player: PlayerId },
    PenaltyThrows { throws: Vec<(PlayerId, Throw)>, losers: Vec<PlayerId> },
    /// Low-roll round; `losers` is empty when everybody tied.
    PenaltyRolls { rolls: Vec<(PlayerId, u8)>, losers: Vec<PlayerId> },
    QuestionPresented { prompt: PromptId, player: PlayerId, question: Question },
    /// `correct` is known only for a multiple-choice pick.
    AnswerRevealed { prompt: PromptId, answer: String, selected: Option<usize>, correct: Option<bool> },
    QuestionDismissed { prompt: PromptId },
    Message(String),
    MatchOver(MatchOutcome),
}
