//! # run-run-rabbit
//!
//! Turn-order, penalty-round and computer-player coordination for the Run
//! Run Rabbit classroom board game.
//!
//! A wolf chases one to three rabbits across a grid dotted with water.
//! Rabbits score by slipping through a door into the safety zone, or by
//! picking up a carrot; the wolf scores by landing on a rabbit. Between
//! movement rounds a penalty round picks who answers a trivia question.
//!
//! ## Design Principles
//!
//! 1. **Events in, render intents out**: the crate never draws, plays
//!    sounds or stores anything. A host feeds [`game::Input`] and the
//!    current time, and renders the [`game::MatchEvent`]s it gets back.
//!
//! 2. **One state object**: everything a match mutates lives in
//!    [`game::MatchState`]; there are no globals.
//!
//! 3. **Single pending token**: at most one computer action is scheduled
//!    at a time, and a fired action checks its token before touching state.
//!
//! ## Modules
//!
//! - `core`: players and roster, RNG and dice, configuration, errors
//! - `board`: grid geometry, water layout, bonus and move-again tiles
//! - `movement`: reachable cells for an exact step count
//! - `turns`: phases, the movement queue, penalty-round rules
//! - `ai`: destination heuristics and the action scheduler
//! - `rules`: landings, respawn and score tracks
//! - `questions`: question payload and deck
//! - `game`: the match controller wiring the above together

pub mod core;
pub mod board;
pub mod movement;
pub mod turns;
pub mod ai;
pub mod rules;
pub mod questions;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    Coat, Dice, GameRng, LoadedDice, MatchConfig, MatchError, Player, PlayerId, PlayerMap, Role, Roster,
};

pub use crate::board::{BoardState, Cell, Grid, TileKind};

pub use crate::movement::{reachable, Mover, Occupancy};

pub use crate::turns::{Throw, TurnPhase, TurnQueue};

pub use crate::ai::{AiScheduler, DestinationPolicy, Greedy, ModalState};

pub use crate::rules::{MatchOutcome, ScoreReason, Scoreboard};

pub use crate::questions::{Question, QuestionDeck};

pub use crate::game::{Input, Match, MatchEvent, MatchState, PromptId};
