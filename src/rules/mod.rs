//! Scoring and victory.
//!
//! - [`evaluate`]: what a landing triggers, and respawn placement
//! - [`outcome`]: score tracks and the terminal lock
//!
//! Points only ever move through [`Scoreboard::award`], which refuses
//! everything once a match is over.

pub mod evaluate;
pub mod outcome;

pub use evaluate::{evaluate_move, respawn_corner, MoveOutcome};
pub use outcome::{MatchOutcome, ScoreReason, Scoreboard};
