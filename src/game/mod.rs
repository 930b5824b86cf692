//! The match itself: one state object and the controller that drives it.
//!
//! - [`state`]: [`MatchState`], everything a match mutates
//! - [`events`]: [`Input`] from the host, [`MatchEvent`] render intents back
//! - [`controller`]: [`Match`], input handling, the logical clock, restart
//!
//! The movement and penalty phases live in their own files as further
//! `impl Match` blocks.
//!
//! ```
//! use run_run_rabbit::core::MatchConfig;
//! use run_run_rabbit::game::{Input, Match, MatchEvent};
//!
//! let mut game = Match::new(MatchConfig::new(2).with_seed(7)).unwrap();
//! game.handle(Input::StartMatch);
//!
//! // Nobody is human: let the computer players run for a while.
//! let mut now = 0;
//! while !game.state().is_over() && now < 36_000_000 {
//!     now += 500;
//!     game.advance_time(now);
//! }
//! assert!(game.state().is_over());
//! ```

pub mod controller;
pub mod events;
mod penalty;
mod round;
pub mod state;

pub use controller::Match;
pub use events::{Input, MatchEvent, PromptId, SkipReason};
pub use state::{ActiveTurn, MatchState, OpenPrompt, PenaltyState, TurnRecord};
