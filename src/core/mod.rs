//! Core types: players and roster, RNG and dice, configuration, errors.
//!
//! Everything else in the crate builds on these.

pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use player::{Coat, Player, PlayerId, PlayerMap, Role, Roster};
pub use rng::{Dice, GameRng, LoadedDice, DIE_FACES};
pub use config::{AiPacing, MatchConfig, RetryPolicy, RoundRange, TileConfig};
pub use error::MatchError;
