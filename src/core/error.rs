//! Error taxonomy for the match core.
//!
//! Most of these are recovered locally by the controller and only logged.
//! `GenerationFailure`, `InvalidConfig`, and `Payload` are the ones a host
//! sees when setting a match up.

use thiserror::Error;

use crate::board::Cell;
use crate::core::PlayerId;
use crate::turns::TurnPhase;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A turn-queue entry does not resolve to a seated player.
    #[error("turn queue entry {player} is not in the roster")]
    InvalidQueueState { player: PlayerId },

    /// A move target outside the precomputed reachable set.
    #[error("cell {cell} is not reachable this turn")]
    UnreachableRequestedMove { cell: Cell },

    /// An expected UI continuation never arrived within its grace period.
    #[error("stalled waiting for {what}")]
    StalledAsyncCallback { what: &'static str },

    /// No impassable-tile layout satisfied the connectivity rule.
    #[error("board generation failed after {attempts} attempts")]
    GenerationFailure { attempts: u32 },

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),

    #[error("phase transition {from:?} -> {to:?} is not allowed")]
    InvalidTransition { from: TurnPhase, to: TurnPhase },

    /// The match is locked after victory.
    #[error("match is over")]
    MatchOver,

    #[error("question payload: {0}")]
    Payload(String),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        MatchError::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MatchError::GenerationFailure { attempts: 1000 };
        assert_eq!(err.to_string(), "board generation failed after 1000 attempts");

        let err = MatchError::UnreachableRequestedMove { cell: Cell::new(2, 3) };
        assert_eq!(err.to_string(), "cell D3 is not reachable this turn");

        let err = MatchError::InvalidTransition {
            from: TurnPhase::Movement,
            to: TurnPhase::RollOrder,
        };
        assert!(err.to_string().contains("Movement"));
    }

    #[test]
    fn test_from_json_error() {
        let err: MatchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MatchError::Payload(_)));
    }
}
