//! The four turn phases and the table of allowed transitions.

use serde::{Deserialize, Serialize};

use crate::core::MatchError;

/// Which part of the round is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Opening roll that fixes the evader order. Only at match start.
    RollOrder,
    /// Each queued player rolls and moves.
    Movement,
    /// Rock-paper-scissors (2 players) or low roll (3-4) picks who answers.
    PenaltySelection,
    /// Each loser is shown a question in turn.
    PenaltyResolution,
}

impl TurnPhase {
    /// Transition table.
    ///
    /// ```
    /// use run_run_rabbit::turns::TurnPhase;
    ///
    /// assert!(TurnPhase::Movement.can_transition(TurnPhase::PenaltySelection));
    /// assert!(!TurnPhase::Movement.can_transition(TurnPhase::RollOrder));
    /// ```
    #[must_use]
    pub const fn can_transition(self, to: TurnPhase) -> bool {
        matches!(
            (self, to),
            (TurnPhase::RollOrder, TurnPhase::Movement)
                | (TurnPhase::Movement, TurnPhase::PenaltySelection)
                | (TurnPhase::PenaltySelection, TurnPhase::PenaltyResolution)
                | (TurnPhase::PenaltyResolution, TurnPhase::Movement)
        )
    }

    /// Move to `to`, or fail with `InvalidTransition` and stay put.
    pub fn transition(&mut self, to: TurnPhase) -> Result<(), MatchError> {
        if !self.can_transition(to) {
            return Err(MatchError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TurnPhase::RollOrder => "roll order",
            TurnPhase::Movement => "movement",
            TurnPhase::PenaltySelection => "penalty selection",
            TurnPhase::PenaltyResolution => "penalty resolution",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
