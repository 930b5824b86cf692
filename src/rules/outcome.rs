//! Score tracks and the terminal lock.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::info;

use crate::core::{MatchError, PlayerId, PlayerMap};

/// Why a point was awarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    /// Chaser landed on an evader.
    Capture,
    /// Evader reached the safety zone.
    Goal,
    /// Evader picked up the bonus tile.
    Bonus,
}

/// Result of a finished match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner { player: PlayerId, points: u32 },
    /// Several tracks at or above the threshold at once.
    Tie { players: SmallVec<[PlayerId; 4]>, points: u32 },
}

impl MatchOutcome {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            MatchOutcome::Winner { player: p, .. } => *p == player,
            MatchOutcome::Tie { players, .. } => players.contains(&player),
        }
    }

    #[must_use]
    pub fn winners(&self) -> SmallVec<[PlayerId; 4]> {
        match self {
            MatchOutcome::Winner { player, .. } => SmallVec::from_slice(&[*player]),
            MatchOutcome::Tie { players, .. } => players.clone(),
        }
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        match self {
            MatchOutcome::Winner { points, .. } | MatchOutcome::Tie { points, .. } => *points,
        }
    }
}

/// One score counter per player plus the victory lock.
///
/// ```
/// use run_run_rabbit::core::{MatchError, PlayerId};
/// use run_run_rabbit::rules::{ScoreReason, Scoreboard};
///
/// let mut board = Scoreboard::new(2, 1);
/// let outcome = board.award(PlayerId::new(0), ScoreReason::Goal).unwrap();
/// assert!(outcome.is_some());
/// assert_eq!(board.award(PlayerId::new(1), ScoreReason::Capture), Err(MatchError::MatchOver));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    scores: PlayerMap<u32>,
    threshold: u32,
    outcome: Option<MatchOutcome>,
}

impl Scoreboard {
    #[must_use]
    pub fn new(player_count: usize, threshold: u32) -> Self {
        Self {
            scores: PlayerMap::with_value(player_count, 0),
            threshold,
            outcome: None,
        }
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn scores(&self) -> &PlayerMap<u32> {
        &self.scores
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Add one point.
    ///
    /// Returns the outcome if this point ends the match. Fails with
    /// `MatchOver` once locked and with `UnknownPlayer` for a bad id.
    pub fn award(&mut self, player: PlayerId, reason: ScoreReason) -> Result<Option<MatchOutcome>, MatchError> {
        if self.is_locked() {
            return Err(MatchError::MatchOver);
        }
        let slot = self.scores.get_mut(player).ok_or(MatchError::UnknownPlayer(player))?;
        *slot += 1;
        info!(%player, ?reason, score = *slot, "point awarded");
        Ok(self.check_victory())
    }

    fn check_victory(&mut self) -> Option<MatchOutcome> {
        let leaders: SmallVec<[PlayerId; 4]> = self
            .scores
            .iter()
            .filter(|(_, s)| **s >= self.threshold)
            .map(|(id, _)| id)
            .collect();
        let points = leaders.iter().map(|&id| self.scores[id]).max()?;

        let outcome = if leaders.len() == 1 {
            MatchOutcome::Winner { player: leaders[0], points }
        } else {
            MatchOutcome::Tie { players: leaders, points }
        };
        info!(?outcome, "match over");
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Zero every track and lift the lock.
    pub fn reset(&mut self) {
        self.scores.fill(0);
        self.outcome = None;
    }
}
