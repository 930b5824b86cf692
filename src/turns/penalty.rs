//! Penalty-round rules: who has to answer a question.
//!
//! Two-player matches play rock-paper-scissors. Three- and four-player
//! matches roll a die each; everyone on the lowest roll answers, and a
//! roll where everybody ties is thrown again. The opening roll that sets
//! the evader order lives here too since it is the same kind of contest.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{Dice, GameRng, PlayerId};

/// Re-roll rounds tried before the opening roll falls back to seat order.
const MAX_ORDER_REROLLS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    pub const ALL: [Throw; 3] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    /// Option index used by the penalty buttons.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Throw> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn beats(self, other: Throw) -> bool {
        matches!(
            (self, other),
            (Throw::Rock, Throw::Scissors) | (Throw::Paper, Throw::Rock) | (Throw::Scissors, Throw::Paper)
        )
    }

    /// Computer throw.
    pub fn random(rng: &mut GameRng) -> Throw {
        Self::ALL[rng.gen_range_usize(0..Self::ALL.len())]
    }
}

/// Players whose throw lost.
///
/// Empty when everyone threw the same, or when all three throws appear
/// and nobody comes out on top; both count as a tie.
#[must_use]
pub fn rps_losers(throws: &[(PlayerId, Throw)]) -> SmallVec<[PlayerId; 4]> {
    let beaten = |t: Throw| throws.iter().any(|&(_, other)| other.beats(t));
    let unbeaten = throws.iter().any(|&(_, t)| !beaten(t));
    if !unbeaten {
        return SmallVec::new();
    }
    throws
        .iter()
        .filter(|&&(_, t)| beaten(t))
        .map(|&(id, _)| id)
        .collect()
}

/// Result of a low-roll penalty round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LowRollResult {
    /// Everyone on the minimum roll, in the order they rolled.
    Losers(SmallVec<[PlayerId; 4]>),
    /// Everybody rolled the same.
    Reroll,
}

/// Decide a low-roll round. Every roller, chaser included, is eligible.
///
/// ```
/// use run_run_rabbit::core::PlayerId;
/// use run_run_rabbit::turns::penalty::{low_roll, LowRollResult};
///
/// let rolls = [(PlayerId::new(0), 4), (PlayerId::new(1), 2), (PlayerId::new(2), 2)];
/// assert_eq!(
///     low_roll(&rolls),
///     LowRollResult::Losers([PlayerId::new(1), PlayerId::new(2)].into_iter().collect())
/// );
/// assert_eq!(low_roll(&[(PlayerId::new(0), 3), (PlayerId::new(1), 3)]), LowRollResult::Reroll);
/// ```
#[must_use]
pub fn low_roll(rolls: &[(PlayerId, u8)]) -> LowRollResult {
    let Some(min) = rolls.iter().map(|&(_, r)| r).min() else {
        return LowRollResult::Reroll;
    };
    let losers: SmallVec<[PlayerId; 4]> = rolls
        .iter()
        .filter(|&&(_, r)| r == min)
        .map(|&(id, _)| id)
        .collect();
    if losers.len() == rolls.len() {
        LowRollResult::Reroll
    } else {
        LowRollResult::Losers(losers)
    }
}

/// Outcome of the opening roll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOrder {
    /// Final distinct roll per player.
    pub rolls: Vec<(PlayerId, u8)>,
    /// Highest roll first.
    pub order: Vec<PlayerId>,
    /// How many re-roll rounds ties needed.
    pub rerolls: u32,
}

/// Everyone rolls; tied players roll again until all rolls differ.
pub fn roll_order(dice: &mut dyn Dice, players: &[PlayerId]) -> RollOrder {
    let mut rolls: Vec<(PlayerId, u8)> = players.iter().map(|&id| (id, dice.roll())).collect();
    let mut rerolls = 0;

    loop {
        let tied: SmallVec<[usize; 4]> = (0..rolls.len())
            .filter(|&i| rolls.iter().enumerate().any(|(j, r)| j != i && r.1 == rolls[i].1))
            .collect();
        if tied.is_empty() {
            break;
        }
        if rerolls >= MAX_ORDER_REROLLS {
            warn!(rerolls, "opening roll keeps tying, using seat order for ties");
            break;
        }
        rerolls += 1;
        for i in tied {
            rolls[i].1 = dice.roll();
        }
    }

    let mut ranked: Vec<(usize, PlayerId, u8)> = rolls.iter().enumerate().map(|(i, &(id, r))| (i, id, r)).collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    let order = ranked.into_iter().map(|(_, id, _)| id).collect();

    debug!(?rolls, rerolls, "opening roll decided");
    RollOrder { rolls, order, rerolls }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoadedDice;

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    #[test]
    fn test_throw_beats() {
        assert!(Throw::Rock.beats(Throw::Scissors));
        assert!(Throw::Paper.beats(Throw::Rock));
        assert!(Throw::Scissors.beats(Throw::Paper));
        assert!(!Throw::Rock.beats(Throw::Rock));
        assert!(!Throw::Scissors.beats(Throw::Rock));
        assert_eq!(Throw::from_index(1), Some(Throw::Paper));
        assert_eq!(Throw::from_index(3), None);
    }

    #[test]
    fn test_rps_two_players() {
        let losers = rps_losers(&[(p(0), Throw::Rock), (p(1), Throw::Paper)]);
        assert_eq!(losers.as_slice(), &[p(0)]);

        let losers = rps_losers(&[(p(0), Throw::Scissors), (p(1), Throw::Paper)]);
        assert_eq!(losers.as_slice(), &[p(1)]);

        assert!(rps_losers(&[(p(0), Throw::Rock), (p(1), Throw::Rock)]).is_empty());
    }

    #[test]
    fn test_rps_three_way_is_tie() {
        let throws = [(p(0), Throw::Rock), (p(1), Throw::Paper), (p(2), Throw::Scissors)];
        assert!(rps_losers(&throws).is_empty());
    }

    #[test]
    fn test_low_roll_scenario_c() {
        // Chaser, evader A, evader B, evader C.
        let rolls = [(p(3), 2), (p(0), 5), (p(1), 5), (p(2), 3)];
        assert_eq!(low_roll(&rolls), LowRollResult::Losers([p(3)].into_iter().collect()));

        let all_equal = [(p(3), 4), (p(0), 4), (p(1), 4), (p(2), 4)];
        assert_eq!(low_roll(&all_equal), LowRollResult::Reroll);
    }

    #[test]
    fn test_roll_order_rerolls_ties() {
        // 4,4,2 then the two tied players roll 1 and 6.
        let mut dice = LoadedDice::new([4, 4, 2, 1, 6], 0);
        let result = roll_order(&mut dice, &[p(0), p(1), p(2)]);
        assert_eq!(result.rerolls, 1);
        assert_eq!(result.rolls, vec![(p(0), 1), (p(1), 6), (p(2), 2)]);
        assert_eq!(result.order, vec![p(1), p(2), p(0)]);
    }

    #[test]
    fn test_roll_order_gives_up_on_constant_dice() {
        struct Stuck;
        impl Dice for Stuck {
            fn roll(&mut self) -> u8 {
                3
            }
        }
        let result = roll_order(&mut Stuck, &[p(0), p(1)]);
        assert_eq!(result.rerolls, MAX_ORDER_REROLLS);
        assert_eq!(result.order, vec![p(0), p(1)]);
    }
}
