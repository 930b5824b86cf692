//! Deterministic randomness and dice.
//!
//! Every random decision in a match (board layout, tile spawns, AI jitter,
//! computer throws) draws from a `GameRng` seeded by the match config, so a
//! seed replays the same match. Independent concerns use separate context
//! streams so that, say, an extra AI jitter draw does not shift the board.
//!
//! Dice go through the [`Dice`] trait. `GameRng` is the normal source;
//! [`LoadedDice`] plays back a script first, which is how scenario tests
//! pin down a particular round.
//!
//! ```
//! use run_run_rabbit::core::{Dice, GameRng, LoadedDice};
//!
//! let mut dice = LoadedDice::new([6, 1], 7);
//! assert_eq!(dice.roll(), 6);
//! assert_eq!(dice.roll(), 1);
//! assert!((1..=6).contains(&dice.roll()));
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll(), b.roll());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

/// Faces on the die.
pub const DIE_FACES: u8 = 6;

/// Seeded RNG used for every random decision in a match.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Independent stream for a named purpose.
    ///
    /// The same context always yields the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `low..=high`.
    pub fn between(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Small tie-breaking noise in `[0, scale)`.
    pub fn jitter(&mut self, scale: f64) -> f64 {
        self.inner.gen::<f64>() * scale
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

/// Source of six-sided die rolls.
pub trait Dice {
    /// Roll one die, `1..=6`.
    fn roll(&mut self) -> u8;
}

impl Dice for GameRng {
    fn roll(&mut self) -> u8 {
        self.inner.gen_range(1..=DIE_FACES)
    }
}

/// Scripted rolls, then seeded fallback.
#[derive(Clone, Debug)]
pub struct LoadedDice {
    script: VecDeque<u8>,
    fallback: GameRng,
}

impl LoadedDice {
    /// Rolls outside `1..=6` are clamped into range.
    pub fn new(script: impl IntoIterator<Item = u8>, fallback_seed: u64) -> Self {
        Self {
            script: script.into_iter().map(|r| r.clamp(1, DIE_FACES)).collect(),
            fallback: GameRng::new(fallback_seed),
        }
    }

    /// Append more scripted rolls.
    pub fn push(&mut self, rolls: impl IntoIterator<Item = u8>) {
        self.script
            .extend(rolls.into_iter().map(|r| r.clamp(1, DIE_FACES)));
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self) -> u8 {
        match self.script.pop_front() {
            Some(r) => r,
            None => self.fallback.roll(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.roll(), rng2.roll());
        }
    }

    #[test]
    fn test_rolls_in_range() {
        let mut rng = GameRng::new(7);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let r = rng.roll();
            assert!((1..=6).contains(&r));
            seen[(r - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_context_streams_differ() {
        let rng = GameRng::new(42);
        let mut board = rng.for_context("board");
        let mut tiles = rng.for_context("tiles");

        let a: Vec<_> = (0..10).map(|_| board.between(0, 1000)).collect();
        let b: Vec<_> = (0..10).map(|_| tiles.between(0, 1000)).collect();
        assert_ne!(a, b);

        let mut board_again = GameRng::new(42).for_context("board");
        let c: Vec<_> = (0..10).map(|_| board_again.between(0, 1000)).collect();
        assert_eq!(a, c);
    }

    #[test]
    fn test_between_degenerate() {
        let mut rng = GameRng::new(1);
        assert_eq!(rng.between(3, 3), 3);
        assert_eq!(rng.between(5, 2), 5);
        for _ in 0..50 {
            assert!((1..=3).contains(&rng.between(1, 3)));
        }
    }

    #[test]
    fn test_loaded_dice_script_then_fallback() {
        let mut dice = LoadedDice::new([3, 9, 0], 1);
        assert_eq!(dice.remaining(), 3);
        assert_eq!(dice.roll(), 3);
        assert_eq!(dice.roll(), 6);
        assert_eq!(dice.roll(), 1);
        assert_eq!(dice.remaining(), 0);

        dice.push([4]);
        assert_eq!(dice.roll(), 4);
        assert!((1..=6).contains(&dice.roll()));
    }
}
