//! Match configuration.
//!
//! Hosts build a `MatchConfig` with the `with_*` methods or load one from
//! JSON. Missing JSON fields fall back to the classroom defaults: two
//! players, first to 5 points, an 8x8 grid with 8 water tiles.
//!
//! ```
//! use run_run_rabbit::core::{MatchConfig, Role};
//!
//! let config = MatchConfig::new(3)
//!     .with_victory_points(10)
//!     .with_human(Role::Chaser)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//!
//! let loaded = MatchConfig::from_json(r#"{"player_count": 4, "victory_points": 15}"#).unwrap();
//! assert_eq!(loaded.player_count, 4);
//! assert_eq!(loaded.grid_size, 8);
//! ```

use serde::{Deserialize, Serialize};

use super::error::MatchError;
use super::player::Role;

/// Inclusive range of rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRange {
    pub min: u32,
    pub max: u32,
}

impl RoundRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Ephemeral tile tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Rounds between bonus spawns, indexed by evader count - 1.
    pub bonus_interval: [RoundRange; 3],
    /// How many rounds a bonus tile stays.
    pub bonus_lifespan: RoundRange,
    /// Rounds between move-again spawns.
    pub move_again_interval: RoundRange,
    /// Tiles placed per move-again spawn.
    pub move_again_batch: RoundRange,
    /// Concurrent move-again tiles allowed.
    pub move_again_max: usize,
    /// Rounds a move-again tile stays.
    pub move_again_lifespan: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            bonus_interval: [RoundRange::new(3, 6), RoundRange::new(2, 4), RoundRange::new(1, 3)],
            bonus_lifespan: RoundRange::new(1, 3),
            move_again_interval: RoundRange::new(1, 3),
            move_again_batch: RoundRange::new(1, 2),
            move_again_max: 2,
            move_again_lifespan: 1,
        }
    }
}

impl TileConfig {
    /// Bonus spawn interval for a number of evaders (clamped to 1..=3).
    #[must_use]
    pub fn bonus_interval_for(&self, evaders: usize) -> RoundRange {
        self.bonus_interval[evaders.clamp(1, 3) - 1]
    }
}

/// Cosmetic delays for computer-controlled players.
///
/// Each delay is `max(floor_ms, base / speed)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiPacing {
    /// Higher is faster.
    pub speed: f64,
    pub floor_ms: u64,
    pub roll_ms: u64,
    pub move_ms: u64,
    pub throw_ms: u64,
    pub reveal_ms: u64,
    pub dismiss_ms: u64,
}

impl Default for AiPacing {
    fn default() -> Self {
        Self {
            speed: 1.0,
            floor_ms: 100,
            roll_ms: 600,
            move_ms: 650,
            throw_ms: 600,
            reveal_ms: 900,
            dismiss_ms: 900,
        }
    }
}

impl AiPacing {
    /// Scale a base delay by the speed multiplier.
    #[must_use]
    pub fn scaled(&self, base_ms: u64) -> u64 {
        let speed = if self.speed > 0.0 { self.speed } else { 1.0 };
        ((base_ms as f64 / speed).round() as u64).max(self.floor_ms)
    }
}

/// Backoff for AI actions blocked by a modal transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// After this many blocked attempts the action runs anyway.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 200,
            max_backoff_ms: 1600,
            max_retries: 8,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff_ms
            .saturating_mul(1 << shift)
            .min(self.max_backoff_ms)
    }
}

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// 2, 3 or 4.
    pub player_count: usize,
    /// Roles driven by a person; the rest are AI.
    pub humans: Vec<Role>,
    /// Score that ends the match.
    pub victory_points: u32,
    pub seed: u64,
    pub grid_size: i16,
    /// Water tiles placed per match.
    pub impassable_count: usize,
    /// Board layouts tried before giving up.
    pub max_generation_attempts: u32,
    /// Extra steps evaders add to every roll.
    pub evader_step_bonus: u8,
    pub tiles: TileConfig,
    pub ai: AiPacing,
    pub retry: RetryPolicy,
    /// How long a closed modal may wait for its selection callback.
    pub stall_grace_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            humans: Vec::new(),
            victory_points: 5,
            seed: 0,
            grid_size: 8,
            impassable_count: 8,
            max_generation_attempts: 1000,
            evader_step_bonus: 1,
            tiles: TileConfig::default(),
            ai: AiPacing::default(),
            retry: RetryPolicy::default(),
            stall_grace_ms: 200,
        }
    }
}

impl MatchConfig {
    /// Defaults for the given number of players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MatchError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_victory_points(mut self, points: u32) -> Self {
        self.victory_points = points;
        self
    }

    #[must_use]
    pub fn with_human(mut self, role: Role) -> Self {
        if !self.humans.contains(&role) {
            self.humans.push(role);
        }
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_impassable_count(mut self, count: usize) -> Self {
        self.impassable_count = count;
        self
    }

    #[must_use]
    pub fn with_ai_speed(mut self, speed: f64) -> Self {
        self.ai.speed = speed;
        self
    }

    #[must_use]
    pub fn with_max_generation_attempts(mut self, attempts: u32) -> Self {
        self.max_generation_attempts = attempts;
        self
    }

    /// Check every field against the rules of the game.
    pub fn validate(&self) -> Result<(), MatchError> {
        let lineup = Role::lineup(self.player_count).ok_or_else(|| {
            MatchError::InvalidConfig(format!("player count must be 2-4, got {}", self.player_count))
        })?;
        if let Some(role) = self.humans.iter().find(|r| !lineup.contains(r)) {
            return Err(MatchError::InvalidConfig(format!(
                "{role} does not play in a {}-player match",
                self.player_count
            )));
        }
        if self.victory_points == 0 {
            return Err(MatchError::InvalidConfig("victory points must be positive".into()));
        }
        if !(4..=26).contains(&self.grid_size) {
            return Err(MatchError::InvalidConfig(format!(
                "grid size must be 4-26, got {}",
                self.grid_size
            )));
        }
        // Corners and doors are never water.
        let free = (self.grid_size as usize).pow(2) - 6;
        if self.impassable_count >= free {
            return Err(MatchError::InvalidConfig(format!(
                "{} impassable tiles do not fit on a {size}x{size} grid",
                self.impassable_count,
                size = self.grid_size,
            )));
        }
        if self.max_generation_attempts == 0 {
            return Err(MatchError::InvalidConfig("generation attempts must be positive".into()));
        }
        if !(self.ai.speed > 0.0) {
            return Err(MatchError::InvalidConfig("AI speed must be positive".into()));
        }
        let t = &self.tiles;
        let ranges = t
            .bonus_interval
            .iter()
            .chain([&t.bonus_lifespan, &t.move_again_interval, &t.move_again_batch]);
        for range in ranges {
            if range.min == 0 || range.min > range.max {
                return Err(MatchError::InvalidConfig(format!(
                    "bad round range {}..={}",
                    range.min, range.max
                )));
            }
        }
        if t.move_again_lifespan == 0 {
            return Err(MatchError::InvalidConfig("move-again lifespan must be positive".into()));
        }
        Ok(())
    }
}
