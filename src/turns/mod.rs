//! Turn sequencing: phases, the movement queue, and penalty rounds.

pub mod penalty;
pub mod phase;
pub mod queue;

pub use penalty::{low_roll, roll_order, rps_losers, LowRollResult, RollOrder, Throw};
pub use phase::TurnPhase;
pub use queue::TurnQueue;
