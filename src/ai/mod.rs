//! Computer players: where to move, and when to act.

pub mod heuristics;
pub mod scheduler;

pub use heuristics::{choose_destination, DestinationPolicy, Greedy};
pub use scheduler::{ActionToken, AiIntent, AiScheduler, DueAction, ModalState};
