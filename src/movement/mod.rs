//! Legal destinations for a piece.
//!
//! The solver is a pure function of the board, piece positions, and the
//! step count; it never mutates anything. Callers snapshot positions into
//! an [`Occupancy`] once per turn.

pub mod reachability;

pub use reachability::{is_trapped, path_exists, reachable, Mover, Occupancy};
