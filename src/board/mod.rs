//! The playing surface.
//!
//! - [`grid`]: static geometry (cells, doors, safety zone, corners)
//! - [`layout`]: per-match water layout and the tiles currently showing
//! - [`tiles`]: round-end spawning and ageing of those tiles

pub mod grid;
pub mod layout;
pub mod tiles;

pub use grid::{Cell, Grid};
pub use layout::{BoardState, TileKind, TimedTile};
pub use tiles::{TileChange, TileSchedule};
