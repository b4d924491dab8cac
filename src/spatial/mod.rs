//! Tile occupancy and dense per-tile storage

pub mod grid;
pub mod position_index;

pub use grid::TileGrid;
pub use position_index::{Occupant, PositionIndex};
