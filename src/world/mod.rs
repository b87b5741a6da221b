//! The hex world: coordinates, cells and the food field

pub mod food;
pub mod grid;
pub mod hex;

pub use food::{FoodGrowth, NoGrowth, SeasonalGrowth};
pub use grid::{WorldCell, WorldGrid};
pub use hex::{Facing, HexPos};
