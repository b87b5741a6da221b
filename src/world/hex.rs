//! Hex coordinates on an offset-row toroidal grid
//!
//! Rows are staggered: a diagonal step moves one row and shifts the column
//! only on even rows going east or odd rows going west. Both axes wrap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexPos {
    pub x: usize,
    pub y: usize,
}

impl HexPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in direction `facing`
    pub fn step(self, facing: Facing, width: usize, height: usize) -> HexPos {
        let east = |x: usize| if x + 1 < width { x + 1 } else { 0 };
        let west = |x: usize| if x > 0 { x - 1 } else { width - 1 };
        let south = |y: usize| if y + 1 < height { y + 1 } else { 0 };
        let north = |y: usize| if y > 0 { y - 1 } else { height - 1 };
        let even = self.y % 2 == 0;

        match facing {
            Facing::E => HexPos::new(east(self.x), self.y),
            Facing::W => HexPos::new(west(self.x), self.y),
            Facing::SE => HexPos::new(if even { east(self.x) } else { self.x }, south(self.y)),
            Facing::NE => HexPos::new(if even { east(self.x) } else { self.x }, north(self.y)),
            Facing::SW => HexPos::new(if even { self.x } else { west(self.x) }, south(self.y)),
            Facing::NW => HexPos::new(if even { self.x } else { west(self.x) }, north(self.y)),
        }
    }

    /// Follow a path of facings from here
    pub fn walk(self, path: &[Facing], width: usize, height: usize) -> HexPos {
        path.iter().fold(self, |pos, &f| pos.step(f, width, height))
    }

    /// The six surrounding cells, in facing order NW, NE, E, SE, SW, W
    pub fn neighbours(self, width: usize, height: usize) -> [HexPos; 6] {
        Facing::ALL.map(|f| self.step(f, width, height))
    }
}

impl fmt::Display for HexPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of six hex directions, numbered -2..=3 clockwise from north-west
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum Facing {
    NW = -2,
    NE = -1,
    #[default]
    E = 0,
    SE = 1,
    SW = 2,
    W = 3,
}

impl Facing {
    pub const ALL: [Facing; 6] = [Facing::NW, Facing::NE, Facing::E, Facing::SE, Facing::SW, Facing::W];

    /// Normalise any integer direction into `-2..=3`
    pub fn from_value(value: i64) -> Facing {
        match (value + 2).rem_euclid(6) - 2 {
            -2 => Facing::NW,
            -1 => Facing::NE,
            0 => Facing::E,
            1 => Facing::SE,
            2 => Facing::SW,
            _ => Facing::W,
        }
    }

    pub fn value(self) -> i64 {
        self as i8 as i64
    }

    /// Rotate by `steps` sixths of a turn, clockwise positive
    pub fn rotated(self, steps: i64) -> Facing {
        Facing::from_value(self.value() + steps)
    }

    pub fn cw(self) -> Facing {
        self.rotated(1)
    }

    pub fn ccw(self) -> Facing {
        self.rotated(-1)
    }

    /// This facing as seen from `reference`, in `-2..=3` (0 = same way, 3 = opposite)
    pub fn relative_to(self, reference: Facing) -> i64 {
        Facing::from_value(self.value() - reference.value()).value()
    }
}
