//! The world grid of food cells and occupant back-references
//!
//! A cell never owns its occupant. It stores the registry handle only, and
//! the population keeps cell and handle in step on every move and death.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::types::AgentId;
use crate::world::hex::{Facing, HexPos};

/// One hex cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldCell {
    pub food: Fixed,
    #[serde(skip)]
    pub occupant: Option<AgentId>,
}

impl WorldCell {
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Toroidal hex grid, stored row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGrid {
    width: usize,
    height: usize,
    cells: Vec<WorldCell>,
}

impl WorldGrid {
    /// Grid with every cell holding `initial_food`
    pub fn new(width: usize, height: usize, initial_food: Fixed) -> Self {
        Self {
            width,
            height,
            cells: vec![
                WorldCell {
                    food: initial_food,
                    occupant: None,
                };
                width * height
            ],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn center(&self) -> HexPos {
        HexPos::new(self.width / 2, self.height / 2)
    }

    fn index(&self, pos: HexPos) -> usize {
        debug_assert!(pos.x < self.width && pos.y < self.height, "cell {} off the grid", pos);
        pos.y * self.width + pos.x
    }

    /// Cell at `(x, y)`, or `None` off the grid
    pub fn get(&self, x: usize, y: usize) -> Option<&WorldCell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn cell(&self, pos: HexPos) -> &WorldCell {
        &self.cells[self.index(pos)]
    }

    pub fn cell_mut(&mut self, pos: HexPos) -> &mut WorldCell {
        let idx = self.index(pos);
        &mut self.cells[idx]
    }

    pub fn step(&self, pos: HexPos, facing: Facing) -> HexPos {
        pos.step(facing, self.width, self.height)
    }

    pub fn walk(&self, pos: HexPos, path: &[Facing]) -> HexPos {
        pos.walk(path, self.width, self.height)
    }

    pub fn neighbours(&self, pos: HexPos) -> [HexPos; 6] {
        pos.neighbours(self.width, self.height)
    }

    pub fn occupant(&self, pos: HexPos) -> Option<AgentId> {
        self.cell(pos).occupant
    }

    pub fn set_occupant(&mut self, pos: HexPos, id: Option<AgentId>) {
        self.cell_mut(pos).occupant = id;
    }

    pub fn food(&self, pos: HexPos) -> Fixed {
        self.cell(pos).food
    }

    pub fn add_food(&mut self, pos: HexPos, amount: Fixed) {
        self.cell_mut(pos).food += amount;
    }

    pub fn total_food(&self) -> Fixed {
        self.cells.iter().fold(Fixed::ZERO, |acc, c| acc + c.food)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = HexPos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| HexPos::new(x, y)))
    }
}
