//! Food growth - the field update that runs once after every turn
//!
//! The engine only needs something that implements [`FoodGrowth`]. The
//! seasonal model below is the standard one; tests usually swap in
//! [`NoGrowth`] so food only changes through agent actions.

use std::f32::consts::PI;

use crate::core::config::FoodConfig;
use crate::core::fixed::{Fixed, SCALE};
use crate::core::types::Turn;
use crate::world::grid::WorldGrid;
use crate::world::hex::HexPos;

/// Updates every cell's food once per turn
pub trait FoodGrowth {
    fn grow(&mut self, world: &mut WorldGrid, turn: Turn, config: &FoodConfig);
}

/// Leaves the field untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGrowth;

impl FoodGrowth for NoGrowth {
    fn grow(&mut self, _world: &mut WorldGrid, _turn: Turn, _config: &FoodConfig) {}
}

/// Seasonal growth with decay above the cap and diffusion into poor neighbours
///
/// Growth peaks along a band that drifts east over a season and is shaped
/// into three latitude stripes. Occupied cells rot instead of growing once
/// the leak setting reaches zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalGrowth;

impl SeasonalGrowth {
    /// Per-1024 growth multiplier for a cell on a given turn
    pub fn growth_rate(pos: HexPos, width: usize, height: usize, turn: Turn, config: &FoodConfig) -> i64 {
        let season = config.season_length.max(1);
        let drift = (turn.saturating_mul(width as u64) / season) as usize;
        let sax = (pos.x + drift) % width.max(1);

        let along = (PI * sax as f32 / width as f32).sin();
        let across = 0.51 - (PI * 6.0 * pos.y as f32 / height as f32).cos() * 0.5;
        let factor = 0.1 + config.hump * along * across;
        ((config.grow - SCALE) as f32 * factor) as i64 + SCALE
    }

    /// Growth or rot for one cell, then decay of anything above the cap
    fn settle(food: Fixed, rate: i64, config: &FoodConfig) -> Fixed {
        let mut food = food.mul_int(rate).div_int(SCALE);
        if food > config.cap {
            food -= (food - config.cap).mul_int(config.decay).div_int(SCALE);
        }
        food.min(config.cap.mul_int(10))
    }

    /// Rot index for a cell, or `None` if it grows normally
    fn rot_level(world: &WorldGrid, pos: HexPos, leak: i64) -> Option<usize> {
        // Distance to the nearest agent: 0 on an occupied cell, unknown elsewhere
        let nearest = if world.cell(pos).is_empty() { -1 } else { 0 };
        if nearest == -1 || leak < nearest {
            None
        } else {
            Some(nearest as usize)
        }
    }
}

impl FoodGrowth for SeasonalGrowth {
    fn grow(&mut self, world: &mut WorldGrid, turn: Turn, config: &FoodConfig) {
        let (width, height) = (world.width(), world.height());

        for y in 0..height {
            for x in 0..width {
                let pos = HexPos::new(x, y);
                let rate = match Self::rot_level(world, pos, config.leak) {
                    Some(level) => config.rot.get(level).copied().unwrap_or(SCALE),
                    None => Self::growth_rate(pos, width, height, turn, config),
                };
                let food = Self::settle(world.food(pos), rate, config);
                world.cell_mut(pos).food = food;

                // Spread a little into neighbours holding under a sixteenth of this cell
                for next in world.neighbours(pos) {
                    let here = world.food(pos);
                    if world.food(next) < here.div_int(16) && Self::rot_level(world, next, config.leak).is_none() {
                        let share = here.mul_int(config.spread).div_int(SCALE);
                        world.cell_mut(pos).food -= share;
                        world.cell_mut(next).food += share;
                    }
                }
            }
        }
    }
}
