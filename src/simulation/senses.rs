//! Sense gathering - the per-turn snapshot a brain decides against
//!
//! Twelve probe cells around the agent each report food, occupant mass,
//! occupant facing and kinship. Nine recency senses, two mass ratios and
//! the agent's age follow.

use crate::core::config::SimulationConfig;
use crate::core::constants::{
    N_ACTIONS, N_SENSE_CELLS, POS_HISTORY, SENSE_FACING, SENSE_FOOD, SENSE_KINSHIP, SENSE_MASS,
    SENSE_SELF, SENSE_SELF_AGE, SENSE_SPAWN_NORM, SENSE_STARVE_NORM,
};
use crate::core::fixed::{Fixed, SCALE};
use crate::core::types::{Action, SenseVector, Turn};
use crate::simulation::agent::Agent;
use crate::simulation::population::Population;
use crate::world::grid::WorldGrid;
use crate::world::hex::{Facing, HexPos};

/// Where a probe looks, as turns relative to the agent's facing
#[derive(Debug, Clone, Copy)]
enum Leg {
    Ahead,
    Ccw,
    Cw,
    Ccw2,
    Cw2,
}

/// Probe paths and the kinship detail each one resolves
const PROBES: [(&[Leg], u8); N_SENSE_CELLS] = [
    (&[], 0),
    (&[Leg::Ahead], 1),
    (&[Leg::Ahead, Leg::Ahead], 2),
    (&[Leg::Ccw], 2),
    (&[Leg::Cw], 2),
    (&[Leg::Ahead, Leg::Ahead, Leg::Ahead], 3),
    (&[Leg::Ccw, Leg::Ccw], 3),
    (&[Leg::Ccw, Leg::Ahead], 3),
    (&[Leg::Cw, Leg::Ahead], 3),
    (&[Leg::Cw, Leg::Cw], 3),
    (&[Leg::Ccw2], 3),
    (&[Leg::Cw2], 3),
];

impl Leg {
    fn facing(self, base: Facing) -> Facing {
        match self {
            Leg::Ahead => base,
            Leg::Ccw => base.ccw(),
            Leg::Cw => base.cw(),
            Leg::Ccw2 => base.rotated(-2),
            Leg::Cw2 => base.rotated(2),
        }
    }
}

/// Cell seen by probe `index` of an agent at `pos` facing `facing`
pub fn probe_cell(world: &WorldGrid, pos: HexPos, facing: Facing, index: usize) -> HexPos {
    let legs = PROBES[index].0;
    let mut path = [facing; 3];
    for (step, leg) in path.iter_mut().zip(legs) {
        *step = leg.facing(facing);
    }
    world.walk(pos, &path[..legs.len()])
}

/// Build the sense vector for one agent
pub fn gather_senses(
    agent: &Agent,
    world: &WorldGrid,
    population: &Population,
    config: &SimulationConfig,
    now: Turn,
) -> SenseVector {
    let mut senses = SenseVector::zeroed();
    // Used only as a divisor; the agent itself is not touched
    let mass = agent.mass().raw().max(1);
    let ratio = |value: Fixed| Fixed::from_raw(value.raw().saturating_mul(SCALE) / mass);

    for (i, &(_, detail)) in PROBES.iter().enumerate() {
        let cell_pos = probe_cell(world, agent.pos(), agent.facing(), i);
        let cell = world.cell(cell_pos);
        senses.set(SENSE_FOOD + i, ratio(cell.food));

        if let Some(other) = cell.occupant.and_then(|id| population.get(id)) {
            senses.set(SENSE_MASS + i, ratio(other.mass()));
            let facing = other.facing().relative_to(agent.facing());
            senses.set(SENSE_FACING + i, Fixed::from_int(facing));
            senses.set(SENSE_KINSHIP + i, other.brain.kinship(&agent.brain, detail));
        }
    }

    for action in Action::ALL.iter().take(N_ACTIONS) {
        let recency = match agent.turns_since(*action) {
            Some(j) => Fixed::from_raw(j as i64 * SCALE / POS_HISTORY as i64),
            None => Fixed::ONE,
        };
        senses.set(SENSE_SELF + action.code(), recency);
    }

    let floor = config.metabolism.starvation_floor.raw().max(1);
    let divide = agent.brain.divide_count.max(1) as i64;
    let child = mass / divide - config.costs.divide_overhead.raw();
    senses.set(SENSE_SPAWN_NORM, Fixed::from_raw(child.saturating_mul(SCALE) / floor));
    senses.set(SENSE_STARVE_NORM, Fixed::from_raw(mass.saturating_mul(SCALE) / floor));
    senses.set(SENSE_SELF_AGE, Fixed::from_raw(agent.age(now) as i64));

    senses
}
