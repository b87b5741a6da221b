//! Control collaborators - adjust live tunables between turns
//!
//! The engine calls [`Controller::before_turn`] once per turn, after the
//! turn counter has advanced and before any agent acts. Everything a
//! controller changes lives in `state.config`, which the core re-reads on
//! every use.

use crate::core::types::Turn;
use crate::simulation::state::SimulationState;

/// Adjusts tunables ahead of each turn
pub trait Controller {
    fn before_turn(&mut self, state: &mut SimulationState);
}

/// Leaves every tunable as configured
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticControl;

impl Controller for StaticControl {
    fn before_turn(&mut self, _state: &mut SimulationState) {}
}

/// One-way escalation driven by population size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Founding,
    /// Food hump raised
    Dense,
    /// Kills allowed
    Hostile,
    /// Occupied cells no longer grow food
    Barren,
}

const DENSE_POPULATION: usize = 1000;
const HOSTILE_POPULATION: usize = 10_000;
const BARREN_POPULATION: usize = 15_000;
const DENSE_HUMP: f32 = 10.0;
const BARREN_WAIT: u32 = 250;

/// Division policy bytes applied on fixed turns
const POLICY_STEPS: [(Turn, u8); 7] = [
    (3000, 0x10),
    (4000, 0x30),
    (5000, 0x70),
    (6000, 0x71),
    (7000, 0x73),
    (8000, 0x77),
    (9000, 0x7F),
];

/// Mate cost escalation
const MATE_COST_STEPS: [(Turn, i64); 4] = [(10_000, 24), (11_000, 48), (12_000, 96), (13_000, 144)];

/// Turn after which the age floor and food supply start drifting
const REGULATION_START: Turn = 3000;
const ASEXUAL_POLICY: u8 = 0x70;
const SEXUAL_POLICY: u8 = 0x7F;
/// Target band for the age-of-division floor
const AGE_FLOOR_LOW: u64 = 30;
const AGE_FLOOR_HIGH: u64 = 300;
const HUMP_DRIFT: f32 = 1.001;

/// The dynamic challenge schedule of a long run
///
/// Population milestones raise the food hump, switch off the no-kill
/// safety and stop food growing under agents. Fixed turns escalate the
/// division policy and the cost of mating. Past the first season the food
/// hump drifts to keep the age-of-division floor inside `[30, 300]`, and
/// the mating requirement alternates season by season. The age floor
/// itself tracks population against the configured target and hard limit.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveSchedule {
    stage: Stage,
    wait: u32,
}

impl AdaptiveSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn escalate(&mut self, state: &mut SimulationState) {
        if self.wait > 0 {
            self.wait -= 1;
            return;
        }
        let population = state.population.len();
        if self.stage == Stage::Founding && population > DENSE_POPULATION {
            state.config.food.hump = DENSE_HUMP;
            self.stage = Stage::Dense;
            tracing::info!(turn = state.turn, population, "food hump raised");
        }
        if self.stage == Stage::Dense && population > HOSTILE_POPULATION {
            state.config.safety = false;
            self.stage = Stage::Hostile;
            tracing::info!(turn = state.turn, population, "safety off");
        }
        if self.stage == Stage::Hostile && population > BARREN_POPULATION {
            state.config.food.leak = 0;
            self.stage = Stage::Barren;
            self.wait = BARREN_WAIT;
            tracing::info!(turn = state.turn, population, "food leak closed");
        }
    }

    fn regulate_age_floor(state: &mut SimulationState) {
        let today = state.turn;
        let population = state.population.len();
        let oldest = state.first_agent_age();
        let target = state.config.population.target;
        let season = state.config.food.season_length.max(1);
        let config = &mut state.config;

        if today > REGULATION_START {
            if today > season {
                if today % 32 == 0 {
                    if config.division.age_floor < AGE_FLOOR_LOW {
                        config.food.hump *= HUMP_DRIFT;
                    }
                    if config.division.age_floor > AGE_FLOOR_HIGH {
                        config.food.hump /= HUMP_DRIFT;
                    }
                }
                if today % season == 0 {
                    let bits = if (today / season) % 2 == 0 { ASEXUAL_POLICY } else { SEXUAL_POLICY };
                    config.division.set_bits(bits);
                }
                if population < DENSE_POPULATION {
                    config.division.set_bits(ASEXUAL_POLICY);
                }
            }

            if population > target.saturating_mul(2) && config.division.age_floor < oldest {
                config.division.age_floor += 1;
            }
            if today % 8 == 0 {
                config.division.age_floor += 1;
            }
        }

        let floor = config.division.age_floor;
        if (population < target && floor > 0) || floor > oldest {
            config.division.age_floor = floor.saturating_sub(1);
        }
        if population > config.population.hard_limit {
            config.division.age_floor = oldest;
        }
    }
}

impl Controller for AdaptiveSchedule {
    fn before_turn(&mut self, state: &mut SimulationState) {
        self.escalate(state);

        let today = state.turn;
        if let Some(&(_, bits)) = POLICY_STEPS.iter().find(|(at, _)| *at == today) {
            state.config.division.set_bits(bits);
            tracing::debug!(turn = today, bits, "division policy");
        }
        if let Some(&(_, cost)) = MATE_COST_STEPS.iter().find(|(at, _)| *at == today) {
            state.config.costs.mate = cost;
            tracing::debug!(turn = today, cost, "mate cost");
        }

        Self::regulate_age_floor(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    fn state() -> SimulationState {
        let mut config = SimulationConfig::default();
        config.world.width = 16;
        config.world.height = 12;
        SimulationState::new(config).unwrap()
    }

    #[test]
    fn test_static_control_changes_nothing() {
        let mut s = state();
        s.turn = 10_000;
        let before = s.config.clone();
        StaticControl.before_turn(&mut s);
        assert_eq!(s.config, before);
    }

    #[test]
    fn test_policy_and_mate_cost_steps() {
        let mut s = state();
        s.seed_founder().unwrap();
        let mut control = AdaptiveSchedule::new();

        s.turn = 3000;
        control.before_turn(&mut s);
        assert_eq!(s.config.division.bits(), 0x10);

        s.turn = 6000;
        control.before_turn(&mut s);
        assert_eq!(s.config.division.bits(), 0x71);

        s.turn = 11_000;
        control.before_turn(&mut s);
        assert_eq!(s.config.costs.mate, 48);
    }

    #[test]
    fn test_age_floor_capped_by_oldest_agent() {
        let mut s = state();
        s.seed_founder().unwrap();
        s.turn = 10;
        s.config.division.age_floor = 50;
        AdaptiveSchedule::new().before_turn(&mut s);
        // Under target and older than the founder: one step down per turn
        assert_eq!(s.config.division.age_floor, 49);
    }

    #[test]
    fn test_hard_limit_pins_age_floor() {
        let mut s = state();
        s.seed_founder().unwrap();
        s.turn = 40;
        s.config.population.hard_limit = 0;
        s.config.population.target = 0;
        s.config.division.age_floor = 3;
        AdaptiveSchedule::new().before_turn(&mut s);
        assert_eq!(s.config.division.age_floor, 40);
    }

    #[test]
    fn test_escalation_stays_in_founding_stage_when_small() {
        let mut s = state();
        s.seed_founder().unwrap();
        let mut control = AdaptiveSchedule::new();
        control.before_turn(&mut s);
        assert_eq!(control.stage(), Stage::Founding);
        assert!(s.config.safety);
    }
}
