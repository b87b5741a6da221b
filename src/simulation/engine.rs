//! Simulation engine - drives whole turns
//!
//! A turn advances the counter, lets the controller adjust tunables, runs
//! every agent once in registry order, grows food, and records statistics.

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Turn;
use crate::simulation::control::{AdaptiveSchedule, Controller, StaticControl};
use crate::simulation::state::SimulationState;
use crate::simulation::stats::TurnStats;
use crate::simulation::turn::take_turn;
use crate::world::food::{FoodGrowth, SeasonalGrowth};

/// A running simulation with its food and control collaborators
pub struct Simulation<G: FoodGrowth = SeasonalGrowth, C: Controller = AdaptiveSchedule> {
    pub state: SimulationState,
    growth: G,
    control: C,
}

impl Simulation {
    /// Standard run: seasonal food, adaptive schedule, one founder at the centre
    pub fn with_founder(config: SimulationConfig) -> Result<Self> {
        let mut state = SimulationState::new(config)?;
        state.seed_founder()?;
        Ok(Self::new(state, SeasonalGrowth, AdaptiveSchedule::new()))
    }
}

impl Simulation<SeasonalGrowth, StaticControl> {
    /// Founder run with tunables left as configured
    pub fn fixed_schedule(config: SimulationConfig) -> Result<Self> {
        let mut state = SimulationState::new(config)?;
        state.seed_founder()?;
        Ok(Self::new(state, SeasonalGrowth, StaticControl))
    }
}

impl<G: FoodGrowth, C: Controller> Simulation<G, C> {
    pub fn new(state: SimulationState, growth: G, control: C) -> Self {
        Self { state, growth, control }
    }

    pub fn turn(&self) -> Turn {
        self.state.turn
    }

    pub fn population(&self) -> usize {
        self.state.population.len()
    }

    pub fn is_extinct(&self) -> bool {
        self.state.population.is_empty()
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Run one full turn and return its statistics
    pub fn step(&mut self) -> Result<TurnStats> {
        let state = &mut self.state;
        state.turn += 1;
        self.control.before_turn(state);
        state.current = TurnStats::new(state.turn);

        state.population.begin_pass();
        while let Some(id) = state.population.advance() {
            take_turn(state, id)?;
        }

        self.growth.grow(&mut state.world, state.turn, &state.config.food);

        state.tally();
        debug_assert!(state.is_consistent(), "world and registry disagree after turn {}", state.turn);
        let stats = state.current.clone();
        state.history.push(stats.clone());

        tracing::debug!(
            turn = stats.turn,
            population = stats.population,
            births = stats.births,
            deaths = stats.deaths(),
            collisions = stats.collisions,
            "turn complete"
        );
        Ok(stats)
    }

    /// Run up to `turns` turns, stopping early on extinction
    ///
    /// Returns the number of turns actually run.
    pub fn run(&mut self, turns: u64) -> Result<u64> {
        for done in 0..turns {
            if self.is_extinct() {
                tracing::info!(turn = self.state.turn, "population extinct");
                return Ok(done);
            }
            self.step()?;
        }
        Ok(turns)
    }
}
