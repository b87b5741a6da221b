//! Simulation state - everything one run mutates, in one place
//!
//! Every core operation takes this struct explicitly. Cell back-references
//! and registry membership only change through [`SimulationState::place_agent`],
//! [`SimulationState::relocate`] and [`SimulationState::kill`], which keep the
//! two in step.

use crate::core::config::SimulationConfig;
use crate::core::error::{BugsError, Result};
use crate::core::fixed::Fixed;
use crate::core::rng::SimRng;
use crate::core::types::{AgentId, LineageId, Turn};
use crate::genetics::mutation::mutate_brain;
use crate::genetics::starter::founder_brain;
use crate::simulation::agent::Agent;
use crate::simulation::population::Population;
use crate::simulation::stats::{StatsHistory, TurnStats};
use crate::world::grid::{WorldCell, WorldGrid};
use crate::world::hex::{Facing, HexPos};

/// Founders start this many times the starvation floor
pub const FOUNDER_MASS_FACTOR: i64 = 256;

#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Live tunables, re-read every turn
    pub config: SimulationConfig,
    pub world: WorldGrid,
    pub population: Population,
    pub rng: SimRng,
    pub turn: Turn,
    /// Counters for the turn in progress
    pub current: TurnStats,
    pub history: StatsHistory,
    next_uid: u64,
}

impl SimulationState {
    /// Empty world with the configured dimensions and starting food
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(BugsError::InvalidConfig)?;
        let world = WorldGrid::new(config.world.width, config.world.height, config.world.initial_food);
        let rng = SimRng::new(config.seed);
        Ok(Self {
            config,
            world,
            population: Population::new(),
            rng,
            turn: 0,
            current: TurnStats::new(0),
            history: StatsHistory::default(),
            next_uid: 0,
        })
    }

    /// Hand out the next lineage id
    pub fn allocate_uid(&mut self) -> LineageId {
        let uid = LineageId(self.next_uid);
        self.next_uid += 1;
        uid
    }

    /// The id the next newborn will receive
    pub fn next_uid(&self) -> u64 {
        self.next_uid
    }

    /// Place the canonical founder at the world's centre
    pub fn seed_founder(&mut self) -> Result<AgentId> {
        let pos = self.world.center();
        if !self.world.cell(pos).is_empty() {
            return Err(BugsError::CellOccupied { x: pos.x, y: pos.y });
        }

        let uid = self.allocate_uid();
        let brain = founder_brain(uid, &mut self.rng);
        let mut mate_brain = brain.duplicate();
        mutate_brain(&mut mate_brain, &mut self.rng)?;

        let mass = self.config.metabolism.starvation_floor.mul_int(FOUNDER_MASS_FACTOR);
        let agent = Agent::new(self.turn, pos, Facing::E, mass, brain, mate_brain);
        let id = self.place_agent(agent)?;
        tracing::debug!(uid = %uid, pos = %pos, "founder placed");
        Ok(id)
    }

    /// Register an agent and claim its cell
    pub fn place_agent(&mut self, agent: Agent) -> Result<AgentId> {
        let pos = agent.pos();
        if self.world.get(pos.x, pos.y).is_none() {
            return Err(BugsError::InvalidConfig(format!("position {} is off the grid", pos)));
        }
        if !self.world.cell(pos).is_empty() {
            return Err(BugsError::CellOccupied { x: pos.x, y: pos.y });
        }
        let id = self.population.push_back(agent);
        self.world.set_occupant(pos, Some(id));
        Ok(id)
    }

    /// Move an agent to an empty cell, updating both back-references
    pub fn relocate(&mut self, id: AgentId, to: HexPos) -> Result<()> {
        if !self.world.cell(to).is_empty() {
            return Err(BugsError::CellOccupied { x: to.x, y: to.y });
        }
        let agent = self.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
        let from = agent.pos();
        agent.current_mut().pos = to;
        if self.world.occupant(from) == Some(id) {
            self.world.set_occupant(from, None);
        }
        self.world.set_occupant(to, Some(id));
        Ok(())
    }

    /// Destroy an agent: its mass feeds its cell, and it leaves the cell and
    /// the registry together
    pub fn kill(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.population.remove(id)?;
        let pos = agent.pos();
        self.world.add_food(pos, agent.mass());
        if self.world.occupant(pos) == Some(id) {
            self.world.set_occupant(pos, None);
        }
        Some(agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.population.get(id)
    }

    /// Agents in processing order
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.population.iter()
    }

    /// Read-only cell accessor
    pub fn cell(&self, x: usize, y: usize) -> Option<&WorldCell> {
        self.world.get(x, y)
    }

    /// Age of the agent at the head of the processing order
    pub fn first_agent_age(&self) -> Turn {
        self.population
            .first()
            .and_then(|id| self.population.get(id))
            .map(|a| a.age(self.turn))
            .unwrap_or(0)
    }

    /// Fill in population and totals for the turn in progress
    pub fn tally(&mut self) {
        let mut total_mass = Fixed::ZERO;
        let mut total_genes = 0u64;
        for (_, agent) in self.population.iter() {
            total_mass += agent.mass();
            total_genes += agent.brain.gene_count() as u64;
        }
        self.current.population = self.population.len();
        self.current.total_mass = total_mass;
        self.current.total_genes = total_genes;
        self.current.total_food = self.world.total_food();
    }

    /// Every occupied cell points at a live agent standing there, and every
    /// agent's cell points back at it
    pub fn is_consistent(&self) -> bool {
        let cells_ok = self.world.positions().all(|pos| match self.world.occupant(pos) {
            Some(id) => self.population.get(id).map(|a| a.pos() == pos).unwrap_or(false),
            None => true,
        });
        let agents_ok = self
            .population
            .iter()
            .all(|(id, a)| self.world.occupant(a.pos()) == Some(id));
        cells_ok && agents_ok && self.population.links_consistent()
    }
}
