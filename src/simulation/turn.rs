//! Action resolution - one agent's turn
//!
//! An agent senses its surroundings, shifts its history, decides, and the
//! chosen action is applied to the world and to any agent it touches.
//! Every action is paid for in mass. Whatever survives the action is then
//! checked against the starvation floor.

use serde::{Deserialize, Serialize};

use crate::core::error::{BugsError, Result};
use crate::core::fixed::{Fixed, SCALE};
use crate::core::types::{Action, AgentId, SenseVector};
use crate::genetics::reproduction::{produce_offspring, ColorBand};
use crate::simulation::agent::Agent;
use crate::simulation::combat::{attacker_wins, effective_defender_mass};
use crate::simulation::decide::{decide, mate_consents};
use crate::simulation::energy::charge;
use crate::simulation::senses::gather_senses;
use crate::simulation::state::SimulationState;

/// Facing offsets of the child slots around a dividing parent, in order
const CHILD_OFFSETS: [i64; 6] = [3, -2, 2, -1, 1, 0];

/// Why an agent left the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Combat,
    Starvation,
}

/// What happened on one agent's turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOutcome {
    /// Action the brain chose
    pub action: Action,
    /// Children placed by a division
    pub births: u32,
    /// Another agent destroyed by this one
    pub victim: Option<AgentId>,
    /// Set if the acting agent did not survive its turn
    pub death: Option<DeathCause>,
}

impl AgentOutcome {
    fn new(action: Action) -> Self {
        Self {
            action,
            births: 0,
            victim: None,
            death: None,
        }
    }
}

/// Run one agent's turn
pub fn take_turn(state: &mut SimulationState, id: AgentId) -> Result<AgentOutcome> {
    let agent = state.population.get(id).ok_or(BugsError::AgentNotFound(id))?;
    let senses = gather_senses(agent, &state.world, &state.population, &state.config, state.turn);
    let action = decide(&agent.brain, &senses);

    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    agent.shift_history(action);

    let mut outcome = AgentOutcome::new(action);
    match action {
        Action::Sleep | Action::Mated | Action::Defend => {
            charge(agent, state.config.costs.sleep, &state.config.metabolism);
        }
        Action::Eat => eat(state, id)?,
        Action::TurnCw | Action::TurnCcw => {
            let current = agent.current_mut();
            current.facing = if action == Action::TurnCw {
                current.facing.cw()
            } else {
                current.facing.ccw()
            };
            charge(agent, state.config.costs.turn, &state.config.metabolism);
        }
        Action::Move => resolve_move(state, id, &mut outcome)?,
        Action::Mate => resolve_mate(state, id, &senses)?,
        Action::Divide => outcome.births = resolve_divide(state, id)?,
    }

    if outcome.death.is_none() {
        let floor = state.config.metabolism.starvation_floor;
        let starving = state.population.get(id).map(|a| a.mass() < floor).unwrap_or(false);
        if starving {
            state.kill(id);
            state.current.starvations += 1;
            outcome.death = Some(DeathCause::Starvation);
        }
    }

    tracing::trace!(
        action = action.name(),
        births = outcome.births,
        died = ?outcome.death,
        "turn resolved"
    );
    Ok(outcome)
}

/// Take food from the own cell, at most a fixed fraction of body mass
///
/// Reaching for more than the cell holds costs the shortfall in mass.
fn eat(state: &mut SimulationState, id: AgentId) -> Result<()> {
    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    let pos = agent.pos();
    let available = state.world.food(pos);

    let mut intake = Fixed::from_raw(agent.mass().raw().saturating_mul(state.config.metabolism.eat_limit) / SCALE);
    let mut mass = agent.mass();
    if intake > available {
        mass -= intake - available;
        intake = available;
    }
    agent.set_mass(mass + intake);
    state.world.cell_mut(pos).food -= intake;

    charge(agent, state.config.costs.eat, &state.config.metabolism);
    Ok(())
}

/// Step forward, fighting whoever stands in the way
fn resolve_move(state: &mut SimulationState, id: AgentId, outcome: &mut AgentOutcome) -> Result<()> {
    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    agent.counters.moves += 1;
    state.current.movement += 1;

    let dest = state.world.step(agent.pos(), agent.facing());
    let defender = state.world.occupant(dest);
    charge(agent, state.config.costs.movement, &state.config.metabolism);

    let Some(defender) = defender else {
        return state.relocate(id, dest);
    };
    if state.config.safety {
        return Ok(());
    }

    state.current.collisions += 1;
    let (attacker, target) = state
        .population
        .get2_mut(id, defender)
        .ok_or(BugsError::AgentNotFound(defender))?;
    let relative = target.facing().relative_to(attacker.facing());
    let effective = effective_defender_mass(
        target.mass(),
        relative,
        target.counters.times_defended,
        attacker.counters.kills,
    );
    let attacker_mass = attacker.mass();

    if attacker_wins(effective, attacker_mass, &mut state.rng) {
        attacker.counters.kills += 1;
        state.kill(defender);
        state.current.combat_deaths += 1;
        state.relocate(id, dest)?;
        let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
        charge(agent, state.config.costs.fight, &state.config.metabolism);
        outcome.victim = Some(defender);
        tracing::debug!(effective, attacker = attacker_mass.raw(), "attacker won");
    } else {
        target.counters.times_defended += 1;
        target.shift_history(Action::Defend);
        attacker.set_mass(Fixed::ZERO);
        state.world.add_food(dest, attacker_mass);
        state.kill(id);
        state.current.combat_deaths += 1;
        outcome.death = Some(DeathCause::Combat);
        tracing::debug!(effective, attacker = attacker_mass.raw(), "defender held");
    }
    Ok(())
}

/// Court the agent ahead; on consent the two swap brain snapshots
fn resolve_mate(state: &mut SimulationState, id: AgentId, senses: &SenseVector) -> Result<()> {
    let agent = state.population.get(id).ok_or(BugsError::AgentNotFound(id))?;
    let dest = state.world.step(agent.pos(), agent.facing());
    let partner = state
        .world
        .occupant(dest)
        .filter(|&p| p != id)
        .filter(|&p| state.population.get(p).map(|p| mate_consents(&p.brain, senses)).unwrap_or(false));

    match partner.and_then(|p| state.population.get2_mut(id, p)) {
        Some((me, partner)) => {
            if me.mate_brain.uid() != partner.brain.uid() {
                me.counters.mate_successes += 1;
            } else {
                me.counters.mate_repeats += 1;
            }
            if partner.mate_brain.uid() != me.brain.uid() {
                partner.counters.mate_successes += 1;
            } else {
                partner.counters.mate_repeats += 1;
            }
            me.mate_brain = partner.brain.duplicate();
            partner.mate_brain = me.brain.duplicate();
            partner.shift_history(Action::Mated);
            me.current_mut().action = Action::Mated;
            state.current.mate_successes += 1;
        }
        None => {
            let me = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
            me.counters.mate_failures += 1;
            state.current.mate_failures += 1;
        }
    }

    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    charge(agent, state.config.costs.mate, &state.config.metabolism);
    Ok(())
}

/// Split mass among children placed around the parent
///
/// Returns the number of children born.
fn resolve_divide(state: &mut SimulationState, id: AgentId) -> Result<u32> {
    let policy = state.config.division.clone();
    let floor = state.config.metabolism.starvation_floor;
    let overhead = state.config.costs.divide_overhead;
    let today = state.turn;

    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    let divide = i64::from(agent.brain.divide_count.max(1));

    if policy.enforce_age_floor && agent.birth_turn + policy.age_floor > today {
        refuse_division(state, id, policy.age_split_penalty, policy.age_overhead_penalty)?;
        return Ok(0);
    }
    if policy.enforce_mating && !agent.has_fresh_mate() {
        refuse_division(state, id, policy.mating_split_penalty, policy.mating_overhead_penalty)?;
        return Ok(0);
    }

    let child_mass = agent.mass().div_int(divide) - overhead;
    agent.set_mass(child_mass);
    if child_mass < floor {
        return Ok(0);
    }

    let origin = agent.pos();
    let facing = agent.facing();
    let mut births = 0;
    for offset in CHILD_OFFSETS.iter().take(divide as usize - 1) {
        let child_facing = facing.rotated(*offset);
        let at = state.world.step(origin, child_facing);
        if !state.world.cell(at).is_empty() {
            continue;
        }

        let uid = state.allocate_uid();
        let band = ColorBand::for_row(at.y, state.world.height());
        let parent = state.population.get(id).ok_or(BugsError::AgentNotFound(id))?;
        let offspring = produce_offspring(&parent.brain, &parent.mate_brain, uid, band, &mut state.rng)?;
        let child = Agent::new(today, at, child_facing, child_mass, offspring.brain, offspring.mate_brain);
        state.place_agent(child)?;

        state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?.counters.offspring += 1;
        state.current.births += 1;
        births += 1;
    }

    if policy.reset_mate_after_division {
        let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
        agent.mate_brain.origin.uid = agent.brain.uid();
    }
    if births > 0 {
        tracing::trace!(births, "division");
    }
    Ok(births)
}

/// A division the policy forbids: pay the penalties, hold at the floor,
/// and sleep
fn refuse_division(
    state: &mut SimulationState,
    id: AgentId,
    split: bool,
    overhead: bool,
) -> Result<()> {
    let floor = state.config.metabolism.starvation_floor;
    let agent = state.population.get_mut(id).ok_or(BugsError::AgentNotFound(id))?;
    let mut mass = agent.mass();
    if split {
        mass = mass.div_int(i64::from(agent.brain.divide_count.max(1)));
    }
    if overhead {
        mass -= state.config.costs.divide_overhead;
    }
    agent.set_mass(mass.max(floor));
    charge(agent, state.config.costs.sleep, &state.config.metabolism);
    Ok(())
}
