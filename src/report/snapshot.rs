//! Serializable population snapshots

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::constants::N_DECISIONS;
use crate::core::error::Result;
use crate::core::types::{Action, Allele, LineageId, Turn};
use crate::simulation::agent::{Agent, LifetimeCounters};
use crate::simulation::state::SimulationState;
use crate::simulation::stats::TurnStats;
use crate::world::hex::{Facing, HexPos};

/// Text dumps of one decision slot's alleles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeDump {
    pub slot: usize,
    /// Action the slot votes for, or "mate-response"
    pub role: String,
    /// Which allele the brain expresses
    pub expressed: char,
    pub a: String,
    pub b: String,
    pub genes: usize,
}

/// Full record of one agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub uid: LineageId,
    pub generation: u64,
    pub birth_turn: Turn,
    pub age: Turn,
    pub genes: usize,
    /// Raw fixed-point mass
    pub mass: i64,
    pub pos: HexPos,
    pub facing: Facing,
    pub last_action: Action,
    pub divide_count: u8,
    pub color: [u8; 3],
    /// Immediate parents, own brain first
    pub parents: [Option<LineageId>; 2],
    pub mate_uid: LineageId,
    pub counters: LifetimeCounters,
    pub chromosomes: Vec<ChromosomeDump>,
}

impl AgentRecord {
    pub fn from_agent(agent: &Agent, now: Turn) -> Self {
        let brain = &agent.brain;
        let chromosomes = (0..N_DECISIONS)
            .map(|slot| {
                let pair = &brain.slots[slot];
                ChromosomeDump {
                    slot,
                    role: Action::from_slot(slot).map_or("mate-response", Action::name).to_string(),
                    expressed: match brain.expressed_allele(slot) {
                        Allele::A => 'a',
                        Allele::B => 'b',
                    },
                    a: pair.a.to_string(),
                    b: pair.b.to_string(),
                    genes: pair.node_count(),
                }
            })
            .collect();

        Self {
            uid: agent.uid,
            generation: brain.generation,
            birth_turn: agent.birth_turn,
            age: agent.age(now),
            genes: brain.gene_count(),
            mass: agent.mass().raw(),
            pos: agent.pos(),
            facing: agent.facing(),
            last_action: agent.last_action(),
            divide_count: brain.divide_count,
            color: brain.origin.color,
            parents: [
                brain.lineage.first().copied().flatten(),
                brain.lineage.get(1).copied().flatten(),
            ],
            mate_uid: agent.mate_brain.uid(),
            counters: agent.counters,
            chromosomes,
        }
    }
}

/// The whole population at one moment, in processing order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub turn: Turn,
    pub population: usize,
    /// Lineage ids handed out so far
    pub uids_issued: u64,
    pub world_width: usize,
    pub world_height: usize,
    pub last_turn: Option<TurnStats>,
    pub agents: Vec<AgentRecord>,
}

impl PopulationSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let agents = state
            .agents()
            .map(|(_, agent)| AgentRecord::from_agent(agent, state.turn))
            .collect();
        Self {
            turn: state.turn,
            population: state.population.len(),
            uids_issued: state.next_uid(),
            world_width: state.world.width(),
            world_height: state.world.height(),
            last_turn: state.history.latest().cloned(),
            agents,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    fn seeded() -> SimulationState {
        let mut config = SimulationConfig::default();
        config.world.width = 16;
        config.world.height = 12;
        let mut state = SimulationState::new(config).unwrap();
        state.seed_founder().unwrap();
        state
    }

    #[test]
    fn test_capture_founder() {
        let state = seeded();
        let snapshot = PopulationSnapshot::capture(&state);
        assert_eq!(snapshot.population, 1);
        assert_eq!(snapshot.uids_issued, 1);

        let founder = &snapshot.agents[0];
        assert_eq!(founder.uid, LineageId(0));
        assert_eq!(founder.genes, 27);
        assert_eq!(founder.parents, [None, None]);
        assert_eq!(founder.chromosomes.len(), N_DECISIONS);
        assert_eq!(founder.chromosomes[7].role, "mate-response");
        assert!(founder.chromosomes[0].a.starts_with("[ 0,"));
        let counted: usize = founder.chromosomes.iter().map(|c| c.genes).sum();
        assert_eq!(counted, founder.genes);
    }

    #[test]
    fn test_json_export_reads_back() {
        let snapshot = PopulationSnapshot::capture(&seeded());
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"chromosomes\""));
        let back = PopulationSnapshot::from_json(&json).unwrap();
        assert_eq!(back.agents, snapshot.agents);
    }
}
