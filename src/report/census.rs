//! Lineage census and notable agents

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::constants::N_DECISIONS;
use crate::core::types::{LineageId, Turn};
use crate::genetics::reproduction::ColorBand;
use crate::simulation::agent::Agent;
use crate::simulation::state::SimulationState;

/// How many families the census lists
const TOP_FAMILIES: usize = 10;

/// Band whose channel dominates a lineage colour; ties go red, then green
pub fn dominant_band(color: [u8; 3]) -> ColorBand {
    let [r, g, b] = color;
    if r >= g && r >= b {
        ColorBand::Red
    } else if g >= b {
        ColorBand::Green
    } else {
        ColorBand::Blue
    }
}

/// Which agent stands out, and for what
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notable {
    pub title: String,
    pub uid: LineageId,
    pub score: i64,
}

/// Population counts grouped by lineage
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Census {
    pub turn: Turn,
    pub population: usize,
    pub blue: usize,
    pub red: usize,
    pub green: usize,
    /// Largest groups of siblings by parent uid, biggest first
    pub families: Vec<(LineageId, usize)>,
    /// Share of all genes carried in each decision slot, per 1024
    pub gene_share: [i64; N_DECISIONS],
    pub notables: Vec<Notable>,
}

impl Census {
    pub fn take(state: &SimulationState) -> Self {
        let now = state.turn;
        let mut census = Census {
            turn: now,
            population: state.population.len(),
            ..Default::default()
        };

        let mut families: AHashMap<LineageId, usize> = AHashMap::new();
        let mut slot_genes = [0i64; N_DECISIONS];
        for (_, agent) in state.agents() {
            match dominant_band(agent.brain.origin.color) {
                ColorBand::Blue => census.blue += 1,
                ColorBand::Red => census.red += 1,
                ColorBand::Green => census.green += 1,
            }
            if let Some(parent) = agent.brain.lineage.first().copied().flatten() {
                *families.entry(parent).or_default() += 1;
            }
            for (slot, genes) in slot_genes.iter_mut().enumerate() {
                *genes += agent.brain.slots[slot].node_count() as i64;
            }
        }

        let mut families: Vec<_> = families.into_iter().collect();
        families.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        families.truncate(TOP_FAMILIES);
        census.families = families;

        let total: i64 = slot_genes.iter().sum();
        if total > 0 {
            census.gene_share = slot_genes.map(|g| g * 1024 / total);
        }

        census.notables = notables(state, now);
        census
    }
}

fn notable(title: &str, agent: &Agent, score: i64) -> Notable {
    Notable {
        title: title.to_string(),
        uid: agent.uid,
        score,
    }
}

/// Earliest agent with the highest score; `None` for an empty population
fn best_by<'a>(agents: &[&'a Agent], score: impl Fn(&Agent) -> i64) -> Option<(&'a Agent, i64)> {
    let mut best: Option<(&Agent, i64)> = None;
    for &agent in agents {
        let s = score(agent);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((agent, s));
        }
    }
    best
}

fn notables(state: &SimulationState, now: Turn) -> Vec<Notable> {
    let agents: Vec<&Agent> = state.agents().map(|(_, a)| a).collect();
    let (Some(&first), Some(&last)) = (agents.first(), agents.last()) else {
        return Vec::new();
    };

    let mut out = vec![
        notable("oldest", first, first.age(now) as i64),
        notable("newest", last, last.age(now) as i64),
    ];
    let median = agents[agents.len() / 2];
    out.push(notable("median", median, median.age(now) as i64));

    let rankings: [(&str, Box<dyn Fn(&Agent) -> i64>); 9] = [
        ("most kills", Box::new(|a: &Agent| a.counters.kills as i64)),
        ("most moves", Box::new(|a: &Agent| a.counters.moves as i64)),
        ("most defends", Box::new(|a: &Agent| a.counters.times_defended as i64)),
        ("most offspring", Box::new(|a: &Agent| a.counters.offspring as i64)),
        ("lowest generation", Box::new(|a: &Agent| -(a.brain.generation as i64))),
        ("highest generation", Box::new(|a: &Agent| a.brain.generation as i64)),
        ("least genes", Box::new(|a: &Agent| -(a.brain.gene_count() as i64))),
        ("lean genes", Box::new(Agent::lean_score)),
        ("slasher", Box::new(move |a: &Agent| a.slasher_score(now))),
    ];
    for (title, score) in rankings.iter() {
        if let Some((agent, s)) = best_by(&agents, score) {
            out.push(notable(title, agent, s));
        }
    }
    out
}
