//! Per-turn statistics and a bounded history of them

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::constants::STATS_HISTORY;
use crate::core::fixed::Fixed;
use crate::core::types::Turn;

/// Event counts and totals for one turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStats {
    pub turn: Turn,
    /// Agents alive at the end of the turn
    pub population: usize,
    pub births: u64,
    pub movement: u64,
    pub collisions: u64,
    pub combat_deaths: u64,
    pub starvations: u64,
    pub mate_successes: u64,
    pub mate_failures: u64,
    pub total_food: Fixed,
    pub total_mass: Fixed,
    pub total_genes: u64,
}

impl TurnStats {
    pub fn new(turn: Turn) -> Self {
        Self {
            turn,
            ..Default::default()
        }
    }

    pub fn deaths(&self) -> u64 {
        self.combat_deaths + self.starvations
    }

    pub fn mean_mass(&self) -> Fixed {
        self.total_mass.div_int(self.population as i64)
    }

    pub fn mean_genes(&self) -> u64 {
        self.total_genes / (self.population.max(1) as u64)
    }
}

/// The most recent turns' statistics, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsHistory {
    turns: VecDeque<TurnStats>,
    capacity: usize,
}

impl Default for StatsHistory {
    fn default() -> Self {
        Self::with_capacity(STATS_HISTORY)
    }
}

impl StatsHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, stats: TurnStats) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(stats);
    }

    pub fn latest(&self) -> Option<&TurnStats> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TurnStats> {
        self.turns.iter()
    }

    /// Births and deaths summed over the retained window
    pub fn window_totals(&self) -> (u64, u64) {
        self.turns
            .iter()
            .fold((0, 0), |(b, d), t| (b + t.births, d + t.deaths()))
    }
}
