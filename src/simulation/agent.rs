//! Agent record - position history, genomes and lifetime counters

use serde::{Deserialize, Serialize};

use crate::core::constants::POS_HISTORY;
use crate::core::fixed::Fixed;
use crate::core::types::{Action, LineageId, Turn};
use crate::genetics::brain::Brain;
use crate::world::hex::{Facing, HexPos};

/// One slot of the position history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub pos: HexPos,
    pub facing: Facing,
    pub action: Action,
    pub mass: Fixed,
}

/// Things an agent has done over its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifetimeCounters {
    pub kills: u64,
    pub times_defended: u64,
    pub moves: u64,
    pub mate_successes: u64,
    pub mate_repeats: u64,
    pub mate_failures: u64,
    pub offspring: u64,
}

/// A living agent
///
/// `history[0]` is the present: where the agent is, which way it faces,
/// what it last did and how heavy it is. Older entries trail behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub uid: LineageId,
    pub birth_turn: Turn,
    pub history: [HistoryEntry; POS_HISTORY],
    pub brain: Brain,
    /// Genome of the most recent mate, used as the second parent when dividing
    pub mate_brain: Brain,
    pub counters: LifetimeCounters,
}

impl Agent {
    /// New agent with its whole history set to the present
    pub fn new(
        birth_turn: Turn,
        pos: HexPos,
        facing: Facing,
        mass: Fixed,
        brain: Brain,
        mate_brain: Brain,
    ) -> Self {
        let entry = HistoryEntry {
            pos,
            facing,
            action: Action::Sleep,
            mass,
        };
        Self {
            uid: brain.uid(),
            birth_turn,
            history: [entry; POS_HISTORY],
            brain,
            mate_brain,
            counters: LifetimeCounters::default(),
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.history[0]
    }

    pub fn current_mut(&mut self) -> &mut HistoryEntry {
        &mut self.history[0]
    }

    pub fn pos(&self) -> HexPos {
        self.history[0].pos
    }

    pub fn facing(&self) -> Facing {
        self.history[0].facing
    }

    pub fn mass(&self) -> Fixed {
        self.history[0].mass
    }

    pub fn set_mass(&mut self, mass: Fixed) {
        self.history[0].mass = mass;
    }

    pub fn last_action(&self) -> Action {
        self.history[0].action
    }

    /// Age in turns
    pub fn age(&self, now: Turn) -> Turn {
        now.saturating_sub(self.birth_turn)
    }

    /// Push the present one slot back and record `action` in a copy of it
    pub fn shift_history(&mut self, action: Action) {
        self.history.rotate_right(1);
        self.history[0] = self.history[1];
        self.history[0].action = action;
    }

    /// Turns since `action` last appeared in history, if it did
    pub fn turns_since(&self, action: Action) -> Option<usize> {
        self.history.iter().position(|h| h.action == action)
    }

    /// True once this agent has mated with someone since it last divided
    pub fn has_fresh_mate(&self) -> bool {
        self.mate_brain.uid() != self.brain.uid()
    }

    /// Efficiency score: lots of movement and breeding on few genes
    pub fn lean_score(&self) -> i64 {
        let genes = self.brain.gene_count().max(1) as i64;
        let c = &self.counters;
        let mut score = 1024 * c.moves as i64 / genes;
        score = score * (c.mate_successes as i64 + 1) / genes;
        score.saturating_mul((c.offspring as i64).saturating_mul(c.offspring as i64)) / genes
    }

    /// Aggression score: kills, cubed, weighted by breeding and per unit of
    /// time spent moving
    pub fn slasher_score(&self, now: Turn) -> i64 {
        let c = &self.counters;
        let kills = c.kills as i64;
        let breeding = c.offspring as i64 * 4 + c.mate_successes as i64 + 1;
        let effort = (self.age(now) as i64).saturating_mul(c.moves as i64) + 1024;
        kills
            .saturating_mul(kills)
            .saturating_mul(kills)
            .saturating_mul(breeding)
            .saturating_mul(1024)
            / effort
    }
}
