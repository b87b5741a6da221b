//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

use crate::core::constants::{N_DECISIONS, N_SENSES};
use crate::core::fixed::Fixed;

new_key_type! {
    /// Registry handle for a live agent
    ///
    /// Generational, so a stale handle held by a cell or a cursor resolves to
    /// nothing once the agent is gone.
    pub struct AgentId;
}

/// Serial number of a brain's owner, used for lineage and mating records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineageId(pub u64);

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation turn counter
pub type Turn = u64;

/// Everything that can appear in an agent's position history
///
/// The first seven are choosable. `Mated` and `Defend` are recorded as
/// outcomes of someone else's action and are never chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Action {
    #[default]
    Sleep = 0,
    Eat = 1,
    TurnCw = 2,
    TurnCcw = 3,
    Move = 4,
    Mate = 5,
    Divide = 6,
    Mated = 7,
    Defend = 8,
}

impl Action {
    /// All action codes, in code order
    pub const ALL: [Action; 9] = [
        Action::Sleep,
        Action::Eat,
        Action::TurnCw,
        Action::TurnCcw,
        Action::Move,
        Action::Mate,
        Action::Divide,
        Action::Mated,
        Action::Defend,
    ];

    /// Actions a brain can choose, indexed by decision slot
    pub const CHOOSABLE: [Action; 7] = [
        Action::Sleep,
        Action::Eat,
        Action::TurnCw,
        Action::TurnCcw,
        Action::Move,
        Action::Mate,
        Action::Divide,
    ];

    pub fn code(self) -> usize {
        self as usize
    }

    /// Action chosen when decision slot `slot` wins
    pub fn from_slot(slot: usize) -> Option<Action> {
        Self::CHOOSABLE.get(slot).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Sleep => "sleep",
            Action::Eat => "eat",
            Action::TurnCw => "turn-cw",
            Action::TurnCcw => "turn-ccw",
            Action::Move => "move",
            Action::Mate => "mate",
            Action::Divide => "divide",
            Action::Mated => "mated",
            Action::Defend => "defend",
        }
    }
}

/// The per-turn snapshot an agent's gene trees are evaluated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenseVector([Fixed; N_SENSES]);

impl SenseVector {
    pub fn zeroed() -> Self {
        Self([Fixed::ZERO; N_SENSES])
    }

    pub fn from_array(values: [Fixed; N_SENSES]) -> Self {
        Self(values)
    }

    /// Read a sense; the index must already be in range
    pub fn get(&self, index: usize) -> Fixed {
        self.0[index]
    }

    pub fn set(&mut self, index: usize, value: Fixed) {
        self.0[index] = value;
    }

    pub fn as_slice(&self) -> &[Fixed] {
        &self.0
    }
}

impl Default for SenseVector {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Which chromosome of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allele {
    A,
    B,
}

impl Allele {
    /// Allele expressed for `slot` under an expression mask (set bit = A)
    pub fn expressed(mask: u8, slot: usize) -> Allele {
        debug_assert!(slot < N_DECISIONS);
        if mask & (1 << slot) != 0 {
            Allele::A
        } else {
            Allele::B
        }
    }
}
