//! The turn engine: agents, senses, decisions and action resolution

pub mod agent;
pub mod combat;
pub mod control;
pub mod decide;
pub mod energy;
pub mod engine;
pub mod population;
pub mod senses;
pub mod state;
pub mod stats;
pub mod turn;

pub use agent::{Agent, HistoryEntry, LifetimeCounters};
pub use control::{AdaptiveSchedule, Controller, StaticControl};
pub use decide::{decide, mate_consents};
pub use engine::Simulation;
pub use population::Population;
pub use senses::gather_senses;
pub use state::SimulationState;
pub use stats::{StatsHistory, TurnStats};
pub use turn::{take_turn, AgentOutcome, DeathCause};
