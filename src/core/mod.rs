pub mod config;
pub mod constants;
pub mod error;
pub mod fixed;
pub mod rng;
pub mod types;

pub use config::SimulationConfig;
pub use error::{BugsError, Result};
pub use fixed::Fixed;
pub use rng::SimRng;
pub use types::{Action, AgentId, Allele, LineageId, SenseVector, Turn};
