//! Read-only views of a run for reporting

pub mod census;
pub mod snapshot;

pub use census::{dominant_band, Census, Notable};
pub use snapshot::{AgentRecord, ChromosomeDump, PopulationSnapshot};
