use thiserror::Error;

use crate::core::types::AgentId;
use crate::genetics::tree::GeneError;

#[derive(Error, Debug)]
pub enum BugsError {
    #[error("Agent not found: {0:?}")]
    AgentNotFound(AgentId),

    #[error("Cell ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Gene error: {0}")]
    Gene(#[from] GeneError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BugsError>;
