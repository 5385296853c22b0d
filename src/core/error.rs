//! Crate-wide error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Invalid stats: {0}")]
    InvalidStats(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
