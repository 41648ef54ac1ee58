// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::command::CommandError;
use crate::job::JobState;
use crate::types::RecordId;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: RecordId, reason: String },

    #[error("Failed to resolve job instance {0}")]
    InstanceNotFound(RecordId),

    #[error("Job instance {id} is not runnable from state '{state}'")]
    NotRunnable { id: RecordId, state: JobState },

    #[error("Invalid state transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: RecordId,
        from: JobState,
        to: JobState,
    },

    #[error("No work to do")]
    NoWorkToDo,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AgentError>;
