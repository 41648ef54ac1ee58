// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{AgentConfig, RawAgentConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawAgentConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawAgentConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawAgentConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AgentConfig> {
    let raw_config = load_from_path(&path)?;
    let config = AgentConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load the configuration the CLI asked for.
///
/// An explicitly given path must exist. Without one, [`default_config_path`]
/// is used if present and built-in defaults otherwise.
pub fn load_for_cli(explicit: Option<&Path>) -> Result<AgentConfig> {
    match explicit {
        Some(path) => load_and_validate(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                load_and_validate(&path)
            } else {
                debug!(path = ?path, "no config file found; using defaults");
                AgentConfig::try_from(RawAgentConfig::default())
            }
        }
    }
}

/// Config file looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Agent.toml")
}
