// src/config/mod.rs

//! Configuration loading and validation for the agent.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values such as durations and paths (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_for_cli, load_from_path};
pub use model::{AgentConfig, AgentSection, RawAgentConfig, SourcesSection, StoreSection};
pub use validate::parse_duration;
