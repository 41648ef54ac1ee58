// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Agent configuration as read from a TOML file.
///
/// ```toml
/// [agent]
/// freeze_poll_interval = "5s"
/// inherit_environment = true
///
/// [store]
/// path = ".buildagent/store.json"
///
/// [sources]
/// workspace = ".buildagent/sources"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAgentConfig {
    #[serde(default)]
    pub agent: AgentSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub sources: SourcesSection,
}

/// `[agent]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    /// How often a freeze gate re-checks its freeze point, e.g. `"5s"`.
    #[serde(default = "default_freeze_poll_interval")]
    pub freeze_poll_interval: String,

    /// Whether task processes start from the agent's own environment
    /// (`true`) or only see their resolved variables (`false`).
    #[serde(default = "default_inherit_environment")]
    pub inherit_environment: bool,
}

fn default_freeze_poll_interval() -> String {
    "5s".to_string()
}

fn default_inherit_environment() -> bool {
    true
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            freeze_poll_interval: default_freeze_poll_interval(),
            inherit_environment: default_inherit_environment(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// JSON document holding all records.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".buildagent/store.json")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// `[sources]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesSection {
    /// Directory pipeline sources are cloned into.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".buildagent/sources")
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
        }
    }
}

/// Validated configuration. Build it from a [`RawAgentConfig`] with
/// `AgentConfig::try_from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub freeze_poll_interval: Duration,
    pub inherit_environment: bool,
    pub store_path: PathBuf,
    pub sources_workspace: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            freeze_poll_interval: crate::freeze::DEFAULT_POLL_INTERVAL,
            inherit_environment: default_inherit_environment(),
            store_path: default_store_path(),
            sources_workspace: default_workspace(),
        }
    }
}
