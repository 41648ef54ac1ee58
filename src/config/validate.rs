// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{AgentConfig, RawAgentConfig};
use crate::errors::{AgentError, Result};

impl TryFrom<RawAgentConfig> for AgentConfig {
    type Error = AgentError;

    fn try_from(raw: RawAgentConfig) -> std::result::Result<Self, Self::Error> {
        let freeze_poll_interval = validate_poll_interval(&raw.agent.freeze_poll_interval)?;
        validate_paths(&raw)?;

        Ok(AgentConfig {
            freeze_poll_interval,
            inherit_environment: raw.agent.inherit_environment,
            store_path: raw.store.path,
            sources_workspace: raw.sources.workspace,
        })
    }
}

fn validate_poll_interval(s: &str) -> Result<Duration> {
    let interval = parse_duration(s).map_err(|e| {
        AgentError::ConfigError(format!("[agent].freeze_poll_interval: {e}"))
    })?;

    if interval.is_zero() {
        return Err(AgentError::ConfigError(
            "[agent].freeze_poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(interval)
}

fn validate_paths(cfg: &RawAgentConfig) -> Result<()> {
    if cfg.store.path.as_os_str().is_empty() {
        return Err(AgentError::ConfigError(
            "[store].path must not be empty".to_string(),
        ));
    }
    if cfg.sources.workspace.as_os_str().is_empty() {
        return Err(AgentError::ConfigError(
            "[sources].workspace must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let seconds_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
