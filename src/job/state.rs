// src/job/state.rs

//! Job instance lifecycle state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a job instance as persisted in the store.
///
/// The agent only ever moves forward through
/// `Pending -> Initializing -> Cloning -> Building -> Sealing -> Finished`.
/// `Failed` can be entered from any non-terminal state. There is
/// no `Frozen` state: a frozen group shows up as a `taskFreezePoint` record
/// correlated with the instance (see [`crate::freeze::frozen_groups`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Created by the scheduler, not yet picked up by an agent.
    #[default]
    Pending,
    Initializing,
    Cloning,
    Building,
    Sealing,
    Finished,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed)
    }

    /// Whether an agent may pick up an instance currently in this state.
    pub fn is_startable(self) -> bool {
        self == JobState::Pending
    }

    /// Position along the forward path. `Failed` has no rank.
    fn rank(self) -> Option<u8> {
        match self {
            JobState::Pending => Some(0),
            JobState::Initializing => Some(1),
            JobState::Cloning => Some(2),
            JobState::Building => Some(3),
            JobState::Sealing => Some(4),
            JobState::Finished => Some(5),
            JobState::Failed => None,
        }
    }

    /// Whether the agent may write `next` over `self`.
    ///
    /// Only the immediate successor on the forward path, or `Failed` from a
    /// non-terminal state, is allowed.
    pub fn can_transition_to(self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobState::Failed {
            return true;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to == from + 1,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Initializing => "initializing",
            JobState::Cloning => "cloning",
            JobState::Building => "building",
            JobState::Sealing => "sealing",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(JobState::Pending),
            "initializing" => Ok(JobState::Initializing),
            "cloning" => Ok(JobState::Cloning),
            "building" => Ok(JobState::Building),
            "sealing" => Ok(JobState::Sealing),
            "finished" => Ok(JobState::Finished),
            "failed" => Ok(JobState::Failed),
            other => Err(format!("invalid job state: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_strictly_sequential() {
        use JobState::*;
        let path = [Pending, Initializing, Cloning, Building, Sealing, Finished];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            assert!(!pair[1].can_transition_to(pair[0]), "{} -> {}", pair[1], pair[0]);
        }
        assert!(!Initializing.can_transition_to(Building));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in [
            JobState::Pending,
            JobState::Initializing,
            JobState::Building,
            JobState::Finished,
            JobState::Failed,
        ] {
            assert!(!JobState::Finished.can_transition_to(next));
            assert!(!JobState::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn failed_is_reachable_from_any_live_state() {
        for from in [
            JobState::Pending,
            JobState::Initializing,
            JobState::Cloning,
            JobState::Building,
            JobState::Sealing,
        ] {
            assert!(from.can_transition_to(JobState::Failed));
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&JobState::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
        assert_eq!("Building".parse::<JobState>().unwrap(), JobState::Building);
    }
}
