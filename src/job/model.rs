// src/job/model.rs

//! Records read and written by the agent.
//!
//! Field names follow the store's camelCase document shape, e.g.
//!
//! ```json
//! {
//!   "id": "pipelineJob:build",
//!   "label": "build",
//!   "taskGroups": [
//!     { "id": "taskGroup:1", "label": "compile", "order": 0, "tasks": [
//!       { "id": "task:1", "label": "make", "command": "make",
//!         "arguments": ["-j4"], "commandTimeout": 60000 }
//!     ]}
//!   ]
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::job::JobState;
use crate::types::RecordId;

/// One runtime execution of a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInstance {
    pub id: RecordId,
    #[serde(default)]
    pub pipeline: Option<RecordId>,
    #[serde(default)]
    pub job: Option<RecordId>,
    /// Absent on freshly created instances, which count as `pending`.
    #[serde(default)]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

impl JobInstance {
    pub fn effective_state(&self) -> JobState {
        self.state.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: RecordId,
    #[serde(default)]
    pub label: String,
    /// Source trees prepared before any task group runs.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

/// A repository checked out by the source resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpec {
    pub url: String,
    #[serde(default)]
    pub branch: Option<String>,
    /// Checkout directory, relative to the configured sources workspace.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: RecordId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub task_groups: Vec<TaskGroup>,
}

impl Job {
    /// Total number of tasks across all groups.
    pub fn task_count(&self) -> usize {
        self.task_groups.iter().map(|g| g.tasks.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: RecordId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order: i64,
    /// Program path or name.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Raw shell-like command line. When set, it is tokenized and takes
    /// precedence over `command` and `arguments`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// Timeout in milliseconds; `0` or absent means unbounded.
    #[serde(default)]
    pub command_timeout: Option<u64>,
    #[serde(default)]
    pub freeze_before_run: bool,
    #[serde(default)]
    pub freeze_after_run: bool,
}

impl Task {
    pub fn timeout(&self) -> Option<Duration> {
        match self.command_timeout {
            Some(ms) if ms > 0 => Some(Duration::from_millis(ms)),
            _ => None,
        }
    }
}

/// Which side of a task a freeze marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreezePosition {
    Before,
    After,
}

/// Barrier record. Its existence holds a task group; deleting it resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFreezePoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub task_group: RecordId,
    pub job_instance: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<FreezePosition>,
}

/// Variable definition consumed by the store-backed environment resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// Pipeline, job or task this variable applies to.
    pub scope: RecordId,
}
