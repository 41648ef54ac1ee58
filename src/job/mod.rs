// src/job/mod.rs

//! Job records and the job-instance lifecycle.
//!
//! - [`model`] holds the serde-backed record shapes (instances, pipelines,
//!   jobs, task groups, tasks, freeze points).
//! - [`state`] holds the [`JobState`] machine the orchestrator drives.

pub mod model;
pub mod state;

pub use model::{
    EnvironmentVariable, FreezePosition, Job, JobInstance, Pipeline, SourceSpec, Task,
    TaskFreezePoint, TaskGroup,
};
pub use state::JobState;

/// Ensure the job has at least one task across all of its groups.
pub fn validate_job_can_run(job: &Job) -> crate::errors::Result<()> {
    if job.task_count() == 0 {
        return Err(crate::errors::AgentError::NoWorkToDo);
    }
    Ok(())
}
