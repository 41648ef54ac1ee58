// src/engine/orchestrator.rs

//! Top-level driver for one job instance.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::engine::group_runner::{GroupReport, RunContext, TaskGroupRunner};
use crate::engine::lifecycle::Lifecycle;
use crate::errors::{AgentError, Result};
use crate::job::{JobState, validate_job_can_run};
use crate::source::SourceResolver;
use crate::store::{Store, resolve_job_instance};
use crate::types::RecordId;

/// How a run ended, as far as the instance's recorded state is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The instance reached `finished`. Individual tasks may still have
    /// failed; see the group reports.
    Finished { groups: Vec<GroupReport> },
    /// The instance was moved to `failed` with this reason.
    Failed { reason: String },
}

/// Resolves a job instance, validates it, prepares sources, runs its task
/// groups and records each lifecycle step in the store.
///
/// An instance is run at most once: anything not in `pending` is refused
/// before a single write happens.
pub struct JobOrchestrator {
    store: Arc<dyn Store>,
    sources: Arc<dyn SourceResolver>,
    runner: TaskGroupRunner,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        sources: Arc<dyn SourceResolver>,
        runner: TaskGroupRunner,
    ) -> Self {
        Self {
            store,
            sources,
            runner,
        }
    }

    pub async fn run(&self, id: &RecordId) -> Result<RunOutcome> {
        let resolved = match resolve_job_instance(self.store.as_ref(), id).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                error!(job_instance = %id, "Failed to resolve job instance");
                return Err(AgentError::InstanceNotFound(id.clone()));
            }
            Err(e) => {
                error!(job_instance = %id, error = %e, "Failed to resolve job instance");
                return Err(e);
            }
        };

        let state = resolved.instance.effective_state();
        if !state.is_startable() {
            warn!(job_instance = %id, %state, "job instance is not runnable; leaving it untouched");
            return Err(AgentError::NotRunnable {
                id: id.clone(),
                state,
            });
        }

        let mut lifecycle = Lifecycle::new(self.store.as_ref(), id, state);

        let failure = resolved.failure_reason();
        let (Some(pipeline), Some(job)) = (resolved.pipeline, resolved.job) else {
            let reason = failure.unwrap_or_else(|| "Failed to resolve job instance".to_string());
            lifecycle.fail(&reason).await?;
            return Ok(RunOutcome::Failed { reason });
        };

        info!(job_instance = %id, pipeline = %pipeline.id, job = %job.id, "Agent initialized.");

        // Preflight checks.
        lifecycle.advance(JobState::Initializing).await?;
        if let Err(e) = validate_job_can_run(&job) {
            return fail(&mut lifecycle, e.to_string()).await;
        }

        lifecycle.advance(JobState::Cloning).await?;
        if let Err(e) = self.sources.resolve(&pipeline, &job).await {
            return fail(&mut lifecycle, format!("Failed to resolve sources: {e}")).await;
        }

        lifecycle.advance(JobState::Building).await?;
        let ctx = RunContext {
            job_instance: id.clone(),
            pipeline: pipeline.id.clone(),
            job: job.id.clone(),
        };
        let groups = match self.runner.run_groups(&job.task_groups, &ctx).await {
            Ok(groups) => groups,
            Err(e) => {
                return fail(&mut lifecycle, format!("Task group execution aborted: {e}")).await;
            }
        };

        // TODO: compress and upload artifacts once an artifact store exists.
        lifecycle.advance(JobState::Sealing).await?;

        lifecycle.advance(JobState::Finished).await?;

        let failed_tasks: usize = groups.iter().map(GroupReport::failed_tasks).sum();
        info!(job_instance = %id, groups = groups.len(), failed_tasks, "job finished");

        Ok(RunOutcome::Finished { groups })
    }
}

async fn fail(lifecycle: &mut Lifecycle<'_>, reason: String) -> Result<RunOutcome> {
    lifecycle.fail(&reason).await?;
    Ok(RunOutcome::Failed { reason })
}
