// src/engine/group_runner.rs

//! Task group execution.
//!
//! All groups of a job fan out concurrently; the tasks inside one group run
//! strictly one after another. A failing task is logged and recorded in the
//! group's report, and the next task runs regardless.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::command::{CommandError, parse_command};
use crate::env::{EnvironmentResolver, TaskScope, flatten};
use crate::errors::{AgentError, Result};
use crate::exec::{ProcessExecutor, ProcessSpec};
use crate::freeze::FreezeGate;
use crate::job::{FreezePosition, Task, TaskFreezePoint, TaskGroup};
use crate::types::RecordId;

/// Identities shared by every task of one job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub job_instance: RecordId,
    pub pipeline: RecordId,
    pub job: RecordId,
}

/// How a single task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Succeeded { exit_code: i32 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: RecordId,
    pub label: String,
    pub status: TaskStatus,
}

/// Per-group result. A group always completes, whatever its tasks did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group: RecordId,
    pub label: String,
    pub order: i64,
    /// In execution order.
    pub tasks: Vec<TaskReport>,
}

impl GroupReport {
    pub fn failed_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Failed { .. }))
            .count()
    }
}

#[derive(Clone)]
pub struct TaskGroupRunner {
    environment: Arc<dyn EnvironmentResolver>,
    executor: Arc<dyn ProcessExecutor>,
    freeze_gate: FreezeGate,
}

impl TaskGroupRunner {
    pub fn new(
        environment: Arc<dyn EnvironmentResolver>,
        executor: Arc<dyn ProcessExecutor>,
        freeze_gate: FreezeGate,
    ) -> Self {
        Self {
            environment,
            executor,
            freeze_gate,
        }
    }

    /// Run every group concurrently and wait for all of them.
    ///
    /// Groups are started in ascending `order` (ties keep their original
    /// position); the order says nothing about when they finish. Reports are
    /// returned in start order. If any group aborts, the first error is
    /// returned once all groups are done.
    pub async fn run_groups(&self, groups: &[TaskGroup], ctx: &RunContext) -> Result<Vec<GroupReport>> {
        let mut ordered = groups.to_vec();
        ordered.sort_by_key(|g| g.order);

        let mut set = JoinSet::new();
        for (index, group) in ordered.into_iter().enumerate() {
            debug!(group = %group.id, label = %group.label, order = group.order, "starting task group");
            let runner = self.clone();
            let ctx = ctx.clone();
            set.spawn(async move { (index, runner.run_group(group, &ctx).await) });
        }

        let mut reports = Vec::new();
        let mut first_error = None;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(report))) => reports.push((index, report)),
                Ok((_, Err(e))) => {
                    error!(error = %e, "task group aborted");
                    first_error.get_or_insert(e);
                }
                Err(join_err) => {
                    error!(error = %join_err, "task group panicked");
                    first_error.get_or_insert(AgentError::Other(anyhow!(
                        "task group panicked: {join_err}"
                    )));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        reports.sort_by_key(|(index, _)| *index);
        Ok(reports.into_iter().map(|(_, report)| report).collect())
    }

    /// Run the tasks of one group in ascending `order`, one at a time.
    ///
    /// Only a freeze point that cannot be recorded aborts the group.
    pub async fn run_group(&self, group: TaskGroup, ctx: &RunContext) -> Result<GroupReport> {
        let mut tasks = group.tasks.clone();
        tasks.sort_by_key(|t| t.order);

        info!(group = %group.label, tasks = tasks.len(), "running task group");

        let mut reports = Vec::with_capacity(tasks.len());
        for task in &tasks {
            reports.push(self.run_task(&group, task, ctx).await?);
        }

        let report = GroupReport {
            group: group.id.clone(),
            label: group.label.clone(),
            order: group.order,
            tasks: reports,
        };

        info!(
            group = %group.label,
            failed = report.failed_tasks(),
            "task group completed"
        );
        Ok(report)
    }

    async fn run_task(&self, group: &TaskGroup, task: &Task, ctx: &RunContext) -> Result<TaskReport> {
        let scope = TaskScope {
            pipeline: ctx.pipeline.clone(),
            job: ctx.job.clone(),
            task: task.id.clone(),
        };
        let environment = self.environment.resolve(&scope).await;

        if task.freeze_before_run {
            info!(
                group = %group.label,
                task = %task.label,
                "Encountered freeze marker in task group {} before task {}",
                group.label,
                task.label
            );
            self.freeze(group, task, ctx, FreezePosition::Before).await?;
            info!(group = %group.label, task = %task.label, "unfroze freeze marker before task");
        }

        let status = match environment {
            Ok(vars) => self.execute(group, task, flatten(vars)).await,
            Err(e) => {
                error!(
                    group = %group.label,
                    task = %task.label,
                    error = %e,
                    "failed to resolve task environment"
                );
                TaskStatus::Failed {
                    reason: format!("failed to resolve environment: {e}"),
                }
            }
        };

        if task.freeze_after_run {
            info!(
                group = %group.label,
                task = %task.label,
                "Encountered freeze marker in task group {} after task {}",
                group.label,
                task.label
            );
            self.freeze(group, task, ctx, FreezePosition::After).await?;
            info!(group = %group.label, task = %task.label, "unfroze freeze marker after task");
        }

        Ok(TaskReport {
            task: task.id.clone(),
            label: task.label.clone(),
            status,
        })
    }

    async fn execute(
        &self,
        group: &TaskGroup,
        task: &Task,
        environment: BTreeMap<String, String>,
    ) -> TaskStatus {
        let spec = match build_process_spec(task, environment) {
            Ok(spec) => spec,
            Err(e) => {
                error!(group = %group.label, task = %task.label, error = %e, "invalid task command");
                return TaskStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.executor.execute(spec).await {
            Ok(output) => {
                info!(
                    group = %group.label,
                    task = %task.label,
                    exit_code = output.exit_code,
                    "Task {} in group {} successfully completed",
                    task.label,
                    group.label
                );
                TaskStatus::Succeeded {
                    exit_code: output.exit_code,
                }
            }
            Err(failure) => {
                error!(
                    group = %group.label,
                    task = %task.label,
                    error = %failure,
                    "Task {} in group {} failed",
                    task.label,
                    group.label
                );
                TaskStatus::Failed {
                    reason: failure.to_string(),
                }
            }
        }
    }

    async fn freeze(
        &self,
        group: &TaskGroup,
        task: &Task,
        ctx: &RunContext,
        position: FreezePosition,
    ) -> Result<()> {
        let point = TaskFreezePoint {
            id: None,
            task_group: group.id.clone(),
            job_instance: ctx.job_instance.clone(),
            task: Some(task.id.clone()),
            position: Some(position),
        };
        self.freeze_gate.enter(&point).await?;
        Ok(())
    }
}

/// Turn a task into a process description.
///
/// A `commandLine` is tokenized and wins over `command` + `arguments`; its
/// inline assignments are layered over the resolved environment.
pub fn build_process_spec(
    task: &Task,
    mut environment: BTreeMap<String, String>,
) -> std::result::Result<ProcessSpec, CommandError> {
    let (program, arguments) = match &task.command_line {
        Some(line) => {
            let parsed = parse_command(line)?;
            environment.extend(parsed.environment);
            (parsed.program, parsed.arguments)
        }
        None => (task.command.clone(), task.arguments.clone()),
    };

    if program.trim().is_empty() {
        return Err(CommandError::NoCommand);
    }

    Ok(ProcessSpec {
        program,
        arguments,
        environment,
        working_directory: task.working_directory.clone(),
        timeout: task.timeout(),
    })
}
