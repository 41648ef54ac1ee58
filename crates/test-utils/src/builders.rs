#![allow(dead_code)]

use buildagent::job::{Job, JobState, Pipeline, Task, TaskGroup};
use buildagent::store::MemoryStore;
use buildagent::types::RecordId;
use serde_json::json;

/// Builder for `Task` to simplify test setup.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// A task running `command` with no arguments. The id is `task:<id>` and
    /// the label defaults to `id`.
    pub fn new(id: &str, command: &str) -> Self {
        Self {
            task: Task {
                id: RecordId::new("task", id),
                label: id.to_string(),
                order: 0,
                command: command.to_string(),
                arguments: vec![],
                command_line: None,
                working_directory: None,
                command_timeout: None,
                freeze_before_run: false,
                freeze_after_run: false,
            },
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.task.label = label.to_string();
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.task.order = order;
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.task.arguments.push(arg.to_string());
        self
    }

    pub fn command_line(mut self, line: &str) -> Self {
        self.task.command_line = Some(line.to_string());
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.task.command_timeout = Some(ms);
        self
    }

    pub fn freeze_before(mut self) -> Self {
        self.task.freeze_before_run = true;
        self
    }

    pub fn freeze_after(mut self) -> Self {
        self.task.freeze_after_run = true;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `TaskGroup`.
pub struct TaskGroupBuilder {
    group: TaskGroup,
}

impl TaskGroupBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            group: TaskGroup {
                id: RecordId::new("taskGroup", id),
                label: id.to_string(),
                order: 0,
                tasks: vec![],
            },
        }
    }

    pub fn order(mut self, order: i64) -> Self {
        self.group.order = order;
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.group.tasks.push(task);
        self
    }

    pub fn build(self) -> TaskGroup {
        self.group
    }
}

/// Builder for `Job`.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            job: Job {
                id: RecordId::new("pipelineJob", id),
                label: id.to_string(),
                task_groups: vec![],
            },
        }
    }

    pub fn group(mut self, group: TaskGroup) -> Self {
        self.job.task_groups.push(group);
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn pipeline(id: &str) -> Pipeline {
    Pipeline {
        id: RecordId::new("pipeline", id),
        label: id.to_string(),
        sources: vec![],
    }
}

/// Seeds a job instance record and, optionally, the records it references.
///
/// References can also be left dangling (`pipeline_ref` / `job_ref`) to
/// model records that were deleted or never written.
pub struct InstanceSeed {
    id: RecordId,
    pipeline: Option<Pipeline>,
    job: Option<Job>,
    pipeline_ref: Option<RecordId>,
    job_ref: Option<RecordId>,
    state: Option<JobState>,
}

impl InstanceSeed {
    pub fn new(id: &str) -> Self {
        Self {
            id: RecordId::new("jobInstance", id),
            pipeline: None,
            job: None,
            pipeline_ref: None,
            job_ref: None,
            state: None,
        }
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline_ref = Some(pipeline.id.clone());
        self.pipeline = Some(pipeline);
        self
    }

    pub fn job(mut self, job: Job) -> Self {
        self.job_ref = Some(job.id.clone());
        self.job = Some(job);
        self
    }

    pub fn dangling_pipeline(mut self, id: &str) -> Self {
        self.pipeline = None;
        self.pipeline_ref = Some(RecordId::from(id));
        self
    }

    pub fn dangling_job(mut self, id: &str) -> Self {
        self.job = None;
        self.job_ref = Some(RecordId::from(id));
        self
    }

    pub fn state(mut self, state: JobState) -> Self {
        self.state = Some(state);
        self
    }

    /// Write everything into `store` and return the instance identity.
    pub fn insert(self, store: &MemoryStore) -> anyhow::Result<RecordId> {
        if let Some(pipeline) = &self.pipeline {
            store.insert(pipeline.id.clone(), serde_json::to_value(pipeline)?)?;
        }
        if let Some(job) = &self.job {
            store.insert(job.id.clone(), serde_json::to_value(job)?)?;
        }

        let mut record = json!({
            "pipeline": self.pipeline_ref,
            "job": self.job_ref,
        });
        if let Some(state) = self.state {
            record["state"] = json!(state);
        }
        store.insert(self.id.clone(), record)?;

        Ok(self.id)
    }
}
