// src/env/mod.rs

//! Per-task environment resolution.
//!
//! Before a task runs, the group runner asks an [`EnvironmentResolver`] for
//! the ordered key/value pairs to export into the task's process. The pairs
//! are flattened with [`flatten`]; a later pair overwrites an earlier one with
//! the same key.
//!
//! - [`store_resolver`] resolves variables defined as store records scoped to
//!   the pipeline, job or task.
//! - [`StaticEnvironmentResolver`] serves fixed pairs (tests, local runs).

pub mod store_resolver;

use std::collections::{BTreeMap, HashMap};

use crate::errors::Result;
use crate::types::{BoxFuture, EnvVar, RecordId};

pub use store_resolver::StoreEnvironmentResolver;

/// The identities a task's environment may depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScope {
    pub pipeline: RecordId,
    pub job: RecordId,
    pub task: RecordId,
}

pub trait EnvironmentResolver: Send + Sync {
    /// Ordered environment pairs for the task in `scope`.
    fn resolve<'a>(&'a self, scope: &'a TaskScope) -> BoxFuture<'a, Result<Vec<EnvVar>>>;
}

/// Flatten ordered pairs into a mapping; later duplicates win.
pub fn flatten(vars: Vec<EnvVar>) -> BTreeMap<String, String> {
    vars.into_iter().map(|v| (v.key, v.value)).collect()
}

/// Resolver returning the same shared pairs for every task, followed by any
/// pairs registered for that specific task.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironmentResolver {
    shared: Vec<EnvVar>,
    per_task: HashMap<RecordId, Vec<EnvVar>>,
}

impl StaticEnvironmentResolver {
    pub fn new(shared: Vec<EnvVar>) -> Self {
        Self {
            shared,
            per_task: HashMap::new(),
        }
    }

    pub fn with_task(mut self, task: impl Into<RecordId>, vars: Vec<EnvVar>) -> Self {
        self.per_task.entry(task.into()).or_default().extend(vars);
        self
    }
}

impl EnvironmentResolver for StaticEnvironmentResolver {
    fn resolve<'a>(&'a self, scope: &'a TaskScope) -> BoxFuture<'a, Result<Vec<EnvVar>>> {
        Box::pin(async move {
            let mut vars = self.shared.clone();
            if let Some(task_vars) = self.per_task.get(&scope.task) {
                vars.extend(task_vars.iter().cloned());
            }
            Ok(vars)
        })
    }
}
