// src/exec/backend.rs

//! Pluggable process executor abstraction.
//!
//! The group runner and the source resolver talk to a [`ProcessExecutor`]
//! instead of spawning processes themselves. This makes it easy to swap in a
//! fake executor in tests while keeping the production implementation in
//! [`task_runner`](super::task_runner).

use crate::types::BoxFuture;

use super::process::{ExecOutcome, ProcessSpec};
use super::task_runner::run_process;

/// Trait abstracting how a single program is executed.
///
/// Implementations must never panic or return early on failure: every
/// problem (spawn error, non-zero exit, timeout) is reported through the
/// returned [`ExecOutcome`].
pub trait ProcessExecutor: Send + Sync {
    fn execute<'a>(&'a self, spec: ProcessSpec) -> BoxFuture<'a, ExecOutcome>;
}

/// Executor backed by `tokio::process`.
#[derive(Debug, Clone, Copy)]
pub struct RealProcessExecutor {
    inherit_env: bool,
}

impl RealProcessExecutor {
    /// `inherit_env` controls whether the resolved environment is merged over
    /// the agent's own environment (`true`) or replaces it (`false`).
    pub fn new(inherit_env: bool) -> Self {
        Self { inherit_env }
    }
}

impl Default for RealProcessExecutor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProcessExecutor for RealProcessExecutor {
    fn execute<'a>(&'a self, spec: ProcessSpec) -> BoxFuture<'a, ExecOutcome> {
        let inherit_env = self.inherit_env;
        Box::pin(async move { run_process(&spec, inherit_env).await })
    }
}
