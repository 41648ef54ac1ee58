// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the programs defined in
//! tasks, using `tokio::process::Command`.
//!
//! - [`process`] defines the [`ProcessSpec`] input and [`ExecOutcome`] result.
//! - [`task_runner`] spawns and waits on a single process, enforcing timeouts.
//! - [`backend`] provides the [`ProcessExecutor`] trait and the concrete
//!   [`RealProcessExecutor`] used in production, which tests replace with a
//!   fake implementation.

pub mod backend;
pub mod process;
pub mod task_runner;

pub use backend::{ProcessExecutor, RealProcessExecutor};
pub use process::{ExecFailure, ExecOutcome, ProcessOutput, ProcessSpec};
