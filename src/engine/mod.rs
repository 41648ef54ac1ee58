// src/engine/mod.rs

//! Job execution engine.
//!
//! This module ties together:
//! - the job-instance lifecycle writes ([`lifecycle`])
//! - the concurrent task group runner ([`group_runner`])
//! - the top-level job orchestrator ([`orchestrator`])
//!
//! Everything the engine needs from the outside world (store, environment,
//! sources, processes) comes in through traits, so tests can drive it with
//! in-memory fakes.

pub mod group_runner;
pub mod lifecycle;
pub mod orchestrator;

pub use group_runner::{GroupReport, RunContext, TaskGroupRunner, TaskReport, TaskStatus};
pub use lifecycle::Lifecycle;
pub use orchestrator::{JobOrchestrator, RunOutcome};
