// src/source/mod.rs

//! Source preparation before any task group runs.
//!
//! The orchestrator awaits a [`SourceResolver`] with the resolved pipeline and
//! job, and does not look at anything beyond whether it completed.
//!
//! - [`git`] shallow-clones the pipeline's configured repositories.
//! - [`NoopSourceResolver`] prepares nothing.

pub mod git;

use crate::errors::Result;
use crate::job::{Job, Pipeline};
use crate::types::BoxFuture;

pub use git::GitSourceResolver;

pub trait SourceResolver: Send + Sync {
    fn resolve<'a>(&'a self, pipeline: &'a Pipeline, job: &'a Job) -> BoxFuture<'a, Result<()>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSourceResolver;

impl SourceResolver for NoopSourceResolver {
    fn resolve<'a>(&'a self, _pipeline: &'a Pipeline, _job: &'a Job) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}
