// src/source/git.rs

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use super::SourceResolver;
use crate::errors::{AgentError, Result};
use crate::exec::{ProcessExecutor, ProcessSpec};
use crate::job::{Job, Pipeline, SourceSpec};
use crate::types::BoxFuture;

/// Clones each of the pipeline's sources with `git clone --depth 1` under a
/// workspace directory.
///
/// Checkouts whose directory already exists are left alone, so a rerun on the
/// same machine does not fail on a populated workspace.
#[derive(Clone)]
pub struct GitSourceResolver {
    workspace: PathBuf,
    executor: Arc<dyn ProcessExecutor>,
}

impl GitSourceResolver {
    pub fn new(workspace: impl Into<PathBuf>, executor: Arc<dyn ProcessExecutor>) -> Self {
        Self {
            workspace: workspace.into(),
            executor,
        }
    }

    /// Arguments for `git` that fetch `source` into `target`.
    pub fn clone_arguments(source: &SourceSpec, target: &Path) -> Vec<String> {
        let mut args = vec!["clone".to_string(), "--depth".to_string(), "1".to_string()];
        if let Some(branch) = &source.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args.push(source.url.clone());
        args.push(target.to_string_lossy().into_owned());
        args
    }

    async fn fetch_source(&self, source: &SourceSpec) -> Result<()> {
        let target = checkout_path(&self.workspace, &source.directory)?;

        if tokio::fs::try_exists(&target).await? {
            info!(url = %source.url, target = ?target, "source directory exists; skipping clone");
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.workspace).await?;

        let spec = ProcessSpec::new("git").args(Self::clone_arguments(source, &target));
        match self.executor.execute(spec).await {
            Ok(_) => {
                info!(url = %source.url, target = ?target, "cloned source");
                Ok(())
            }
            Err(failure) => {
                warn!(url = %source.url, error = %failure, "failed to clone source");
                Err(AgentError::Other(anyhow!(
                    "failed to fetch source {}: {failure}",
                    source.url
                )))
            }
        }
    }
}

impl SourceResolver for GitSourceResolver {
    fn resolve<'a>(&'a self, pipeline: &'a Pipeline, job: &'a Job) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(
                pipeline = %pipeline.id,
                job = %job.id,
                sources = pipeline.sources.len(),
                "resolving sources"
            );
            for source in &pipeline.sources {
                self.fetch_source(source).await?;
            }
            Ok(())
        })
    }
}

/// Join a source directory onto the workspace, refusing paths that would
/// escape it.
fn checkout_path(workspace: &Path, directory: &Path) -> Result<PathBuf> {
    let escapes = directory.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || directory.as_os_str().is_empty() {
        return Err(AgentError::ConfigError(format!(
            "source directory {:?} must be a relative path inside the workspace",
            directory
        )));
    }
    Ok(workspace.join(directory))
}
