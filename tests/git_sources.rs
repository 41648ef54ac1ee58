// tests/git_sources.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use buildagent::job::{Job, Pipeline, SourceSpec};
use buildagent::source::{GitSourceResolver, SourceResolver};
use buildagent::types::RecordId;
use buildagent_test_utils::fake_executor::FakeProcessExecutor;
use buildagent_test_utils::init_tracing;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn pipeline_with(sources: Vec<SourceSpec>) -> Pipeline {
    Pipeline {
        id: RecordId::from("pipeline:p"),
        label: "p".to_string(),
        sources,
    }
}

fn job() -> Job {
    Job {
        id: RecordId::from("pipelineJob:j"),
        label: "j".to_string(),
        task_groups: vec![],
    }
}

fn source(url: &str, directory: &str) -> SourceSpec {
    SourceSpec {
        url: url.to_string(),
        branch: None,
        directory: PathBuf::from(directory),
    }
}

#[tokio::test]
async fn clones_missing_checkouts_and_skips_existing_ones() -> TestResult {
    init_tracing();

    let workspace = TempDir::new()?;
    std::fs::create_dir(workspace.path().join("present"))?;
    let executor = FakeProcessExecutor::new();
    let resolver = GitSourceResolver::new(workspace.path(), Arc::new(executor.clone()));
    let pipeline = pipeline_with(vec![
        source("https://example.com/app.git", "app"),
        source("https://example.com/present.git", "present"),
    ]);

    resolver.resolve(&pipeline, &job()).await?;

    let specs = executor.specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].program, "git");
    assert_eq!(
        specs[0].arguments.last().map(PathBuf::from),
        Some(workspace.path().join("app"))
    );
    Ok(())
}

#[tokio::test]
async fn clone_failure_is_an_error() -> TestResult {
    init_tracing();

    let workspace = TempDir::new()?;
    let executor = FakeProcessExecutor::new().failing("git");
    let resolver = GitSourceResolver::new(workspace.path(), Arc::new(executor));
    let pipeline = pipeline_with(vec![source("https://example.com/app.git", "app")]);

    let err = resolver.resolve(&pipeline, &job()).await.unwrap_err();
    assert!(err.to_string().contains("https://example.com/app.git"));
    Ok(())
}

#[tokio::test]
async fn escaping_directories_are_refused_before_cloning() -> TestResult {
    init_tracing();

    let workspace = TempDir::new()?;
    let executor = FakeProcessExecutor::new();
    let resolver = GitSourceResolver::new(workspace.path(), Arc::new(executor.clone()));
    let pipeline = pipeline_with(vec![source("https://example.com/app.git", "../outside")]);

    assert!(resolver.resolve(&pipeline, &job()).await.is_err());
    assert!(executor.events().is_empty());
    Ok(())
}
