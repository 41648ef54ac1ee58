// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod freeze;
pub mod job;
pub mod logging;
pub mod source;
pub mod store;
pub mod types;

use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::command::parse_command;
use crate::config::{AgentConfig, load_for_cli};
use crate::engine::{JobOrchestrator, RunOutcome, TaskGroupRunner, TaskStatus};
use crate::env::StoreEnvironmentResolver;
use crate::exec::{ProcessExecutor, RealProcessExecutor};
use crate::freeze::FreezeGate;
use crate::source::GitSourceResolver;
use crate::store::{JsonFileStore, Store};
use crate::types::RecordId;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the JSON file store
/// - environment resolver / source resolver / process executor
/// - the job orchestrator
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_for_cli(args.config.as_deref())?;
    if let Some(store_path) = args.store {
        cfg.store_path = store_path;
    }
    debug!(?cfg, "loaded agent config");

    match args.command {
        Command::Run { instance } => run_instance(&cfg, &instance).await,
        Command::Parse { command_line } => {
            let parsed = parse_command(&command_line)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            Ok(())
        }
        Command::FreezePoints { instance } => list_freeze_points(&cfg, instance.as_deref()).await,
        Command::Resume { freeze_point } => {
            let store = JsonFileStore::new(&cfg.store_path);
            let id: RecordId = freeze_point.parse().map_err(|e: String| anyhow!(e))?;
            if !freeze::release(&store, &id).await? {
                bail!("no freeze point {id}");
            }
            println!("released {id}");
            Ok(())
        }
        Command::Check => {
            print_config(&cfg);
            Ok(())
        }
    }
}

/// Build an orchestrator over `store` using the production collaborators.
pub fn build_orchestrator(cfg: &AgentConfig, store: Arc<dyn Store>) -> JobOrchestrator {
    let executor: Arc<dyn ProcessExecutor> =
        Arc::new(RealProcessExecutor::new(cfg.inherit_environment));
    let environment = Arc::new(StoreEnvironmentResolver::new(Arc::clone(&store)));
    let sources = Arc::new(GitSourceResolver::new(
        cfg.sources_workspace.clone(),
        Arc::clone(&executor),
    ));
    let gate = FreezeGate::new(Arc::clone(&store), cfg.freeze_poll_interval);
    let runner = TaskGroupRunner::new(environment, executor, gate);

    JobOrchestrator::new(store, sources, runner)
}

async fn run_instance(cfg: &AgentConfig, instance: &str) -> Result<()> {
    let id: RecordId = instance.parse().map_err(|e: String| anyhow!(e))?;
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&cfg.store_path));
    let orchestrator = build_orchestrator(cfg, store);

    match orchestrator.run(&id).await? {
        RunOutcome::Finished { groups } => {
            for group in &groups {
                for task in &group.tasks {
                    if let TaskStatus::Failed { reason } = &task.status {
                        info!(group = %group.label, task = %task.label, %reason, "task failed during run");
                    }
                }
            }
            Ok(())
        }
        RunOutcome::Failed { reason } => Err(anyhow!("job instance {id} failed: {reason}")),
    }
}

async fn list_freeze_points(cfg: &AgentConfig, instance: Option<&str>) -> Result<()> {
    let store = JsonFileStore::new(&cfg.store_path);
    let instance = instance.map(RecordId::from);
    let points = freeze::frozen_groups(&store, instance.as_ref()).await?;

    if points.is_empty() {
        println!("no freeze points");
        return Ok(());
    }

    for point in points {
        let id = point.id.as_ref().map(RecordId::as_str).unwrap_or("?");
        println!("{id}");
        println!("    job instance: {}", point.job_instance);
        println!("    task group:   {}", point.task_group);
        if let Some(task) = &point.task {
            println!("    task:         {task}");
        }
        if let Some(position) = point.position {
            println!("    position:     {position:?}");
        }
    }
    Ok(())
}

fn print_config(cfg: &AgentConfig) {
    println!("buildagent config");
    println!("  agent.freeze_poll_interval = {:?}", cfg.freeze_poll_interval);
    println!("  agent.inherit_environment = {}", cfg.inherit_environment);
    println!("  store.path = {}", cfg.store_path.display());
    println!("  sources.workspace = {}", cfg.sources_workspace.display());
}
