// tests/end_to_end.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use buildagent::build_orchestrator;
use buildagent::config::AgentConfig;
use buildagent::engine::RunOutcome;
use buildagent::store::{JsonFileStore, Store};
use buildagent::types::RecordId;
use buildagent_test_utils::{init_tracing, with_timeout};
use serde_json::json;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn runs_a_job_from_a_store_file_with_real_processes() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let work = dir.path().join("work");
    std::fs::create_dir(&work)?;
    let store_path = dir.path().join("store.json");

    let store_doc = json!({
        "jobInstance:1": { "id": "jobInstance:1", "pipeline": "pipeline:p", "job": "pipelineJob:j" },
        "pipeline:p": { "id": "pipeline:p", "label": "main" },
        "pipelineJob:j": {
            "id": "pipelineJob:j",
            "label": "build",
            "taskGroups": [
                { "id": "taskGroup:g", "label": "g", "order": 0, "tasks": [
                    { "id": "task:write", "label": "write", "order": 0,
                      "command": "sh", "arguments": ["-c", "echo \"$TARGET\" > out.txt"],
                      "workingDirectory": work },
                    { "id": "task:fail", "label": "fail", "order": 1,
                      "commandLine": "sh -c 'exit 7'" },
                    { "id": "task:append", "label": "append", "order": 2,
                      "commandLine": "sh -c 'echo done >> out.txt'",
                      "workingDirectory": work }
                ]}
            ]
        },
        "environmentVariable:1": { "id": "environmentVariable:1", "key": "TARGET", "value": "release", "scope": "pipeline:p" }
    });
    std::fs::write(&store_path, serde_json::to_vec_pretty(&store_doc)?)?;

    let cfg = AgentConfig {
        freeze_poll_interval: Duration::from_millis(20),
        inherit_environment: true,
        store_path: store_path.clone(),
        sources_workspace: dir.path().join("sources"),
    };
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&store_path));
    let orchestrator = build_orchestrator(&cfg, Arc::clone(&store));

    let id = RecordId::from("jobInstance:1");
    let outcome = with_timeout(orchestrator.run(&id)).await?;

    let RunOutcome::Finished { groups } = outcome else {
        panic!("expected finished, got {outcome:?}");
    };
    assert_eq!(groups[0].failed_tasks(), 1);

    let written = std::fs::read_to_string(work.join("out.txt"))?;
    assert_eq!(written, "release\ndone\n");

    let record = store.get(&id).await?.expect("instance still exists");
    assert_eq!(record["state"], "finished");
    Ok(())
}
