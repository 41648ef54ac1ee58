// tests/json_file_store.rs

use std::error::Error;
use std::sync::Arc;

use buildagent::errors::AgentError;
use buildagent::store::{JsonFileStore, Store, resolve_job_instance, tables};
use buildagent::types::RecordId;
use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinSet;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn missing_file_reads_as_empty_store() -> TestResult {
    let dir = TempDir::new()?;
    let store = JsonFileStore::new(dir.path().join("nested/store.json"));

    assert_eq!(store.get(&RecordId::from("jobInstance:1")).await?, None);
    assert!(store.list(tables::PIPELINE).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn writes_are_visible_to_a_second_handle() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("state/store.json");
    let writer = JsonFileStore::new(&path);
    let reader = JsonFileStore::new(&path);

    let id = writer
        .create(tables::TASK_FREEZE_POINT, json!({ "taskGroup": "taskGroup:1" }))
        .await?;
    assert_eq!(id.table(), tables::TASK_FREEZE_POINT);
    assert!(path.exists());

    let record = reader.get(&id).await?.expect("record persisted");
    assert_eq!(record["taskGroup"], "taskGroup:1");
    assert_eq!(record["id"], id.as_str());

    assert!(reader.delete(&id).await?);
    assert_eq!(writer.get(&id).await?, None);
    assert!(!writer.delete(&id).await?);
    Ok(())
}

#[tokio::test]
async fn merge_preserves_unspecified_fields() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(
        &path,
        r#"{ "jobInstance:1": { "id": "jobInstance:1", "pipeline": "pipeline:p", "state": "pending" } }"#,
    )?;
    let store = JsonFileStore::new(&path);
    let id = RecordId::from("jobInstance:1");

    let merged = store
        .merge(&id, json!({ "state": "failed", "failReason": "Failed to resolve [job]" }))
        .await?;

    assert_eq!(merged["pipeline"], "pipeline:p");
    assert_eq!(merged["state"], "failed");
    assert_eq!(store.get(&id).await?, Some(merged));
    Ok(())
}

#[tokio::test]
async fn merge_into_missing_record_is_an_error() -> TestResult {
    let dir = TempDir::new()?;
    let store = JsonFileStore::new(dir.path().join("store.json"));

    let err = store
        .merge(&RecordId::from("jobInstance:ghost"), json!({ "state": "failed" }))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::RecordNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn resolves_instance_with_expansion_from_disk() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(
        &path,
        r#"{
  "jobInstance:1": { "id": "jobInstance:1", "pipeline": "pipeline:p", "job": "pipelineJob:gone" },
  "pipeline:p": { "id": "pipeline:p", "label": "main" }
}"#,
    )?;
    let store = JsonFileStore::new(&path);

    let resolved = resolve_job_instance(&store, &RecordId::from("jobInstance:1"))
        .await?
        .expect("instance exists");
    assert_eq!(resolved.pipeline.as_ref().map(|p| p.label.clone()), Some("main".to_string()));
    assert!(resolved.job.is_none());
    assert_eq!(resolved.missing_parts(), vec!["job"]);

    assert!(
        resolve_job_instance(&store, &RecordId::from("jobInstance:2"))
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn corrupt_store_file_is_reported() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json")?;
    let store = JsonFileStore::new(&path);

    let err = store.get(&RecordId::from("x:1")).await.unwrap_err();
    assert!(matches!(err, AgentError::JsonError(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_handles_on_one_file_keep_every_write() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    let first = Arc::new(JsonFileStore::new(&path));
    let second = Arc::new(JsonFileStore::new(&path));

    let mut set = JoinSet::new();
    for n in 0..50 {
        let store = if n % 2 == 0 {
            Arc::clone(&first)
        } else {
            Arc::clone(&second)
        };
        set.spawn(async move {
            store
                .create(tables::TASK_FREEZE_POINT, json!({ "taskGroup": format!("taskGroup:{n}") }))
                .await
        });
    }

    let mut created = Vec::new();
    while let Some(joined) = set.join_next().await {
        created.push(joined??);
    }

    assert_eq!(created.len(), 50);
    let on_disk = JsonFileStore::new(&path).list(tables::TASK_FREEZE_POINT).await?;
    assert_eq!(on_disk.len(), 50);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_from_one_handle_is_not_undone_by_another() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(
        &path,
        r#"{
  "taskFreezePoint:1": { "id": "taskFreezePoint:1", "taskGroup": "taskGroup:1" },
  "jobInstance:1": { "id": "jobInstance:1", "state": "building" }
}"#,
    )?;
    let agent = JsonFileStore::new(&path);
    let operator = JsonFileStore::new(&path);
    let point = RecordId::from("taskFreezePoint:1");
    let instance = RecordId::from("jobInstance:1");

    let (deleted, merged) = tokio::join!(
        operator.delete(&point),
        agent.merge(&instance, json!({ "state": "sealing" })),
    );
    assert!(deleted?);
    merged?;

    assert_eq!(agent.get(&point).await?, None);
    let record = operator.get(&instance).await?.expect("instance kept");
    assert_eq!(record["state"], "sealing");
    Ok(())
}
