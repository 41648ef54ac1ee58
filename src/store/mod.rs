// src/store/mod.rs

//! Persisted-record store abstraction.
//!
//! The agent talks to its shared document store through the narrow [`Store`]
//! trait so the orchestration logic never depends on a concrete backend.
//!
//! - [`memory`] keeps records in process memory (tests, embedding).
//! - [`file`] keeps records in one JSON document on disk.
//! - [`records`] is the record table both backends are built on.
//!
//! [`resolve_job_instance`] implements the "fetch with expansion" read the
//! orchestrator starts from.

pub mod file;
pub mod memory;
pub mod records;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AgentError, Result};
use crate::job::{Job, JobInstance, Pipeline};
use crate::types::{BoxFuture, RecordId};

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use records::Records;

/// Table names used by the agent.
pub mod tables {
    pub const JOB_INSTANCE: &str = "jobInstance";
    pub const PIPELINE: &str = "pipeline";
    pub const JOB: &str = "pipelineJob";
    pub const TASK_FREEZE_POINT: &str = "taskFreezePoint";
    pub const ENVIRONMENT_VARIABLE: &str = "environmentVariable";
}

pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Minimal document-store interface.
///
/// Records are JSON objects that always carry their own `id` field.
pub trait Store: Send + Sync {
    /// Current record, or `None` when it does not exist.
    fn get<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Value>>;

    /// Apply the fields of `patch` onto an existing record and return the
    /// merged result. Unspecified fields are preserved.
    fn merge<'a>(&'a self, id: &'a RecordId, patch: Value) -> StoreFuture<'a, Value>;

    /// Persist `record` under a freshly generated identity in `table`.
    fn create<'a>(&'a self, table: &'a str, record: Value) -> StoreFuture<'a, RecordId>;

    /// Remove a record. Returns whether it existed.
    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, bool>;

    /// All records of `table`.
    fn list<'a>(&'a self, table: &'a str) -> StoreFuture<'a, Vec<Value>>;
}

/// A job instance with its pipeline and job resolved inline.
#[derive(Debug, Clone)]
pub struct ResolvedJobInstance {
    pub instance: JobInstance,
    pub pipeline: Option<Pipeline>,
    pub job: Option<Job>,
    /// Decode errors of referenced records that exist but could not be read,
    /// keyed by part name.
    pub malformed: Vec<(&'static str, String)>,
}

impl ResolvedJobInstance {
    /// Names of the references that could not be resolved, in
    /// `pipeline, job` order.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.pipeline.is_none() {
            missing.push("pipeline");
        }
        if self.job.is_none() {
            missing.push("job");
        }
        missing
    }

    /// `Failed to resolve [..]` naming the missing parts, followed by any
    /// decode errors. `None` when both parts resolved.
    pub fn failure_reason(&self) -> Option<String> {
        let missing = self.missing_parts();
        if missing.is_empty() {
            return None;
        }

        let mut reason = format!("Failed to resolve [{}]", missing.join(", "));
        if !self.malformed.is_empty() {
            let details: Vec<String> = self
                .malformed
                .iter()
                .map(|(part, error)| format!("{part}: {error}"))
                .collect();
            reason.push_str(": ");
            reason.push_str(&details.join("; "));
        }
        Some(reason)
    }
}

/// Read the job instance `id` and expand its `pipeline` and `job` references.
///
/// Returns `Ok(None)` when the instance itself does not exist. Dangling or
/// absent references resolve to `None` in the corresponding field, and so do
/// references whose record cannot be decoded (the error is kept in
/// `malformed`). A malformed instance record is an error.
pub async fn resolve_job_instance(
    store: &dyn Store,
    id: &RecordId,
) -> Result<Option<ResolvedJobInstance>> {
    let Some(instance) = fetch::<JobInstance>(store, id).await? else {
        return Ok(None);
    };

    let mut malformed = Vec::new();
    let pipeline =
        fetch_part::<Pipeline>(store, "pipeline", instance.pipeline.as_ref(), &mut malformed)
            .await?;
    let job = fetch_part::<Job>(store, "job", instance.job.as_ref(), &mut malformed).await?;

    debug!(
        job_instance = %id,
        pipeline = pipeline.is_some(),
        job = job.is_some(),
        malformed = malformed.len(),
        "resolved job instance"
    );

    Ok(Some(ResolvedJobInstance {
        instance,
        pipeline,
        job,
        malformed,
    }))
}

async fn fetch_part<T: DeserializeOwned>(
    store: &dyn Store,
    part: &'static str,
    reference: Option<&RecordId>,
    malformed: &mut Vec<(&'static str, String)>,
) -> Result<Option<T>> {
    let Some(reference) = reference else {
        return Ok(None);
    };
    match fetch::<T>(store, reference).await {
        Ok(found) => Ok(found),
        Err(AgentError::MalformedRecord { id, reason }) => {
            warn!(record = %id, %reason, "referenced {part} record is malformed");
            malformed.push((part, reason));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read a record and decode it into `T`.
pub async fn fetch<T: DeserializeOwned>(store: &dyn Store, id: &RecordId) -> Result<Option<T>> {
    match store.get(id).await? {
        Some(value) => decode(id, value).map(Some),
        None => Ok(None),
    }
}

/// Decode a raw record, attributing failures to its identity.
pub fn decode<T: DeserializeOwned>(id: &RecordId, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AgentError::MalformedRecord {
        id: id.clone(),
        reason: e.to_string(),
    })
}
