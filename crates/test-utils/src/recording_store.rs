use std::sync::{Arc, Mutex};

use buildagent::errors::AgentError;
use buildagent::store::{MemoryStore, Store, StoreFuture};
use buildagent::types::RecordId;
use serde_json::Value;

/// A store wrapper that:
/// - forwards everything to an inner `MemoryStore`
/// - records every merge patch, in write order
/// - can be told to reject `create`, to model an unreachable store.
#[derive(Clone)]
pub struct RecordingStore {
    inner: MemoryStore,
    merges: Arc<Mutex<Vec<(RecordId, Value)>>>,
    fail_creates: bool,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            merges: Arc::new(Mutex::new(Vec::new())),
            fail_creates: false,
        }
    }

    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn merges(&self) -> Vec<(RecordId, Value)> {
        self.merges.lock().unwrap().clone()
    }

    /// The `state` values written to `id`, in order.
    pub fn states_written(&self, id: &RecordId) -> Vec<String> {
        self.merges()
            .into_iter()
            .filter(|(target, _)| target == id)
            .filter_map(|(_, patch)| patch.get("state").and_then(Value::as_str).map(String::from))
            .collect()
    }
}

impl Store for RecordingStore {
    fn get<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Value>> {
        self.inner.get(id)
    }

    fn merge<'a>(&'a self, id: &'a RecordId, patch: Value) -> StoreFuture<'a, Value> {
        self.merges.lock().unwrap().push((id.clone(), patch.clone()));
        self.inner.merge(id, patch)
    }

    fn create<'a>(&'a self, table: &'a str, record: Value) -> StoreFuture<'a, RecordId> {
        if self.fail_creates {
            return Box::pin(async move {
                Err(AgentError::Other(anyhow::anyhow!("store rejected create in {table}")))
            });
        }
        self.inner.create(table, record)
    }

    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, bool> {
        self.inner.delete(id)
    }

    fn list<'a>(&'a self, table: &'a str) -> StoreFuture<'a, Vec<Value>> {
        self.inner.list(table)
    }
}
