// src/store/memory.rs

use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::records::Records;
use super::{Store, StoreFuture};
use crate::errors::{AgentError, Result};
use crate::types::RecordId;

/// Store kept entirely in process memory.
///
/// Cloning yields another handle onto the same records, which lets tests play
/// the part of an external operator (e.g. deleting a freeze point) while the
/// agent holds its own handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record synchronously (test and seeding helper).
    pub fn insert(&self, id: impl Into<RecordId>, record: Value) -> Result<Value> {
        self.with_records(|records| records.put(id.into(), record))
    }

    /// Current copy of a record, without going through the async trait.
    pub fn snapshot(&self, id: &RecordId) -> Option<Value> {
        self.with_records(|records| Ok(records.get(id))).ok().flatten()
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut Records) -> Result<T>) -> Result<T> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| AgentError::Other(anyhow::anyhow!("memory store lock poisoned")))?;
        f(&mut guard)
    }
}

impl Store for MemoryStore {
    fn get<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.with_records(|records| Ok(records.get(id))) })
    }

    fn merge<'a>(&'a self, id: &'a RecordId, patch: Value) -> StoreFuture<'a, Value> {
        Box::pin(async move { self.with_records(|records| records.merge(id, patch)) })
    }

    fn create<'a>(&'a self, table: &'a str, record: Value) -> StoreFuture<'a, RecordId> {
        Box::pin(async move { self.with_records(|records| records.create(table, record)) })
    }

    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, bool> {
        Box::pin(async move { self.with_records(|records| Ok(records.delete(id))) })
    }

    fn list<'a>(&'a self, table: &'a str) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.with_records(|records| Ok(records.list(table))) })
    }
}
