// src/store/records.rs

//! In-memory record table shared by the store backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AgentError, Result};
use crate::types::RecordId;

/// All records keyed by identity. Each record is a JSON object carrying its
/// own `id` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Records {
    records: BTreeMap<RecordId, Map<String, Value>>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RecordId) -> Option<Value> {
        self.records.get(id).cloned().map(Value::Object)
    }

    /// Insert or replace a record under an explicit identity.
    pub fn put(&mut self, id: RecordId, record: Value) -> Result<Value> {
        let mut fields = into_object(&id, record)?;
        fields.insert("id".to_string(), Value::String(id.to_string()));
        self.records.insert(id, fields.clone());
        Ok(Value::Object(fields))
    }

    /// Shallow-merge `patch` into an existing record.
    ///
    /// Fields absent from the patch are left untouched; the `id` field cannot
    /// be overwritten.
    pub fn merge(&mut self, id: &RecordId, patch: Value) -> Result<Value> {
        let patch = into_object(id, patch)?;
        let fields = self
            .records
            .get_mut(id)
            .ok_or_else(|| AgentError::RecordNotFound(id.clone()))?;

        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            fields.insert(key, value);
        }

        Ok(Value::Object(fields.clone()))
    }

    /// Store `record` under a freshly generated identity in `table`.
    pub fn create(&mut self, table: &str, record: Value) -> Result<RecordId> {
        let id = RecordId::generate(table);
        self.put(id.clone(), record)?;
        Ok(id)
    }

    pub fn delete(&mut self, id: &RecordId) -> bool {
        self.records.remove(id).is_some()
    }

    /// All records of a table, ordered by identity.
    pub fn list(&self, table: &str) -> Vec<Value> {
        self.records
            .iter()
            .filter(|(id, _)| id.table() == table)
            .map(|(_, fields)| Value::Object(fields.clone()))
            .collect()
    }
}

fn into_object(id: &RecordId, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AgentError::MalformedRecord {
            id: id.clone(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}
