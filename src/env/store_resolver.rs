// src/env/store_resolver.rs

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{EnvironmentResolver, TaskScope};
use crate::errors::Result;
use crate::job::EnvironmentVariable;
use crate::store::{Store, tables};
use crate::types::{BoxFuture, EnvVar};

/// Resolves a task's environment from `environmentVariable` records.
///
/// Variables scoped to the pipeline come first, then the job, then the task,
/// so the most specific definition wins once flattened. Within one scope the
/// store's listing order is kept.
#[derive(Clone)]
pub struct StoreEnvironmentResolver {
    store: Arc<dyn Store>,
}

impl StoreEnvironmentResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl EnvironmentResolver for StoreEnvironmentResolver {
    fn resolve<'a>(&'a self, scope: &'a TaskScope) -> BoxFuture<'a, Result<Vec<EnvVar>>> {
        Box::pin(async move {
            let records = self.store.list(tables::ENVIRONMENT_VARIABLE).await?;
            let variables: Vec<EnvironmentVariable> =
                records.into_iter().filter_map(decode_variable).collect();

            let mut resolved = Vec::new();
            for level in [&scope.pipeline, &scope.job, &scope.task] {
                resolved.extend(
                    variables
                        .iter()
                        .filter(|v| &v.scope == level)
                        .map(|v| EnvVar::new(v.key.clone(), v.value.clone())),
                );
            }

            debug!(task = %scope.task, count = resolved.len(), "resolved task environment");
            Ok(resolved)
        })
    }
}

fn decode_variable(value: Value) -> Option<EnvironmentVariable> {
    let id = value.get("id").cloned();
    match serde_json::from_value(value) {
        Ok(var) => Some(var),
        Err(e) => {
            warn!(record = ?id, error = %e, "skipping malformed environment variable record");
            None
        }
    }
}
