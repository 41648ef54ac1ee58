// src/engine/lifecycle.rs

//! Persisted job-instance state transitions.

use serde_json::json;
use tracing::{info, warn};

use crate::errors::{AgentError, Result};
use crate::job::JobState;
use crate::store::Store;
use crate::types::RecordId;

/// Writes state transitions for one job instance, refusing anything the
/// [`JobState`] machine does not allow.
///
/// Each write is a plain merge with no version check: a concurrent writer
/// (e.g. an operator) can be overwritten, and vice versa.
pub struct Lifecycle<'a> {
    store: &'a dyn Store,
    id: &'a RecordId,
    state: JobState,
}

impl<'a> Lifecycle<'a> {
    pub fn new(store: &'a dyn Store, id: &'a RecordId, state: JobState) -> Self {
        Self { store, id, state }
    }

    /// Move to the next state on the forward path.
    pub async fn advance(&mut self, next: JobState) -> Result<()> {
        self.check(next)?;
        self.store
            .merge(self.id, json!({ "state": next.as_str() }))
            .await?;
        info!(job_instance = %self.id, from = %self.state, to = %next, "job state changed");
        self.state = next;
        Ok(())
    }

    /// Record a terminal failure with an explanation.
    pub async fn fail(&mut self, reason: &str) -> Result<()> {
        self.check(JobState::Failed)?;
        self.store
            .merge(
                self.id,
                json!({ "state": JobState::Failed.as_str(), "failReason": reason }),
            )
            .await?;
        warn!(job_instance = %self.id, from = %self.state, reason, "job failed");
        self.state = JobState::Failed;
        Ok(())
    }

    fn check(&self, next: JobState) -> Result<()> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(AgentError::InvalidTransition {
                id: self.id.clone(),
                from: self.state,
                to: next,
            })
        }
    }
}
