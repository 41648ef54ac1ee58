// src/freeze/mod.rs

//! Freeze gates: operator-controlled pauses inside a task group.
//!
//! Entering a gate persists a `taskFreezePoint` record correlated with the
//! task group and job instance, then polls the store until that record is
//! gone. The agent never removes its own freeze point; resumption always comes
//! from someone deleting the record (an operator, a dashboard,
//! `buildagent resume`). There is no upper bound on the wait.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::job::TaskFreezePoint;
use crate::store::{Store, decode, tables};
use crate::types::RecordId;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct FreezeGate {
    store: Arc<dyn Store>,
    poll_interval: Duration,
}

impl FreezeGate {
    pub fn new(store: Arc<dyn Store>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Create the freeze point and block until it is externally removed.
    ///
    /// Returns the identity the freeze point had. Only failing to create the
    /// record is an error; failed reads while waiting are logged and the
    /// gate keeps polling.
    pub async fn enter(&self, point: &TaskFreezePoint) -> Result<RecordId> {
        let record = serde_json::to_value(point)?;
        let id = self.store.create(tables::TASK_FREEZE_POINT, record).await?;

        info!(
            freeze_point = %id,
            group = %point.task_group,
            job_instance = %point.job_instance,
            "task group frozen; waiting for freeze point removal"
        );

        self.wait_for_release(&id).await;

        info!(freeze_point = %id, group = %point.task_group, "freeze point removed; resuming");
        Ok(id)
    }

    /// Poll `id` every interval until a read reports it absent.
    pub async fn wait_for_release(&self, id: &RecordId) {
        loop {
            tokio::time::sleep(self.poll_interval).await;

            match self.store.get(id).await {
                Ok(None) => return,
                Ok(Some(_)) => debug!(freeze_point = %id, "still frozen"),
                Err(e) => warn!(freeze_point = %id, error = %e, "failed to read freeze point; retrying"),
            }
        }
    }
}

/// Freeze points currently held, optionally restricted to one job instance.
///
/// This is how observers derive a "frozen" view of an instance: the instance
/// state itself never says frozen.
pub async fn frozen_groups(
    store: &dyn Store,
    instance: Option<&RecordId>,
) -> Result<Vec<TaskFreezePoint>> {
    let mut points = Vec::new();
    for value in store.list(tables::TASK_FREEZE_POINT).await? {
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .map(RecordId::from)
            .unwrap_or_else(|| RecordId::from(tables::TASK_FREEZE_POINT));
        let point: TaskFreezePoint = decode(&id, value)?;
        if instance.is_none_or(|wanted| &point.job_instance == wanted) {
            points.push(point);
        }
    }
    Ok(points)
}

/// Resume a frozen group by deleting its freeze point.
///
/// Returns whether the freeze point existed.
pub async fn release(store: &dyn Store, id: &RecordId) -> Result<bool> {
    let existed = store.delete(id).await?;
    if existed {
        info!(freeze_point = %id, "freeze point released");
    } else {
        warn!(freeze_point = %id, "no such freeze point");
    }
    Ok(existed)
}
