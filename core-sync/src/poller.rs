//! # Task Poller
//!
//! Waits for an asynchronous delete or purge task to reach `COMPLETED`.
//!
//! Polling is fixed-interval with a bounded number of status lookups. A task
//! that is already complete when handed over costs no lookup at all. There is
//! no backoff and no jitter.

use crate::error::{Result, SyncError, SetOperation};
use bridge_traits::reference_data::{DeletionTask, ReferenceDataStore};
use core_async::time::sleep;
pub use core_runtime::config::PollPolicy;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Polls delete tasks through a shared store handle.
#[derive(Clone)]
pub struct TaskPoller {
    store: Arc<dyn ReferenceDataStore>,
    policy: PollPolicy,
}

impl TaskPoller {
    pub fn new(store: Arc<dyn ReferenceDataStore>, policy: PollPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Return the completed task, or [`SyncError::PollTimeout`] once the
    /// lookup budget is spent. A failed lookup ends polling immediately.
    #[instrument(skip(self, task), fields(task_id = task.id))]
    pub async fn wait_for_completion(&self, set_name: &str, task: DeletionTask) -> Result<DeletionTask> {
        if task.is_completed() {
            return Ok(task);
        }

        let task_id = task.id;
        let mut last_status = task.status;

        for attempt in 1..=self.policy.max_attempts {
            let current = self
                .store
                .delete_task_status(task_id)
                .await
                .map_err(|source| SyncError::operation(set_name, SetOperation::PollStatus, source))?;

            debug!(attempt, status = %current.status, "Polled delete task");

            if current.is_completed() {
                return Ok(current);
            }

            last_status = current.status;

            if attempt < self.policy.max_attempts {
                sleep(self.policy.interval).await;
            }
        }

        warn!(
            attempts = self.policy.max_attempts,
            last_status = %last_status,
            "Delete task did not complete in time"
        );
        Err(SyncError::PollTimeout {
            set_name: set_name.to_string(),
            attempts: self.policy.max_attempts,
            last_status,
        })
    }
}
