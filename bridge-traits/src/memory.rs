//! In-memory [`ReferenceDataStore`] for tests.
//!
//! Deletes and purges take effect immediately but the returned task starts in
//! a configurable non-terminal status; the task flips to `COMPLETED` after a
//! configurable number of status lookups.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{BridgeError, Result};
use crate::reference_data::{
    DeletionTask, ReferenceDataStore, ReferenceSet, IP_ELEMENT_TYPE, TASK_STATUS_COMPLETED,
};

/// A mutation observed by the store, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create { name: String },
    BulkLoad { name: String, values: Vec<String> },
    Delete { name: String, purge_only: bool },
}

#[derive(Debug)]
struct PendingTask {
    task: DeletionTask,
    lookups_left: u32,
}

#[derive(Debug, Default)]
struct State {
    sets: BTreeMap<String, ReferenceSet>,
    members: HashMap<String, Vec<String>>,
    tasks: HashMap<i64, PendingTask>,
    next_task_id: i64,
    calls: Vec<RecordedCall>,
    failing_sets: Vec<String>,
}

/// Thread-safe fake reference data store.
#[derive(Debug)]
pub struct InMemoryReferenceStore {
    state: Mutex<State>,
    lookups_until_complete: u32,
}

impl Default for InMemoryReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReferenceStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            lookups_until_complete: 1,
        }
    }

    /// Number of status lookups before a delete task reports `COMPLETED`.
    /// `u32::MAX` keeps tasks pending forever.
    pub fn with_lookups_until_complete(mut self, lookups: u32) -> Self {
        self.lookups_until_complete = lookups;
        self
    }

    /// Seed an existing set with members.
    pub fn with_set(self, name: &str, element_type: &str, members: &[&str]) -> Self {
        {
            let mut state = self.lock();
            let values: Vec<String> = members.iter().map(|m| m.to_string()).collect();
            state.sets.insert(
                name.to_string(),
                ReferenceSet {
                    name: name.to_string(),
                    element_type: element_type.to_string(),
                    timeout_type: Some("UNKNOWN".to_string()),
                    time_to_live: None,
                    creation_time: Some(1_700_000_000_000),
                    number_of_elements: Some(values.len() as u64),
                },
            );
            state.members.insert(name.to_string(), values);
        }
        self
    }

    /// Make every mutation on `name` fail with a 500.
    pub fn failing_on(self, name: &str) -> Self {
        self.lock().failing_sets.push(name.to_string());
        self
    }

    pub fn set_names(&self) -> Vec<String> {
        self.lock().sets.keys().cloned().collect()
    }

    pub fn members(&self, name: &str) -> Option<Vec<String>> {
        self.lock().members.get(name).cloned()
    }

    pub fn get(&self, name: &str) -> Option<ReferenceSet> {
        self.lock().sets.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls touching one set, in order.
    pub fn calls_for(&self, name: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                RecordedCall::Create { name: n }
                | RecordedCall::BulkLoad { name: n, .. }
                | RecordedCall::Delete { name: n, .. } => n == name,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failing(state: &State, name: &str) -> Result<()> {
        if state.failing_sets.iter().any(|n| n == name) {
            return Err(BridgeError::UnexpectedStatus {
                expected: 200,
                status: 500,
                body: format!("injected failure for {}", name),
            });
        }
        Ok(())
    }

    fn not_found(name: &str) -> BridgeError {
        BridgeError::UnexpectedStatus {
            expected: 200,
            status: 404,
            body: format!("reference set {} does not exist", name),
        }
    }
}

#[async_trait]
impl ReferenceDataStore for InMemoryReferenceStore {
    async fn list_sets(&self) -> Result<Vec<ReferenceSet>> {
        Ok(self.lock().sets.values().cloned().collect())
    }

    async fn create_set(&self, name: &str) -> Result<ReferenceSet> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::Create {
            name: name.to_string(),
        });
        Self::check_failing(&state, name)?;

        if state.sets.contains_key(name) {
            return Err(BridgeError::UnexpectedStatus {
                expected: 201,
                status: 409,
                body: format!("reference set {} already exists", name),
            });
        }

        let set = ReferenceSet::new_ip(name);
        state.sets.insert(name.to_string(), set.clone());
        state.members.insert(name.to_string(), Vec::new());
        Ok(set)
    }

    async fn bulk_load(&self, name: &str, values: &[String]) -> Result<ReferenceSet> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::BulkLoad {
            name: name.to_string(),
            values: values.to_vec(),
        });
        Self::check_failing(&state, name)?;

        let count = values.len() as u64;
        state.members.insert(name.to_string(), values.to_vec());
        let set = state.sets.get_mut(name).ok_or_else(|| Self::not_found(name))?;
        set.number_of_elements = Some(count);
        Ok(set.clone())
    }

    async fn delete_set(&self, name: &str, purge_only: bool) -> Result<DeletionTask> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::Delete {
            name: name.to_string(),
            purge_only,
        });
        Self::check_failing(&state, name)?;

        if !state.sets.contains_key(name) {
            return Err(Self::not_found(name));
        }

        if purge_only {
            state.members.insert(name.to_string(), Vec::new());
            if let Some(set) = state.sets.get_mut(name) {
                set.number_of_elements = Some(0);
            }
        } else {
            state.sets.remove(name);
            state.members.remove(name);
        }

        state.next_task_id += 1;
        let task = DeletionTask {
            id: state.next_task_id,
            created: 0,
            started: 0,
            modified: 0,
            completed: 0,
            name: name.to_string(),
            status: "QUEUED".to_string(),
            message: String::new(),
            created_by: "test".to_string(),
        };
        let lookups_left = self.lookups_until_complete;
        state.tasks.insert(
            task.id,
            PendingTask {
                task: task.clone(),
                lookups_left,
            },
        );
        Ok(task)
    }

    async fn delete_task_status(&self, task_id: i64) -> Result<DeletionTask> {
        let mut state = self.lock();
        let pending = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| BridgeError::UnexpectedStatus {
                expected: 200,
                status: 404,
                body: format!("task {} not found", task_id),
            })?;

        pending.lookups_left = pending.lookups_left.saturating_sub(1);
        pending.task.status = if pending.lookups_left == 0 {
            TASK_STATUS_COMPLETED.to_string()
        } else {
            "PROCESSING".to_string()
        };
        Ok(pending.task.clone())
    }
}
