//! Reference Data Abstractions
//!
//! Types and the store trait for named reference sets held by a SIEM
//! platform. Connectors (e.g. `provider-qradar`) implement
//! [`ReferenceDataStore`]; the sync engine only talks to this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Element type used for every set this workspace creates.
pub const IP_ELEMENT_TYPE: &str = "IP";

/// Status string reported by the platform once a delete task has finished.
pub const TASK_STATUS_COMPLETED: &str = "COMPLETED";

/// A named reference set as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    pub name: String,

    /// Element type (`IP`, `ALN`, `NUM`, ...)
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<String>,

    /// Creation time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_elements: Option<u64>,
}

impl ReferenceSet {
    /// A freshly created, empty IP set.
    pub fn new_ip(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: IP_ELEMENT_TYPE.to_string(),
            timeout_type: None,
            time_to_live: None,
            creation_time: None,
            number_of_elements: Some(0),
        }
    }

    pub fn element_count(&self) -> u64 {
        self.number_of_elements.unwrap_or(0)
    }
}

/// Asynchronous delete (or purge) operation started by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionTask {
    pub id: i64,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub started: i64,

    #[serde(default)]
    pub modified: i64,

    #[serde(default)]
    pub completed: i64,

    /// Name of the set the task operates on
    #[serde(default)]
    pub name: String,

    pub status: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub created_by: String,
}

impl DeletionTask {
    pub fn is_completed(&self) -> bool {
        self.status == TASK_STATUS_COMPLETED
    }
}

/// Reference data store trait
///
/// All operations address sets by name; implementations take care of any
/// encoding the remote API requires.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::reference_data::ReferenceDataStore;
///
/// async fn refill(store: &dyn ReferenceDataStore, name: &str, ips: &[String]) -> Result<u64> {
///     store.create_set(name).await?;
///     let set = store.bulk_load(name, ips).await?;
///     Ok(set.element_count())
/// }
/// ```
#[async_trait]
pub trait ReferenceDataStore: Send + Sync {
    /// List every reference set visible to the caller (no pagination).
    async fn list_sets(&self) -> Result<Vec<ReferenceSet>>;

    /// Create an empty set of [`IP_ELEMENT_TYPE`] elements.
    async fn create_set(&self, name: &str) -> Result<ReferenceSet>;

    /// Replace the set's membership with `values`.
    async fn bulk_load(&self, name: &str, values: &[String]) -> Result<ReferenceSet>;

    /// Start deleting a set. With `purge_only` the set is kept and only its
    /// elements are removed.
    async fn delete_set(&self, name: &str, purge_only: bool) -> Result<DeletionTask>;

    /// Look up the current state of a delete task.
    async fn delete_task_status(&self, task_id: i64) -> Result<DeletionTask>;
}
