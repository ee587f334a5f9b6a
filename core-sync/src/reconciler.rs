//! # Reconciler
//!
//! Diffs desired server groups against managed remote sets and drives every
//! difference to completion.
//!
//! ## Workflow
//!
//! 1. [`Reconciler::plan`] compares names only:
//!    - desired and remote: **refresh** (purge, wait, bulk load)
//!    - desired only: **create** (create IP set, bulk load)
//!    - remote only: **remove** (full delete, wait)
//! 2. [`Reconciler::execute`] launches one unit per action on a
//!    [`TaskGroup`] and joins them all into a [`SyncReport`].
//!
//! Units never share mutable state. Within a unit the steps are strictly
//! sequential; across units there is no ordering. A set that is desired is
//! only ever purged, never deleted outright.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{fetch_managed_sets, extract_groups, GroupNaming, PollPolicy, Reconciler};
//! use core_async::FailurePolicy;
//!
//! let naming = GroupNaming::default();
//! let desired = extract_groups(path, &naming)?;
//! let remote = fetch_managed_sets(store.as_ref(), &naming.prefix).await?;
//!
//! let plan = Reconciler::plan(&desired, &remote);
//! let report = Reconciler::new(store, PollPolicy::default(), FailurePolicy::BestEffort)
//!     .execute(plan)
//!     .await;
//! report.log_summary();
//! ```

use crate::error::{Result, SetOperation, SyncError};
use crate::extractor::ServerGroups;
use crate::poller::{PollPolicy, TaskPoller};
use crate::remote::RemoteSets;
use crate::report::SyncReport;
use bridge_traits::reference_data::ReferenceDataStore;
use core_async::sync::CancellationToken;
use core_async::{FailurePolicy, TaskGroup, UnitOutcome};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, info_span, instrument, warn, Instrument};

/// Kind of change applied to one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Refresh,
    Create,
    Remove,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Refresh => "refresh",
            ActionKind::Create => "create",
            ActionKind::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// One planned change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Purge the existing set, then load `members`
    Refresh { name: String, members: Vec<String> },
    /// Create the set, then load `members`
    Create { name: String, members: Vec<String> },
    /// Delete the set entirely
    Remove { name: String },
}

impl SyncAction {
    pub fn set_name(&self) -> &str {
        match self {
            SyncAction::Refresh { name, .. }
            | SyncAction::Create { name, .. }
            | SyncAction::Remove { name } => name,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            SyncAction::Refresh { .. } => ActionKind::Refresh,
            SyncAction::Create { .. } => ActionKind::Create,
            SyncAction::Remove { .. } => ActionKind::Remove,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Refresh { name, members } | SyncAction::Create { name, members } => {
                write!(f, "{} {:?} ({} members)", self.kind(), name, members.len())
            }
            SyncAction::Remove { name } => write!(f, "{} {:?}", self.kind(), name),
        }
    }
}

/// Ordered list of planned changes: desired groups by name, then removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    actions: Vec<SyncAction>,
}

impl SyncPlan {
    pub fn actions(&self) -> &[SyncAction] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<SyncAction> {
        self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }

    /// Log every planned action without executing anything.
    pub fn log_actions(&self) {
        for action in &self.actions {
            info!(
                set_name = %action.set_name(),
                action = %action.kind(),
                "Planned: {}",
                action
            );
        }
        info!(
            create = self.count(ActionKind::Create),
            refresh = self.count(ActionKind::Refresh),
            remove = self.count(ActionKind::Remove),
            "Plan computed"
        );
    }
}

/// Applies a [`SyncPlan`] through a shared [`ReferenceDataStore`].
pub struct Reconciler {
    store: Arc<dyn ReferenceDataStore>,
    poller: TaskPoller,
    failure_policy: FailurePolicy,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ReferenceDataStore>,
        poll_policy: PollPolicy,
        failure_policy: FailurePolicy,
    ) -> Self {
        let poller = TaskPoller::new(Arc::clone(&store), poll_policy);
        Self {
            store,
            poller,
            failure_policy,
        }
    }

    /// Compare desired groups with the managed remote sets by name.
    ///
    /// `remote` must only hold managed sets (see
    /// [`fetch_managed_sets`](crate::remote::fetch_managed_sets)); every
    /// remote-only entry is planned for removal.
    pub fn plan(desired: &ServerGroups, remote: &RemoteSets) -> SyncPlan {
        let mut actions: Vec<SyncAction> = desired
            .iter()
            .map(|(name, members)| {
                if remote.contains_key(name) {
                    SyncAction::Refresh {
                        name: name.clone(),
                        members: members.clone(),
                    }
                } else {
                    SyncAction::Create {
                        name: name.clone(),
                        members: members.clone(),
                    }
                }
            })
            .collect();

        actions.extend(
            remote
                .keys()
                .filter(|name| !desired.contains_key(*name))
                .map(|name| SyncAction::Remove { name: name.clone() }),
        );

        SyncPlan { actions }
    }

    /// Run every action concurrently and wait for all of them.
    pub async fn execute(&self, plan: SyncPlan) -> SyncReport {
        self.execute_with_token(plan, CancellationToken::new()).await
    }

    /// Like [`execute`](Self::execute), but units also stop when `token` is
    /// cancelled from outside (e.g. on Ctrl-C).
    #[instrument(skip_all, fields(units = plan.len(), policy = ?self.failure_policy))]
    pub async fn execute_with_token(&self, plan: SyncPlan, token: CancellationToken) -> SyncReport {
        let mut kinds: BTreeMap<String, ActionKind> = BTreeMap::new();
        let mut group: TaskGroup<Option<u64>, SyncError> =
            TaskGroup::with_token(self.failure_policy, &token);

        for action in plan.into_actions() {
            let name = action.set_name().to_string();
            let kind = action.kind();
            let span = info_span!("sync_unit", set_name = %name, action = %kind);

            kinds.insert(name.clone(), kind);
            group.spawn(
                name,
                run_unit(Arc::clone(&self.store), self.poller.clone(), action).instrument(span),
            );
        }

        info!(units = group.len(), "Launched reconciliation units");

        let mut report = SyncReport::new();
        for result in group.join_all().await {
            let Some(kind) = kinds.get(&result.label).copied() else {
                warn!(label = %result.label, "Unit finished without a planned action");
                report.record_cancelled(&result.label);
                continue;
            };

            match result.outcome {
                UnitOutcome::Succeeded(elements) => {
                    report.record_success(&result.label, kind, elements)
                }
                UnitOutcome::Failed(error) => {
                    report.record_failure(&result.label, kind, error.to_string())
                }
                UnitOutcome::Panicked(message) => {
                    report.record_failure(&result.label, kind, format!("panicked: {}", message))
                }
                UnitOutcome::Cancelled => report.record_cancelled(&result.label),
            }
        }

        report
    }
}

/// Drive one set through its sequence. Returns the element count reported by
/// bulk load, if the action loads members.
async fn run_unit(
    store: Arc<dyn ReferenceDataStore>,
    poller: TaskPoller,
    action: SyncAction,
) -> Result<Option<u64>> {
    match action {
        SyncAction::Refresh { name, members } => {
            info!("Reference set exists, purging");
            let task = store
                .delete_set(&name, true)
                .await
                .map_err(|e| SyncError::operation(&name, SetOperation::Purge, e))?;
            poller.wait_for_completion(&name, task).await?;
            info!("Purged reference set");

            load_members(store.as_ref(), &name, &members).await.map(Some)
        }
        SyncAction::Create { name, members } => {
            info!("Creating reference set");
            store
                .create_set(&name)
                .await
                .map_err(|e| SyncError::operation(&name, SetOperation::Create, e))?;
            info!("Created reference set");

            load_members(store.as_ref(), &name, &members).await.map(Some)
        }
        SyncAction::Remove { name } => {
            info!("Reference set no longer needed, deleting");
            let task = store
                .delete_set(&name, false)
                .await
                .map_err(|e| SyncError::operation(&name, SetOperation::Delete, e))?;
            poller.wait_for_completion(&name, task).await?;
            info!("Deleted reference set");

            Ok(None)
        }
    }
}

async fn load_members(store: &dyn ReferenceDataStore, name: &str, members: &[String]) -> Result<u64> {
    let set = store
        .bulk_load(name, members)
        .await
        .map_err(|e| SyncError::operation(name, SetOperation::BulkLoad, e))?;

    let elements = set.element_count();
    info!(elements, "Bulk loaded reference set");
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::reference_data::ReferenceSet;

    fn desired(entries: &[(&str, Vec<&str>)]) -> ServerGroups {
        entries
            .iter()
            .map(|(name, members)| {
                (
                    name.to_string(),
                    members.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    fn remote(names: &[&str]) -> RemoteSets {
        names
            .iter()
            .map(|name| (name.to_string(), ReferenceSet::new_ip(*name)))
            .collect()
    }

    #[test]
    fn test_plan_classifies_by_name() {
        let plan = Reconciler::plan(
            &desired(&[
                ("M - A", vec!["1.1.1.1"]),
                ("M - B", vec!["2.2.2.2", "2.2.2.3"]),
            ]),
            &remote(&["M - B", "M - C"]),
        );

        assert_eq!(
            plan.actions(),
            &[
                SyncAction::Create {
                    name: "M - A".to_string(),
                    members: vec!["1.1.1.1".to_string()],
                },
                SyncAction::Refresh {
                    name: "M - B".to_string(),
                    members: vec!["2.2.2.2".to_string(), "2.2.2.3".to_string()],
                },
                SyncAction::Remove {
                    name: "M - C".to_string(),
                },
            ]
        );
        assert_eq!(plan.count(ActionKind::Create), 1);
        assert_eq!(plan.count(ActionKind::Refresh), 1);
        assert_eq!(plan.count(ActionKind::Remove), 1);
    }

    #[test]
    fn test_desired_set_is_never_removed() {
        let plan = Reconciler::plan(&desired(&[("M - A", vec!["1.1.1.1"])]), &remote(&["M - A"]));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.actions()[0].kind(), ActionKind::Refresh);
    }

    #[test]
    fn test_empty_inputs_give_empty_plan() {
        assert!(Reconciler::plan(&ServerGroups::new(), &RemoteSets::new()).is_empty());
    }

    #[test]
    fn test_empty_desired_removes_everything_managed() {
        let plan = Reconciler::plan(&ServerGroups::new(), &remote(&["M - A", "M - B"]));
        assert_eq!(plan.count(ActionKind::Remove), 2);
    }

    #[test]
    fn test_action_display() {
        let action = SyncAction::Create {
            name: "M - A".to_string(),
            members: vec!["1.1.1.1".to_string(), "1.1.1.2".to_string()],
        };
        assert_eq!(action.to_string(), "create \"M - A\" (2 members)");

        let action = SyncAction::Remove {
            name: "M - C".to_string(),
        };
        assert_eq!(action.to_string(), "remove \"M - C\"");
    }
}
