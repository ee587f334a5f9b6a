//! # Reference Set Sync Engine
//!
//! Reconciles server groups derived from a CSV inventory with the managed
//! reference sets on a SIEM platform.
//!
//! ## Components
//!
//! - **Group Extractor** (`extractor`): inventory rows to group name → members
//! - **Remote State Reader** (`remote`): managed subset of the remote sets
//! - **Task Poller** (`poller`): waits for asynchronous delete tasks
//! - **Reconciler** (`reconciler`): plans refresh/create/remove actions and runs
//!   them concurrently
//! - **Sync Report** (`report`): aggregated per-unit outcomes

pub mod error;
pub mod extractor;
pub mod poller;
pub mod reconciler;
pub mod remote;
pub mod report;

pub use error::{Result, SetOperation, SyncError};
pub use extractor::{extract_groups, extract_groups_from_reader, GroupNaming, ServerGroups};
pub use poller::{PollPolicy, TaskPoller};
pub use reconciler::{ActionKind, Reconciler, SyncAction, SyncPlan};
pub use remote::{fetch_managed_sets, RemoteSets};
pub use report::{SyncReport, UnitFailure};
