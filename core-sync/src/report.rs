//! # Sync Report
//!
//! Aggregated outcome of one reconciliation run. Every planned unit ends up
//! in exactly one bucket: completed (by action kind), failed, or cancelled.

use crate::reconciler::ActionKind;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info, warn};

/// A unit that failed or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub set_name: String,
    pub action: ActionKind,
    pub message: String,
}

/// Counts and per-set details of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub refreshed: usize,
    pub removed: usize,
    pub failures: Vec<UnitFailure>,
    /// Sets whose unit was stopped before finishing
    pub cancelled: Vec<String>,
    /// Element counts reported by bulk load, keyed by set name
    pub loaded: BTreeMap<String, u64>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&mut self, set_name: &str, action: ActionKind, elements: Option<u64>) {
        match action {
            ActionKind::Create => self.created += 1,
            ActionKind::Refresh => self.refreshed += 1,
            ActionKind::Remove => self.removed += 1,
        }
        if let Some(count) = elements {
            self.loaded.insert(set_name.to_string(), count);
        }
    }

    pub(crate) fn record_failure(&mut self, set_name: &str, action: ActionKind, message: String) {
        self.failures.push(UnitFailure {
            set_name: set_name.to_string(),
            action,
            message,
        });
    }

    pub(crate) fn record_cancelled(&mut self, set_name: &str) {
        self.cancelled.push(set_name.to_string());
    }

    /// Units that completed their whole sequence.
    pub fn succeeded(&self) -> usize {
        self.created + self.refreshed + self.removed
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed() + self.cancelled.len()
    }

    /// No unit failed and none was cancelled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.cancelled.is_empty()
    }

    /// Emit one summary line plus one line per failed or cancelled unit.
    pub fn log_summary(&self) {
        for failure in &self.failures {
            error!(
                set_name = %failure.set_name,
                action = %failure.action,
                error = %failure.message,
                "Reconciliation unit failed"
            );
        }
        for set_name in &self.cancelled {
            warn!(set_name = %set_name, "Reconciliation unit cancelled");
        }

        if self.is_success() {
            info!(
                created = self.created,
                refreshed = self.refreshed,
                removed = self.removed,
                "Sync completed"
            );
        } else {
            warn!(
                created = self.created,
                refreshed = self.refreshed,
                removed = self.removed,
                failed = self.failed(),
                cancelled = self.cancelled.len(),
                "Sync completed with errors"
            );
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, refreshed {}, removed {}, failed {}, cancelled {}",
            self.created,
            self.refreshed,
            self.removed,
            self.failed(),
            self.cancelled.len()
        )
    }
}
