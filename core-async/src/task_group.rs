//! Structured task groups.
//!
//! A [`TaskGroup`] launches a batch of independent, labelled units and joins
//! all of them, producing exactly one [`UnitResult`] per launched unit. A unit
//! that fails, panics or is cancelled never takes its siblings down with it
//! unless the group runs under [`FailurePolicy::FailFast`], in which case the
//! first failure cancels the units that are still in flight.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task_group::{FailurePolicy, TaskGroup, UnitOutcome};
//!
//! async fn example() {
//!     let mut group: TaskGroup<u32, String> = TaskGroup::new(FailurePolicy::BestEffort);
//!     group.spawn("one", async { Ok(1) });
//!     group.spawn("two", async { Err("boom".to_string()) });
//!
//!     let results = group.join_all().await;
//!     assert_eq!(results.len(), 2);
//!     assert!(results.iter().any(|r| matches!(r.outcome, UnitOutcome::Failed(_))));
//! }
//! ```

use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use crate::sync::CancellationToken;
use crate::task::{Id, JoinSet};

/// What to do with in-flight siblings when one unit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Let every unit run to completion and report all failures
    #[default]
    BestEffort,
    /// Cancel the remaining units at their next suspension point
    FailFast,
}

/// Final state of one unit.
#[derive(Debug)]
pub enum UnitOutcome<T, E> {
    Succeeded(T),
    Failed(E),
    /// Stopped by the group's cancellation token before finishing
    Cancelled,
    /// The unit panicked; carries the panic message
    Panicked(String),
}

impl<T, E> UnitOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Succeeded(_))
    }

    /// Failed or panicked. Cancellation is not counted as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_) | UnitOutcome::Panicked(_))
    }
}

/// Outcome of one unit together with the label it was spawned under.
#[derive(Debug)]
pub struct UnitResult<T, E> {
    pub label: String,
    pub outcome: UnitOutcome<T, E>,
}

/// A batch of concurrently running units joined as a whole.
pub struct TaskGroup<T, E> {
    set: JoinSet<UnitResult<T, E>>,
    /// Labels by task id, for units that end without producing a result
    labels: HashMap<Id, String>,
    token: CancellationToken,
    policy: FailurePolicy,
    launched: usize,
}

impl<T, E> TaskGroup<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(policy: FailurePolicy) -> Self {
        Self::with_token(policy, &CancellationToken::new())
    }

    /// Create a group whose units also stop when `token` (or a parent of
    /// it) is cancelled from outside. Fail-fast cancellation stays inside
    /// the group and never reaches `token`.
    pub fn with_token(policy: FailurePolicy, token: &CancellationToken) -> Self {
        Self {
            set: JoinSet::new(),
            labels: HashMap::new(),
            token: token.child_token(),
            policy,
            launched: 0,
        }
    }

    /// Number of units launched so far.
    pub fn len(&self) -> usize {
        self.launched
    }

    pub fn is_empty(&self) -> bool {
        self.launched == 0
    }

    /// Launch a unit immediately. It starts running before [`join_all`] is
    /// called.
    ///
    /// [`join_all`]: TaskGroup::join_all
    pub fn spawn<F>(&mut self, label: impl Into<String>, future: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let label = label.into();
        let token = self.token.clone();
        let policy = self.policy;
        let unit_label = label.clone();

        let handle = self.set.spawn(async move {
            let label = unit_label;
            if token.is_cancelled() {
                return UnitResult {
                    label,
                    outcome: UnitOutcome::Cancelled,
                };
            }

            let guarded = AssertUnwindSafe(future).catch_unwind();
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => UnitOutcome::Cancelled,
                result = guarded => match result {
                    Ok(Ok(value)) => UnitOutcome::Succeeded(value),
                    Ok(Err(error)) => UnitOutcome::Failed(error),
                    Err(panic) => UnitOutcome::Panicked(panic_message(panic)),
                },
            };

            if policy == FailurePolicy::FailFast && outcome.is_failure() {
                token.cancel();
            }

            UnitResult { label, outcome }
        });
        self.labels.insert(handle.id(), label);
        self.launched += 1;
    }

    /// Wait for every launched unit and return one result per unit, in
    /// completion order.
    pub async fn join_all(mut self) -> Vec<UnitResult<T, E>> {
        let mut results = Vec::with_capacity(self.launched);

        while let Some(joined) = self.set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // Panics are caught inside the unit, so this is an abort
                // coming from runtime shutdown.
                Err(error) => results.push(UnitResult {
                    label: self
                        .labels
                        .remove(&error.id())
                        .unwrap_or_else(|| format!("task {}", error.id())),
                    outcome: if error.is_panic() {
                        UnitOutcome::Panicked(error.to_string())
                    } else {
                        UnitOutcome::Cancelled
                    },
                }),
            }
        }

        results
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unit panicked".to_string()
    }
}
