//! Async runtime abstraction layer for refset-sync.
//!
//! All other workspace crates reach the executor through this crate instead of
//! depending on tokio directly. It re-exports the small tokio surface the sync
//! engine needs and adds [`task_group::TaskGroup`], a structured way to run a
//! batch of independent units and collect one outcome per unit.
//!
//! # Modules
//!
//! - `task`: Task spawning and structured task groups
//! - `time`: Time-related operations (sleep, duration, instant)
//! - `sync`: Synchronization primitives and cancellation
//! - `runtime`: Runtime construction for binaries
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod task_group;
pub mod time;

// Re-export commonly used types at crate root for convenience
pub use task::spawn;
pub use task_group::{FailurePolicy, TaskGroup, UnitOutcome, UnitResult};
pub use time::{sleep, Duration, Instant};
