//! Task spawning and execution abstractions.
//!
//! Thin wrappers over `tokio::task`. Spawned tasks may run on any worker
//! thread, so futures must be `Send + 'static`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     let result = handle.await.unwrap();
//!     assert_eq!(result, 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, Id, JoinError, JoinHandle, JoinSet};

/// Spawns a new asynchronous task using the Tokio runtime.
///
/// # Arguments
///
/// * `future` - The async computation to run
///
/// # Returns
///
/// A `JoinHandle` that can be awaited to get the task's result.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
