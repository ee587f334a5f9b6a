//! Runtime utilities that abstract over the underlying async executor.
//!
//! Binaries build their runtime here so that downstream crates never need to
//! depend on Tokio directly.

pub use tokio::runtime::{Builder, Runtime};

/// Build a multi-threaded runtime with IO and timers enabled.
///
/// # Errors
///
/// Returns the underlying IO error if the runtime's worker threads or
/// drivers cannot be created.
pub fn build_multi_thread(thread_name: &str) -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name(thread_name)
        .build()
}

/// Completes when the process receives Ctrl-C (SIGINT).
///
/// # Errors
///
/// Returns the underlying IO error if the signal handler cannot be installed.
pub async fn ctrl_c() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
