//! Synchronization primitives.
//!
//! Cooperative cancellation from `tokio_util`. Tokens are cheap to clone and
//! `Send + Sync`; child tokens are cancelled with their parent.

pub use tokio_util::sync::CancellationToken;
