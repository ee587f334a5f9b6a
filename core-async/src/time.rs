//! Time-related abstractions.
//!
//! Re-exports `tokio::time` for sleeping and deadlines together with the
//! standard library's duration and instant types.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(10));
//! }
//! ```

pub use tokio::time::{sleep, timeout, Sleep, Timeout};

pub use std::time::{Duration, Instant};
