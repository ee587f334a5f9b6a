//! # Bridge Traits
//!
//! Capability traits that separate the sync engine from concrete transports.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP execution with pooling, timeouts, TLS policy
//! - [`ReferenceDataStore`](reference_data::ReferenceDataStore) - Named reference sets on a
//!   SIEM platform (list, create, bulk load, delete, delete-task status)
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should:
//!
//! - Convert transport-specific errors to `BridgeError`
//! - Keep the response status and body when the remote answers unexpectedly
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`; one instance is shared by every
//! concurrently running reconciliation unit.
//!
//! ## Test Support
//!
//! With the `test-support` feature, [`memory::InMemoryReferenceStore`] provides
//! a stateful fake of the reference data API.

pub mod error;
pub mod http;
pub mod reference_data;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use reference_data::{DeletionTask, ReferenceDataStore, ReferenceSet};
