//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for native hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls, pooled connections, bounded
//!   connect and request timeouts
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HttpClientOptions, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::with_options(HttpClientOptions::default())?);
//! // Hand the client to an API connector
//! ```

mod http;

pub use http::{HttpClientOptions, ReqwestHttpClient};
