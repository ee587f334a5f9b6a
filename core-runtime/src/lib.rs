//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for refset-sync:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate holds the process-level settings every other crate is
//! configured from, and the one place where the `tracing` subscriber is
//! installed.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, AppConfigBuilder};
pub use error::{Error, Result};
