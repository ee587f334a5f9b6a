//! # QRadar Provider
//!
//! Implements `ReferenceDataStore` for the QRadar reference data REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Listing, creating and bulk loading IP reference sets
//! - Starting delete and purge tasks and looking up their status
//! - Versioned requests authenticated with an authorized service token

pub mod connector;
pub mod error;

pub use connector::QRadarConnector;
pub use error::{QRadarError, Result};
