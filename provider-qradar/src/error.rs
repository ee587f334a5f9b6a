//! Error types for the QRadar provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// QRadar provider errors
#[derive(Error, Debug)]
pub enum QRadarError {
    /// Response body did not match the documented shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport failure or unexpected status
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for QRadar operations
pub type Result<T> = std::result::Result<T, QRadarError>;

impl From<QRadarError> for BridgeError {
    fn from(error: QRadarError) -> Self {
        match error {
            QRadarError::ParseError(msg) => BridgeError::Decode(msg),
            QRadarError::Bridge(e) => e,
        }
    }
}
