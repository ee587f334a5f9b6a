use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Unexpected response status {status} (expected {expected}): {body}")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
