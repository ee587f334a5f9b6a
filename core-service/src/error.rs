use core_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("{0}")]
    Extract(#[source] SyncError),

    #[error("{0}")]
    Listing(#[source] SyncError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("{failed} reconciliation unit(s) failed and {cancelled} were cancelled")]
    PartialFailure { failed: usize, cancelled: usize },
}

impl CoreError {
    /// Process exit code reported for this error.
    ///
    /// | Code | Meaning |
    /// |------|---------|
    /// | 1 | missing or invalid configuration, bootstrap failure |
    /// | 2 | inventory could not be read |
    /// | 3 | remote sets could not be listed |
    /// | 4 | at least one unit failed or was cancelled |
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::Config(_) | CoreError::Runtime(_) => 1,
            CoreError::Extract(_) => 2,
            CoreError::Listing(_) => 3,
            CoreError::PartialFailure { .. } => 4,
        }
    }
}

impl From<SyncError> for CoreError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Extract { .. } => CoreError::Extract(error),
            SyncError::Listing(_) => CoreError::Listing(error),
            other => CoreError::Runtime(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
