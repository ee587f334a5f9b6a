use bridge_traits::BridgeError;
use std::fmt;
use thiserror::Error;

/// Remote step a reconciliation unit was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    Create,
    BulkLoad,
    Purge,
    Delete,
    PollStatus,
}

impl fmt::Display for SetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetOperation::Create => "create",
            SetOperation::BulkLoad => "bulk load",
            SetOperation::Purge => "purge",
            SetOperation::Delete => "delete",
            SetOperation::PollStatus => "poll delete task for",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to extract server groups from {input}: {source}")]
    Extract {
        input: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to list reference sets: {0}")]
    Listing(#[source] BridgeError),

    #[error("Failed to {operation} reference set {set_name:?}: {source}")]
    Operation {
        set_name: String,
        operation: SetOperation,
        #[source]
        source: BridgeError,
    },

    #[error("Timed out waiting for delete task on {set_name:?} after {attempts} lookups, last status: {last_status}")]
    PollTimeout {
        set_name: String,
        attempts: u32,
        last_status: String,
    },
}

impl SyncError {
    pub(crate) fn operation(set_name: &str, operation: SetOperation, source: BridgeError) -> Self {
        SyncError::Operation {
            set_name: set_name.to_string(),
            operation,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
