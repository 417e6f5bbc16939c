use crate::core::ports::{BlobStoreError, CheckpointError, SourceError};
use thiserror::Error;

/// Every way a single extraction step can fail. None of them is recoverable at run level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("fetch of `{endpoint}` failed: {cause}")]
    Fetch { endpoint: String, cause: SourceError },

    #[error("write of `{key}` failed: {cause}")]
    Write { key: String, cause: BlobStoreError },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl ExtractError {
    pub fn fetch(endpoint: impl Into<String>, cause: SourceError) -> Self {
        ExtractError::Fetch {
            endpoint: endpoint.into(),
            cause,
        }
    }

    pub fn write(key: impl Into<String>, cause: BlobStoreError) -> Self {
        ExtractError::Write {
            key: key.into(),
            cause,
        }
    }

    /// HTTP status behind a fetch failure, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractError::Fetch {
                cause: SourceError::Status(status),
                ..
            } => Some(*status),
            _ => None,
        }
    }
}
