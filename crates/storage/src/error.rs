//! Storage error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Directory could not be created
    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be opened
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write or flush failed on an open file
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persister worker did not finish cleanly
    #[error("persister worker failed: {0}")]
    Worker(String),
}

impl StorageError {
    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::CreateDir { path, .. } | Self::Open { path, .. } | Self::Write { path, .. } => {
                Some(path)
            }
            Self::Worker(_) => None,
        }
    }
}

impl From<StorageError> for ContractError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::CreateDir { path, source }
            | StorageError::Open { path, source }
            | StorageError::Write { path, source } => ContractError::filesystem(path, source),
            StorageError::Worker(message) => ContractError::Other(message),
        }
    }
}

/// Storage Result type alias
pub type Result<T> = std::result::Result<T, StorageError>;
