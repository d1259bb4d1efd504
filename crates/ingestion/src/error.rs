//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// UDP socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested `address:port`
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Local address lookup failed after binding
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),

    /// Persister side of the capture queue is gone
    #[error("capture queue closed")]
    ChannelClosed,
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Bind { addr, source } => ContractError::socket(addr, source),
            IngestionError::LocalAddr(source) => ContractError::socket("local", source),
            other => ContractError::Other(other.to_string()),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
