//! Error types for CLI operations.

use contracts::{ContractError, ErrorClass};
use thiserror::Error;

/// `sysexits.h` codes used by the binary
pub mod exit {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const DATA_ERR: u8 = 65;
    pub const UNAVAILABLE: u8 = 69;
    pub const IO_ERR: u8 = 74;
    pub const CONFIG: u8 = 78;
}

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Unpack finished but some records produced no frame (`--fail-on-skip`)
    #[error("{skipped} of {records} records were skipped")]
    SkippedRecords { skipped: usize, records: u64 },

    /// Library error with a known class
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn skipped_records(skipped: usize, records: u64) -> Self {
        Self::SkippedRecords { skipped, records }
    }

    /// Error class, looking through `anyhow` context layers
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::SkippedRecords { .. } => None,
            Self::Contract(e) => Some(e.class()),
            Self::Other(e) => e
                .chain()
                .find_map(|cause| cause.downcast_ref::<ContractError>())
                .map(ContractError::class),
        }
    }

    /// Process exit status
    pub fn exit_code(&self) -> u8 {
        if let Self::SkippedRecords { .. } = self {
            return exit::DATA_ERR;
        }
        match self.class() {
            Some(ErrorClass::Config) => exit::CONFIG,
            Some(ErrorClass::Socket) => exit::UNAVAILABLE,
            Some(ErrorClass::Filesystem) => exit::IO_ERR,
            _ => exit::FAILURE,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
