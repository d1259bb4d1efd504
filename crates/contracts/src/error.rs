//! Layered error definitions
//!
//! Categorized by source: framing / calibration / socket / filesystem / config

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Framing Errors =====
    /// Packet length does not match the fixed protocol size
    #[error("framing error: expected {expected} bytes, got {actual}")]
    Framing { expected: usize, actual: usize },

    /// Packet does not begin with the start-of-packet marker
    #[error("framing error: bad start-of-packet marker {found:#06x}")]
    BadStartOfPacket { found: u16 },

    /// Tail return-mode byte is not a supported echo mode
    #[error("unsupported return mode {0:#04x}")]
    UnsupportedReturnMode(u8),

    // ===== Calibration Errors =====
    /// Index outside a calibration table
    #[error("calibration lookup error: {table} index {index} out of range (len {len})")]
    CalibrationLookup {
        table: &'static str,
        index: usize,
        len: usize,
    },

    // ===== Socket Errors =====
    /// Socket bind or receive failure
    #[error("socket error on {addr}: {source}")]
    Socket {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ===== Filesystem Errors =====
    /// Directory or file open/write failure
    #[error("filesystem error at '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Coarse error class, used for reports and process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Framing,
    Calibration,
    Socket,
    Filesystem,
    Config,
    Other,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Framing => "framing",
            Self::Calibration => "calibration",
            Self::Socket => "socket",
            Self::Filesystem => "filesystem",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContractError {
    /// Create framing error
    pub fn framing(expected: usize, actual: usize) -> Self {
        Self::Framing { expected, actual }
    }

    /// Create calibration lookup error
    pub fn calibration_lookup(table: &'static str, index: usize, len: usize) -> Self {
        Self::CalibrationLookup { table, index, len }
    }

    /// Create socket error
    pub fn socket(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Socket {
            addr: addr.into(),
            source,
        }
    }

    /// Create filesystem error
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify the error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Framing { .. } | Self::BadStartOfPacket { .. } | Self::UnsupportedReturnMode(_) => {
                ErrorClass::Framing
            }
            Self::CalibrationLookup { .. } => ErrorClass::Calibration,
            Self::Socket { .. } => ErrorClass::Socket,
            Self::Filesystem { .. } | Self::Io(_) => ErrorClass::Filesystem,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => ErrorClass::Config,
            Self::Other(_) => ErrorClass::Other,
        }
    }
}
