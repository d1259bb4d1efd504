//! FrameSink trait - Unpacker output interface
//!
//! Defines the abstract interface for frame writers.

use std::path::PathBuf;

use crate::{ContractError, Frame};

/// Frame output trait
///
/// All frame writers implement this trait. Each unpack worker owns its own sink.
pub trait FrameSink: Send {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Write one frame to its own file
    ///
    /// # Errors
    /// Returns a filesystem error (should include the path)
    fn write(&mut self, frame: &Frame) -> Result<PathBuf, ContractError>;
}
