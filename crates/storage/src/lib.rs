//! # Storage
//!
//! Everything that touches disk:
//! - [`Persister`]: blocking worker that drains the capture queue into rotating raw files
//! - [`RotatingRawWriter`]: the `prefix + packet` record writer behind it
//! - [`FrameFileSink`]: per-frame CSV / PLY output used by the unpacker

mod error;
pub mod frames;
mod metrics;
mod persister;
mod raw;

pub use error::{Result, StorageError};
pub use frames::{frame_file_name, minute_bucket, FrameFileSink, BUCKET_FORMAT};
pub use crate::metrics::{PersistStats, PersisterMetrics};
pub use persister::Persister;
pub use raw::{RotatingRawWriter, RAW_FILE_FORMAT};
