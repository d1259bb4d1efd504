//! # Unpacker
//!
//! Offline conversion of raw XT-32 capture files into per-packet frame files.
//!
//! Files are processed in name order; frame ids count records across the whole run,
//! so ids do not depend on how files are spread over worker threads.
//!
//! ```ignore
//! use unpacker::{UnpackOptions, Unpacker};
//!
//! let report = Unpacker::new(Calibration::xt32(), UnpackOptions::new("captures/")).run()?;
//! println!("{} frames, {} skipped", report.frames_written, report.skipped_count());
//! ```

mod report;
mod scan;
mod unpacker;

pub use report::{SkippedRecord, UnpackReport};
pub use scan::{record_count, scan_inputs, InputFile, RAW_EXTENSION};
pub use unpacker::{UnpackOptions, Unpacker};
