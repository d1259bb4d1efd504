//! Rotating raw capture file writer
//!
//! Records are the 17-byte timestamp prefix followed by the packet, back to back with
//! no length framing. Files are named after the local minute they were opened in and
//! are opened in append mode, so a rotation within the same minute keeps growing the
//! same file.
//!
//! Each record reaches the file in a single `write_all` on an unbuffered handle. A
//! failed write is cut back to the last whole record, so readers can always walk the
//! file at a fixed stride.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::layout::RECORD_SIZE;
use contracts::CapturedPacket;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StorageError};

/// Raw file name pattern (local time)
pub const RAW_FILE_FORMAT: &str = "%Y-%m-%d_%H%M";

/// File that records are appended to and can be cut back to a known length
trait RecordTarget: Write {
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl RecordTarget for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

#[derive(Debug)]
struct AppendFailure {
    source: io::Error,
    /// Target is back on the last record boundary
    rolled_back: bool,
}

/// Append one whole record, or leave the target at `committed` bytes
fn append_record<T: RecordTarget>(
    target: &mut T,
    committed: &mut u64,
    record: &[u8],
) -> std::result::Result<(), AppendFailure> {
    match target.write_all(record) {
        Ok(()) => {
            *committed += record.len() as u64;
            Ok(())
        }
        Err(source) => {
            let rolled_back = target.truncate(*committed).is_ok();
            Err(AppendFailure {
                source,
                rolled_back,
            })
        }
    }
}

fn minute_file_stem() -> String {
    Local::now().format(RAW_FILE_FORMAT).to_string()
}

struct OpenFile {
    path: PathBuf,
    handle: File,
    /// Length of the file up to its last whole record
    committed: u64,
    packets: u64,
}

/// Append-only writer that rotates after a fixed number of packets
pub struct RotatingRawWriter {
    dir: PathBuf,
    packets_per_file: u64,
    current: Option<OpenFile>,
    record: Vec<u8>,
    file_stem: fn() -> String,
    /// Files left with a partial record that could not be cut off
    damaged: HashSet<PathBuf>,
}

impl RotatingRawWriter {
    /// Create the capture directory (if needed); no file is opened until the first write
    pub fn new(dir: impl Into<PathBuf>, packets_per_file: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            packets_per_file: packets_per_file.max(1),
            current: None,
            record: Vec::with_capacity(RECORD_SIZE),
            file_stem: minute_file_stem,
            damaged: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File currently receiving packets
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    /// Write one record, rotating first if the threshold is reached
    ///
    /// Returns `true` if a new file was opened for this record. On `Ok` the record is
    /// in the file; on `Err` none of it is, and the next call reopens a file.
    pub fn write(&mut self, packet: &CapturedPacket) -> Result<bool> {
        let rotated = match &self.current {
            Some(file) => file.packets >= self.packets_per_file,
            None => true,
        };
        if rotated {
            self.close()?;
            self.current = Some(self.open_next()?);
        }

        self.record.clear();
        self.record.extend_from_slice(&packet.prefix());
        self.record.extend_from_slice(&packet.data);

        let Some(file) = self.current.as_mut() else {
            return Ok(rotated);
        };
        if let Err(failure) = append_record(&mut file.handle, &mut file.committed, &self.record) {
            let path = file.path.clone();
            if failure.rolled_back {
                warn!(path = %path.display(), committed = file.committed, "partial record removed");
            } else {
                error!(path = %path.display(), "partial record left in file, switching to a new file");
                self.damaged.insert(path.clone());
            }
            self.current = None;
            return Err(StorageError::Write {
                path,
                source: failure.source,
            });
        }
        file.packets += 1;
        Ok(rotated)
    }

    /// Close the current file (no-op if none is open)
    pub fn close(&mut self) -> Result<()> {
        let Some(file) = self.current.take() else {
            return Ok(());
        };
        debug!(
            path = %file.path.display(),
            packets = file.packets,
            bytes = file.committed,
            "capture file closed"
        );
        Ok(())
    }

    fn next_path(&self) -> PathBuf {
        let stem = (self.file_stem)();
        let mut path = self.dir.join(format!("{stem}.bin"));
        let mut n = 1;
        while self.damaged.contains(&path) {
            path = self.dir.join(format!("{stem}_{n}.bin"));
            n += 1;
        }
        path
    }

    fn open_next(&self) -> Result<OpenFile> {
        let path = self.next_path();
        let open_err = |source: io::Error| StorageError::Open {
            path: path.clone(),
            source,
        };
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;
        let committed = handle.metadata().map_err(open_err)?.len();
        info!(path = %path.display(), existing_bytes = committed, "saving capture to file");
        Ok(OpenFile {
            path,
            handle,
            committed,
            packets: 0,
        })
    }
}
