//! Persister metrics

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;

/// Counters for the raw-file persister
#[derive(Debug, Default)]
pub struct PersisterMetrics {
    /// Packets written to disk
    persisted: AtomicU64,
    /// Packets lost to write errors
    write_failures: AtomicU64,
    /// Capture files opened (including rotations)
    files_opened: AtomicU64,
    /// Bytes written, prefixes included
    bytes_written: AtomicU64,
}

impl PersisterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persisted(&self) -> u64 {
        self.persisted.load(Ordering::Relaxed)
    }

    pub fn record_persisted(&self, bytes: usize) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        counter!("xt32_packets_persisted_total").increment(1);
        counter!("xt32_bytes_written_total").increment(bytes as u64);
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_persist_failures_total").increment(1);
    }

    pub fn files_opened(&self) -> u64 {
        self.files_opened.load(Ordering::Relaxed)
    }

    pub fn record_file_opened(&self) {
        self.files_opened.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_capture_files_opened_total").increment(1);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> PersistStats {
        PersistStats {
            persisted: self.persisted(),
            write_failures: self.write_failures(),
            files_opened: self.files_opened(),
            bytes_written: self.bytes_written(),
        }
    }
}

/// Snapshot of persister counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PersistStats {
    pub persisted: u64,
    pub write_failures: u64,
    pub files_opened: u64,
    pub bytes_written: u64,
}
