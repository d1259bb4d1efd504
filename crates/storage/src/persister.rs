//! Persister - drains the capture queue into rotating raw files

use std::path::PathBuf;
use std::sync::Arc;

use async_channel::Receiver;
use contracts::{CapturedPacket, PersistConfig};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::error::{Result, StorageError};
use crate::metrics::{PersistStats, PersisterMetrics};
use crate::raw::RotatingRawWriter;

/// Handle to a running persister worker
pub struct Persister {
    dir: PathBuf,
    metrics: Arc<PersisterMetrics>,
    worker_handle: JoinHandle<Result<()>>,
}

impl Persister {
    /// Create the capture directory and spawn the blocking worker
    ///
    /// The worker blocks on the queue (no polling) and exits once every sender is dropped
    /// and the queue is drained.
    ///
    /// # Errors
    /// `CreateDir` if the capture directory cannot be created.
    #[instrument(name = "persister_spawn", skip(rx, config), fields(dir = %dir.display()))]
    pub fn spawn(
        rx: Receiver<CapturedPacket>,
        dir: PathBuf,
        config: &PersistConfig,
    ) -> Result<Self> {
        let writer = RotatingRawWriter::new(dir.clone(), config.packets_per_file)?;
        let metrics = Arc::new(PersisterMetrics::new());
        let worker_metrics = Arc::clone(&metrics);

        let worker_handle =
            tokio::task::spawn_blocking(move || persist_worker(writer, rx, worker_metrics));

        Ok(Self {
            dir,
            metrics,
            worker_handle,
        })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn metrics(&self) -> &Arc<PersisterMetrics> {
        &self.metrics
    }

    /// Wait for the worker to drain the queue and close its file
    #[instrument(name = "persister_join", skip(self))]
    pub async fn join(self) -> Result<PersistStats> {
        match self.worker_handle.await {
            Ok(result) => result?,
            Err(e) => return Err(StorageError::Worker(e.to_string())),
        }
        let stats = self.metrics.snapshot();
        debug!(?stats, "persister joined");
        Ok(stats)
    }
}

fn persist_worker(
    mut writer: RotatingRawWriter,
    rx: Receiver<CapturedPacket>,
    metrics: Arc<PersisterMetrics>,
) -> Result<()> {
    info!(dir = %writer.dir().display(), "persister started");

    while let Ok(packet) = rx.recv_blocking() {
        match writer.write(&packet) {
            Ok(rotated) => {
                if rotated {
                    metrics.record_file_opened();
                }
                metrics.record_persisted(packet.prefix().len() + packet.data.len());
            }
            Err(e) => {
                metrics.record_write_failure();
                error!(error = %e, timestamp = packet.timestamp, "persist failed, packet lost");
            }
        }
    }

    let closed = writer.close();
    if let Err(e) = &closed {
        error!(error = %e, "close failed on shutdown");
    }
    info!(
        persisted = metrics.persisted(),
        failures = metrics.write_failures(),
        files = metrics.files_opened(),
        "persister stopped"
    );
    closed
}
