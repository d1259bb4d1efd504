//! Pipeline orchestrator - wires Receiver → CaptureQueue → Persister.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{CaptureConfig, ContractError};
use ingestion::{capture_queue, IngestionMetrics, PacketReceiver};
use observability::{CaptureMetricsAggregator, CaptureSample};
use storage::{Persister, PersisterMetrics};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated tool configuration
    pub capture: CaptureConfig,

    /// Session directory receiving the raw files
    pub capture_dir: PathBuf,

    /// Stop after this long (None = until shutdown)
    pub duration: Option<Duration>,

    /// Metrics sampling period
    pub sample_interval: Duration,
}

impl PipelineConfig {
    pub fn new(capture: CaptureConfig, capture_dir: PathBuf) -> Self {
        Self {
            capture,
            capture_dir,
            duration: None,
            sample_interval: Duration::from_secs(5),
        }
    }
}

/// Live capture orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the duration limit elapses, or the receiver fails
    ///
    /// Stopping is cooperative: the receiver is signalled, drops its queue sender, and the
    /// persister drains what is queued before closing its file.
    #[instrument(
        name = "pipeline_run",
        skip_all,
        fields(dir = %self.config.capture_dir.display())
    )]
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.capture;

        let ingestion_metrics = Arc::new(IngestionMetrics::new());
        let receiver = PacketReceiver::bind(&config.capture, Arc::clone(&ingestion_metrics))
            .await
            .map_err(ContractError::from)
            .context("Failed to open capture socket")?;
        let local_addr = receiver.local_addr();

        let (queue_tx, queue_rx) = capture_queue(&config.queue, Arc::clone(&ingestion_metrics));
        let queue_probe = queue_rx.clone();
        let persister = Persister::spawn(queue_rx, self.config.capture_dir.clone(), &config.persist)
            .map_err(ContractError::from)
            .context("Failed to start persister")?;
        let persist_metrics = Arc::clone(persister.metrics());

        info!(
            local_addr = %local_addr,
            queue_capacity = config.queue.capacity,
            backpressure = ?config.queue.backpressure,
            packets_per_file = config.persist.packets_per_file,
            duration_secs = ?self.config.duration.map(|d| d.as_secs()),
            "Capture running"
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut receiver_task = tokio::spawn(receiver.run(queue_tx, stop_rx));

        let deadline = async {
            match self.config.duration {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        let mut aggregator = CaptureMetricsAggregator::new();
        let mut ticker = tokio::time::interval(self.config.sample_interval);
        ticker.tick().await;
        let mut last_tick = Instant::now();
        let mut finished_early = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal, stopping capture...");
                    break;
                }
                _ = &mut deadline => {
                    info!("Capture duration reached");
                    break;
                }
                joined = &mut receiver_task => {
                    warn!("Receiver stopped unexpectedly");
                    finished_early = Some(joined);
                    break;
                }
                _ = ticker.tick() => {
                    let current = sample(
                        &ingestion_metrics,
                        &persist_metrics,
                        queue_probe.len(),
                        last_tick.elapsed(),
                    );
                    last_tick = Instant::now();
                    let rate = aggregator.update(current);
                    info!(
                        received = current.received,
                        persisted = current.persisted,
                        dropped = current.dropped,
                        queue_len = current.queue_len,
                        rate_pps = format!("{rate:.1}"),
                        "Capture progress"
                    );
                }
            }
        }

        // Shutdown
        info!("Shutting down capture...");
        let _ = stop_tx.send(true);
        let joined = match finished_early {
            Some(joined) => joined,
            None => receiver_task.await,
        };

        // The persister must drain and close its file even if the receiver failed
        let persist_stats = persister.join().await.map_err(ContractError::from);
        joined
            .context("Receiver task panicked")?
            .map_err(ContractError::from)
            .context("Receiver failed")?;
        let persist_stats = persist_stats.context("Persister failed")?;

        aggregator.update(sample(
            &ingestion_metrics,
            &persist_metrics,
            queue_probe.len(),
            last_tick.elapsed(),
        ));

        let stats = PipelineStats {
            capture_dir: self.config.capture_dir.clone(),
            duration: start_time.elapsed(),
            ingestion: ingestion_metrics.snapshot(),
            persist: persist_stats,
            capture_metrics: aggregator,
        };
        debug!(conserved = stats.is_conserved(), "capture accounting checked");
        if !stats.is_conserved() {
            warn!(
                enqueued = stats.ingestion.packets_enqueued,
                persisted = stats.persist.persisted,
                dropped = stats.ingestion.packets_dropped,
                "Capture counters do not balance"
            );
        }

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            pps = format!("{:.1}", stats.pps()),
            "Capture shutdown complete"
        );
        Ok(stats)
    }
}

fn sample(
    ingestion: &IngestionMetrics,
    persist: &PersisterMetrics,
    queue_len: usize,
    interval: Duration,
) -> CaptureSample {
    let snapshot = ingestion.snapshot();
    CaptureSample {
        interval_sec: interval.as_secs_f64(),
        received: snapshot.packets_received,
        malformed: snapshot.packets_malformed,
        enqueued: snapshot.packets_enqueued,
        dropped: snapshot.packets_dropped,
        persisted: persist.persisted(),
        queue_len,
    }
}
