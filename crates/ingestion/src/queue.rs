//! Capture queue
//!
//! Bounded single-producer/single-consumer channel between the Receiver and the
//! Persister. The producer side applies the configured backpressure policy.

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{BackpressurePolicy, CapturedPacket, QueueConfig};
use tracing::trace;

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Create the capture queue
///
/// The returned receiver belongs to the Persister. The channel closes once the
/// `CaptureSender` is dropped, after which the receiver drains what is left.
pub fn capture_queue(
    config: &QueueConfig,
    metrics: Arc<IngestionMetrics>,
) -> (CaptureSender, Receiver<CapturedPacket>) {
    let (tx, rx) = bounded(config.capacity.max(1));
    let evict = match config.backpressure {
        BackpressurePolicy::DropOldest => Some(rx.clone()),
        BackpressurePolicy::Block => None,
    };
    let sender = CaptureSender {
        tx,
        evict,
        policy: config.backpressure,
        metrics,
    };
    (sender, rx)
}

/// Producer handle of the capture queue
pub struct CaptureSender {
    tx: Sender<CapturedPacket>,
    /// Receiver clone used only to evict the oldest entry
    evict: Option<Receiver<CapturedPacket>>,
    policy: BackpressurePolicy,
    metrics: Arc<IngestionMetrics>,
}

impl CaptureSender {
    /// Push one packet according to the backpressure policy
    ///
    /// # Errors
    /// `ChannelClosed` if the consumer is gone.
    pub async fn push(&self, packet: CapturedPacket) -> Result<()> {
        match self.policy {
            BackpressurePolicy::Block => self
                .tx
                .send(packet)
                .await
                .map_err(|_| IngestionError::ChannelClosed)?,
            BackpressurePolicy::DropOldest => self.push_drop_oldest(packet)?,
        }
        self.metrics.record_enqueued();
        self.metrics.update_queue_len(self.tx.len());
        Ok(())
    }

    fn push_drop_oldest(&self, mut packet: CapturedPacket) -> Result<()> {
        loop {
            match self.tx.try_send(packet) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(rejected)) => {
                    packet = rejected;
                    let evicted = self.evict.as_ref().and_then(|rx| rx.try_recv().ok());
                    if let Some(oldest) = evicted {
                        self.metrics.record_dropped();
                        trace!(timestamp = oldest.timestamp, "queue full, oldest packet dropped");
                    }
                }
                Err(TrySendError::Closed(_)) => return Err(IngestionError::ChannelClosed),
            }
        }
    }

    /// Packets currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn policy(&self) -> BackpressurePolicy {
        self.policy
    }
}
