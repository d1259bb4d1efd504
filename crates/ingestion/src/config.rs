//! Capture metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use metrics::{counter, gauge};

/// Receiver and queue metrics
///
/// Atomics back the end-of-run report; the `metrics` facade mirrors them for export.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Datagrams read from the socket
    pub packets_received: AtomicU64,

    /// Datagrams dropped for having the wrong size
    pub packets_malformed: AtomicU64,

    /// Receive calls that returned an error
    pub socket_errors: AtomicU64,

    /// Packets accepted by the capture queue
    pub packets_enqueued: AtomicU64,

    /// Queued packets evicted under drop-oldest backpressure
    pub packets_dropped: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record datagram received
    pub fn record_received(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_packets_received_total").increment(1);
    }

    /// Record malformed datagram
    pub fn record_malformed(&self) {
        self.packets_malformed.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_packets_malformed_total").increment(1);
    }

    /// Record socket error
    pub fn record_socket_error(&self) {
        self.socket_errors.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_socket_errors_total").increment(1);
    }

    /// Record packet enqueued
    pub fn record_enqueued(&self) {
        self.packets_enqueued.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_packets_enqueued_total").increment(1);
    }

    /// Record packet evicted from the queue
    pub fn record_dropped(&self) {
        self.packets_dropped.fetch_add(1, Ordering::Relaxed);
        counter!("xt32_packets_dropped_total").increment(1);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
        gauge!("xt32_capture_queue_depth").set(len as f64);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            packets_malformed: self.packets_malformed.load(Ordering::Relaxed),
            socket_errors: self.socket_errors.load(Ordering::Relaxed),
            packets_enqueued: self.packets_enqueued.load(Ordering::Relaxed),
            packets_dropped: self.packets_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets_received: u64,
    pub packets_malformed: u64,
    pub socket_errors: u64,
    pub packets_enqueued: u64,
    pub packets_dropped: u64,
    pub queue_len: usize,
}
