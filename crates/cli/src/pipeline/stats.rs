//! Run statistics and summaries.

use std::path::PathBuf;
use std::time::Duration;

use ingestion::MetricsSnapshot;
use observability::CaptureMetricsAggregator;
use storage::PersistStats;
use unpacker::UnpackReport;

/// Statistics from a capture run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Session directory holding the raw files
    pub capture_dir: PathBuf,

    /// Total duration of the capture
    pub duration: Duration,

    /// Receiver and queue counters
    pub ingestion: MetricsSnapshot,

    /// Persister counters
    pub persist: PersistStats,

    /// Periodic samples (rate, queue depth)
    pub capture_metrics: CaptureMetricsAggregator,
}

impl PipelineStats {
    /// Average packets persisted per second
    pub fn pps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.persist.persisted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Every enqueued packet was either persisted, evicted, or lost to a write error
    pub fn is_conserved(&self) -> bool {
        self.ingestion.packets_enqueued
            == self.persist.persisted + self.ingestion.packets_dropped + self.persist.write_failures
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n================================================================");
        println!("                     Capture Statistics");
        println!("================================================================\n");

        println!("Overview");
        println!("   |- Directory: {}", self.capture_dir.display());
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Packets persisted: {}", self.persist.persisted);
        println!("   |- Files opened: {}", self.persist.files_opened);
        println!("   |- Bytes written: {}", self.persist.bytes_written);
        println!("   `- Packets/s: {:.1}", self.pps());

        println!("\nReceiver");
        println!("   |- Datagrams received: {}", self.ingestion.packets_received);
        println!("   |- Malformed (dropped): {}", self.ingestion.packets_malformed);
        println!("   |- Socket errors: {}", self.ingestion.socket_errors);
        println!("   |- Enqueued: {}", self.ingestion.packets_enqueued);
        println!("   `- Evicted (drop_oldest): {}", self.ingestion.packets_dropped);

        let summary = self.capture_metrics.summary();
        println!("\nQueue");
        println!("   |- Receive rate (pkt/s): {}", summary.rate_pps);
        println!("   `- Depth: {}", summary.queue_depth);

        if self.persist.write_failures > 0 {
            println!("\nWARNING: {} packets lost to write errors", self.persist.write_failures);
        }
        println!();
    }
}

/// Print the unpack report for humans
pub fn print_unpack_summary(report: &UnpackReport, elapsed: Duration) {
    println!("\n================================================================");
    println!("                      Unpack Statistics");
    println!("================================================================\n");

    println!("Overview");
    println!("   |- Files: {}", report.files);
    println!("   |- Records: {}", report.records);
    println!("   |- Frames written: {}", report.frames_written);
    println!("   |- Points written: {}", report.points_written);
    println!("   `- Duration: {:.2}s", elapsed.as_secs_f64());

    if !report.is_clean() {
        println!("\nSkipped records: {}", report.skipped_count());
        for (class, count) in report.skipped_by_class() {
            println!("   |- {class}: {count}");
        }
        for skip in report.skipped.iter().take(10) {
            let offset = skip
                .offset
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("   |  {} @ {}: {}", skip.file.display(), offset, skip.reason);
        }
        if report.skipped.len() > 10 {
            println!("   `- ... {} more", report.skipped.len() - 10);
        }
    }
    println!();
}
