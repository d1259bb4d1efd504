//! Live capture metrics
//!
//! Periodic samples of the receiver/queue/persister counters, exported as gauges and
//! aggregated in memory for the end-of-run summary.

use metrics::{gauge, histogram};

/// Counter values observed at one sampling tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureSample {
    /// Seconds since the previous sample
    pub interval_sec: f64,
    pub received: u64,
    pub malformed: u64,
    pub enqueued: u64,
    pub dropped: u64,
    pub persisted: u64,
    pub queue_len: usize,
}

/// Export one sample
///
/// Counters are already published at their source; this adds the derived rates.
pub fn record_capture_sample(sample: &CaptureSample, rate_pps: f64) {
    gauge!("xt32_capture_rate_pps").set(rate_pps);
    gauge!("xt32_capture_queue_depth").set(sample.queue_len as f64);
    histogram!("xt32_capture_queue_depth_hist").record(sample.queue_len as f64);
    gauge!("xt32_capture_backlog").set(sample.enqueued.saturating_sub(sample.persisted) as f64);
}

/// Capture metrics aggregator
///
/// Turns cumulative counter samples into rate and depth statistics.
#[derive(Debug, Clone, Default)]
pub struct CaptureMetricsAggregator {
    last: CaptureSample,
    pub samples: u64,
    /// Packets per second between consecutive samples
    pub rate_stats: RunningStats,
    /// Queue length at each sample
    pub queue_stats: RunningStats,
}

impl CaptureMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a new sample, returning the receive rate since the previous one
    pub fn update(&mut self, sample: CaptureSample) -> f64 {
        let delta = sample.received.saturating_sub(self.last.received);
        let rate = if sample.interval_sec > 0.0 {
            delta as f64 / sample.interval_sec
        } else {
            0.0
        };

        self.samples += 1;
        self.rate_stats.push(rate);
        self.queue_stats.push(sample.queue_len as f64);
        self.last = sample;
        record_capture_sample(&sample, rate);
        rate
    }

    /// Most recent sample
    pub fn last(&self) -> &CaptureSample {
        &self.last
    }

    /// Generate summary report
    pub fn summary(&self) -> CaptureSummary {
        let last = &self.last;
        CaptureSummary {
            received: last.received,
            malformed: last.malformed,
            enqueued: last.enqueued,
            dropped: last.dropped,
            persisted: last.persisted,
            loss_rate: if last.enqueued > 0 {
                last.dropped as f64 / last.enqueued as f64 * 100.0
            } else {
                0.0
            },
            rate_pps: StatsSummary::from(&self.rate_stats),
            queue_depth: StatsSummary::from(&self.queue_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Capture summary
#[derive(Debug, Clone, Default)]
pub struct CaptureSummary {
    pub received: u64,
    pub malformed: u64,
    pub enqueued: u64,
    pub dropped: u64,
    pub persisted: u64,
    pub loss_rate: f64,
    pub rate_pps: StatsSummary,
    pub queue_depth: StatsSummary,
}

impl std::fmt::Display for CaptureSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Capture Metrics Summary ===")?;
        writeln!(f, "Datagrams received: {}", self.received)?;
        writeln!(f, "Malformed datagrams: {}", self.malformed)?;
        writeln!(f, "Packets enqueued: {}", self.enqueued)?;
        writeln!(
            f,
            "Packets dropped (queue): {} ({:.2}%)",
            self.dropped, self.loss_rate
        )?;
        writeln!(f, "Packets persisted: {}", self.persisted)?;
        writeln!(f, "Receive rate (pkt/s): {}", self.rate_pps)?;
        writeln!(f, "Queue depth: {}", self.queue_depth)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
