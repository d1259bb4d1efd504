//! CaptureConfig - Config Loader output
//!
//! Describes the capture socket, queue, persistence, unpack output and calibration overrides.
//! Every section is optional; missing values fall back to the XT-32 defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Live capture socket
    #[serde(default)]
    pub capture: ReceiverConfig,

    /// Capture queue between Receiver and Persister
    #[serde(default)]
    pub queue: QueueConfig,

    /// Raw file persistence
    #[serde(default)]
    pub persist: PersistConfig,

    /// Offline unpack output
    #[serde(default)]
    pub unpack: UnpackConfig,

    /// Calibration overrides
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// UDP receiver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Bind address (wildcard by default)
    pub bind_address: String,

    /// UDP port the sensor streams to
    pub port: u16,

    /// Receive buffer length per datagram
    pub recv_buffer_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 2368,
            recv_buffer_size: crate::layout::MAX_DATAGRAM_SIZE,
        }
    }
}

impl ReceiverConfig {
    /// `address:port` string used for binding and log fields
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Capture queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum queued packets
    pub capacity: usize,

    /// What the receiver does when the queue is full
    pub backpressure: BackpressurePolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 65_536,
            backpressure: BackpressurePolicy::Block,
        }
    }
}

/// Backpressure policy (when the capture queue is full)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Receiver waits for space; no loss inside the queue
    #[default]
    Block,
    /// Evict the oldest queued packet and count it as lost
    DropOldest,
}

/// Raw file persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Packets written before the persister rotates to a new file
    pub packets_per_file: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            packets_per_file: 1_000_000,
        }
    }
}

/// Offline unpack settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnpackConfig {
    /// Frame file format
    pub format: FrameFormat,

    /// Worker threads splitting the input files
    pub jobs: usize,

    /// Output root (defaults to the input directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self {
            format: FrameFormat::Csv,
            jobs: 1,
            output_dir: None,
        }
    }
}

/// Frame file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// `x,y,z,intensity` rows
    #[default]
    Csv,
    /// ASCII PLY with x/y/z/intensity vertex properties
    Ply,
}

impl FrameFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Ply => "ply",
        }
    }
}

/// Calibration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Per-laser elevation angles in degrees (exactly 32 entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_deg: Option<Vec<f64>>,
}
