//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{BackpressurePolicy, FrameFormat};
use std::path::PathBuf;

/// XT-32 Capture - record and unpack Hesai XT-32 LiDAR packets
#[derive(Parser, Debug)]
#[command(
    name = "xt32-capture",
    author,
    version,
    about = "Hesai XT-32 packet capture and point cloud unpacker",
    long_about = "Records raw XT-32 UDP packets to timestamped capture files, and converts \n\
                  those files offline into one point cloud file per packet."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "XT32_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "XT32_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true, env = "XT32_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "XT32_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture live packets into <DIRECTORY>/<start time>/
    Read(ReadArgs),

    /// Convert every *.bin capture in <DIRECTORY> into frame files
    Unpack(UnpackArgs),
}

/// Arguments for the `read` command
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    /// Base directory for capture sessions
    pub directory: PathBuf,

    /// UDP port the sensor streams to
    #[arg(long, env = "XT32_PORT")]
    pub port: Option<u16>,

    /// Local address to bind
    #[arg(long, env = "XT32_BIND")]
    pub bind: Option<String>,

    /// Capture queue capacity (packets)
    #[arg(long, env = "XT32_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Behavior when the capture queue is full
    #[arg(long, value_enum, env = "XT32_BACKPRESSURE")]
    pub backpressure: Option<Backpressure>,

    /// Packets per raw file before rotating
    #[arg(long, env = "XT32_PACKETS_PER_FILE")]
    pub packets_per_file: Option<u64>,

    /// Stop after this many seconds (default: run until Ctrl+C / SIGTERM)
    #[arg(long, env = "XT32_DURATION")]
    pub duration: Option<u64>,
}

/// Arguments for the `unpack` command
#[derive(Parser, Debug, Clone)]
pub struct UnpackArgs {
    /// Directory holding *.bin capture files
    pub directory: PathBuf,

    /// Output root for the per-minute frame directories (default: <DIRECTORY>)
    #[arg(short, long, env = "XT32_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Frame file format
    #[arg(long, value_enum, env = "XT32_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Worker threads
    #[arg(short, long, env = "XT32_JOBS")]
    pub jobs: Option<usize>,

    /// Print the unpack report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 65 if any record was skipped
    #[arg(long)]
    pub fail_on_skip: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Queue-full behavior
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Backpressure {
    /// Wait for the persister (no loss inside the queue)
    Block,
    /// Evict the oldest queued packet
    DropOldest,
}

impl From<Backpressure> for BackpressurePolicy {
    fn from(policy: Backpressure) -> Self {
        match policy {
            Backpressure::Block => Self::Block,
            Backpressure::DropOldest => Self::DropOldest,
        }
    }
}

/// Frame file format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// x,y,z,intensity rows
    Csv,
    /// ASCII PLY point cloud
    Ply,
}

impl From<OutputFormat> for FrameFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Ply => Self::Ply,
        }
    }
}
