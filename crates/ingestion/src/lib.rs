//! # Ingestion
//!
//! Live capture front half: the UDP [`PacketReceiver`] and the bounded capture queue
//! that hands packets to the Persister.
//!
//! ```ignore
//! use ingestion::{capture_queue, IngestionMetrics, PacketReceiver};
//!
//! let metrics = Arc::new(IngestionMetrics::new());
//! let receiver = PacketReceiver::bind(&config.capture, metrics.clone()).await?;
//! let (tx, rx) = capture_queue(&config.queue, metrics);
//! tokio::spawn(receiver.run(tx, shutdown_rx));
//! // rx goes to storage::Persister
//! ```

mod config;
mod error;
mod queue;
mod receiver;

pub use config::{IngestionMetrics, MetricsSnapshot};
pub use contracts::CapturedPacket;
pub use error::{IngestionError, Result};
pub use queue::{capture_queue, CaptureSender};
pub use receiver::PacketReceiver;
