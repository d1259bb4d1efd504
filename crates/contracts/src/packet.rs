//! CapturedPacket - Receiver output
//!
//! One datagram plus its arrival time, as queued between Receiver and Persister.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::layout::TIMESTAMP_PREFIX_SIZE;

/// Raw packet captured from the network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedPacket {
    /// Wall-clock arrival time (seconds since the Unix epoch)
    pub timestamp: f64,

    /// Raw UDP payload (zero-copy)
    pub data: Bytes,
}

impl CapturedPacket {
    pub fn new(timestamp: f64, data: Bytes) -> Self {
        Self { timestamp, data }
    }

    /// On-disk prefix for this packet
    pub fn prefix(&self) -> [u8; TIMESTAMP_PREFIX_SIZE] {
        encode_timestamp_prefix(self.timestamp)
    }
}

/// Encode a timestamp as the fixed-width `%.6f` ASCII prefix.
///
/// Values wider than the prefix keep their leading digits.
pub fn encode_timestamp_prefix(timestamp: f64) -> [u8; TIMESTAMP_PREFIX_SIZE] {
    let text = format!("{:017.6}", timestamp);
    let mut prefix = [b'0'; TIMESTAMP_PREFIX_SIZE];
    let len = text.len().min(TIMESTAMP_PREFIX_SIZE);
    prefix[..len].copy_from_slice(&text.as_bytes()[..len]);
    prefix
}

/// Parse a timestamp prefix back into seconds; `None` if it is not a finite number.
pub fn parse_timestamp_prefix(prefix: &[u8]) -> Option<f64> {
    std::str::from_utf8(prefix)
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
}
