//! Synthetic packet builder
//!
//! Produces well-formed XT-32 packets for tests without a sensor.

use bytes::{BufMut, Bytes, BytesMut};
use contracts::layout::{
    AZIMUTH_SIZE, BLOCK_SIZE, BODY_SIZE, HEADER_BLOCK_NUM, HEADER_LASER_NUM,
    HEADER_PROTOCOL_MAJOR, HEADER_PROTOCOL_MINOR, HEADER_SIZE, PACKET_SIZE,
    RETURN_MODE_STRONGEST, START_OF_PACKET, TAIL_MOTOR_SPEED, TAIL_RETURN_MODE, TAIL_SEQUENCE,
    TIMESTAMP_PREFIX_SIZE, UNIT_SIZE,
};
use contracts::encode_timestamp_prefix;

const TAIL_START: usize = HEADER_SIZE + BODY_SIZE;

/// Builder for a single synthetic packet
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    buf: Vec<u8>,
}

impl PacketBuilder {
    /// Empty single-return packet: every distance 0, every azimuth 0
    pub fn new() -> Self {
        let mut buf = vec![0u8; PACKET_SIZE];
        buf[..2].copy_from_slice(&START_OF_PACKET);
        buf[HEADER_PROTOCOL_MAJOR] = 6;
        buf[HEADER_PROTOCOL_MINOR] = 1;
        buf[HEADER_LASER_NUM] = 32;
        buf[HEADER_BLOCK_NUM] = 8;
        buf[TAIL_START + TAIL_RETURN_MODE] = RETURN_MODE_STRONGEST;
        Self { buf }
    }

    /// Set the raw azimuth of `block`
    pub fn azimuth(mut self, block: usize, raw: u16) -> Self {
        let start = HEADER_SIZE + block * BLOCK_SIZE;
        self.buf[start..start + 2].copy_from_slice(&raw.to_le_bytes());
        self
    }

    /// Set one laser unit
    pub fn laser(mut self, block: usize, laser: usize, distance: u16, reflectivity: u8) -> Self {
        let start = HEADER_SIZE + block * BLOCK_SIZE + AZIMUTH_SIZE + laser * UNIT_SIZE;
        self.buf[start..start + 2].copy_from_slice(&distance.to_le_bytes());
        self.buf[start + 2] = reflectivity;
        self
    }

    pub fn return_mode(mut self, byte: u8) -> Self {
        self.buf[TAIL_START + TAIL_RETURN_MODE] = byte;
        self
    }

    pub fn motor_speed(mut self, rpm: u16) -> Self {
        let start = TAIL_START + TAIL_MOTOR_SPEED;
        self.buf[start..start + 2].copy_from_slice(&rpm.to_le_bytes());
        self
    }

    pub fn sequence(mut self, sequence: u32) -> Self {
        let start = TAIL_START + TAIL_SEQUENCE;
        self.buf[start..start + 4].copy_from_slice(&sequence.to_le_bytes());
        self
    }

    pub fn build(self) -> Bytes {
        Bytes::from(self.buf)
    }
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One on-disk record: timestamp prefix followed by the packet
pub fn record(timestamp: f64, packet: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(TIMESTAMP_PREFIX_SIZE + packet.len());
    buf.put_slice(&encode_timestamp_prefix(timestamp));
    buf.put_slice(packet);
    buf.freeze()
}
