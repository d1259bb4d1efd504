//! Fixed XT-32 wire and capture-file layout.
//!
//! ```text
//! record  = prefix(17) | packet(1080)
//! packet  = header(12) | block(130) x 8 | tail(28)
//! block   = azimuth(u16 LE) | unit(4) x 32
//! unit    = distance(u16 LE) | reflectivity(u8) | reserved(u8)
//! ```

/// ASCII `%.6f` arrival timestamp written before every packet on disk
pub const TIMESTAMP_PREFIX_SIZE: usize = 17;

/// Pre-header (6) + header (6)
pub const HEADER_SIZE: usize = 12;

/// Blocks per packet
pub const BLOCK_COUNT: usize = 8;

/// Laser channels per block
pub const LASER_COUNT: usize = 32;

pub const AZIMUTH_SIZE: usize = 2;
pub const UNIT_SIZE: usize = 4;
pub const BLOCK_SIZE: usize = AZIMUTH_SIZE + UNIT_SIZE * LASER_COUNT;
pub const BODY_SIZE: usize = BLOCK_SIZE * BLOCK_COUNT;
pub const TAIL_SIZE: usize = 28;

/// Size of one UDP payload
pub const PACKET_SIZE: usize = HEADER_SIZE + BODY_SIZE + TAIL_SIZE;

/// Stride between consecutive packets in a raw capture file
pub const RECORD_SIZE: usize = TIMESTAMP_PREFIX_SIZE + PACKET_SIZE;

/// Receive buffer used by the capture socket
pub const MAX_DATAGRAM_SIZE: usize = 2000;

/// Start-of-packet marker (bytes 0..2)
pub const START_OF_PACKET: [u8; 2] = [0xEE, 0xFF];

/// Azimuth units per revolution (hundredths of a degree)
pub const ROTATION_MAX_UNITS: u16 = 36000;

/// Meters per raw distance unit
pub const DISTANCE_RESOLUTION_M: f64 = 0.004;

// Header offsets (from packet start)
pub const HEADER_PROTOCOL_MAJOR: usize = 2;
pub const HEADER_PROTOCOL_MINOR: usize = 3;
pub const HEADER_LASER_NUM: usize = 6;
pub const HEADER_BLOCK_NUM: usize = 7;

// Tail offsets (from tail start)
pub const TAIL_RETURN_MODE: usize = 10;
pub const TAIL_MOTOR_SPEED: usize = 11;
pub const TAIL_UTC: usize = 13;
pub const TAIL_TIMESTAMP_US: usize = 19;
pub const TAIL_FACTORY: usize = 23;
pub const TAIL_SEQUENCE: usize = 24;

// Return mode byte values
pub const RETURN_MODE_STRONGEST: u8 = 0x37;
pub const RETURN_MODE_LAST: u8 = 0x38;
pub const RETURN_MODE_DUAL: u8 = 0x39;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(BLOCK_SIZE, 130);
        assert_eq!(BODY_SIZE, 1040);
        assert_eq!(PACKET_SIZE, 1080);
        assert_eq!(RECORD_SIZE, 1097);
        assert_eq!(TAIL_SEQUENCE + 4, TAIL_SIZE);
    }
}
