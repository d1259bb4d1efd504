//! XT-32 packet decoder
//!
//! Splits one fixed-size packet into header, 8 azimuth blocks and tail.
//! Nothing is read before the length and start-of-packet checks pass.

use bytes::Buf;
use contracts::layout::{
    BLOCK_COUNT, BLOCK_SIZE, BODY_SIZE, HEADER_BLOCK_NUM, HEADER_LASER_NUM, HEADER_PROTOCOL_MAJOR,
    HEADER_PROTOCOL_MINOR, HEADER_SIZE, LASER_COUNT, PACKET_SIZE, RETURN_MODE_DUAL,
    RETURN_MODE_LAST, RETURN_MODE_STRONGEST, ROTATION_MAX_UNITS, START_OF_PACKET,
    TAIL_RETURN_MODE,
};
use contracts::ContractError;

/// One laser unit of a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaserReturn {
    /// Raw distance, 4 mm units; 0 means no return
    pub distance: u16,
    /// Raw reflectivity byte
    pub reflectivity: u8,
}

/// Echo mode from the tail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    Strongest,
    Last,
    /// Last + strongest; adjacent block pairs share an azimuth
    Dual,
}

impl ReturnMode {
    pub fn from_byte(byte: u8) -> Result<Self, ContractError> {
        match byte {
            RETURN_MODE_STRONGEST => Ok(Self::Strongest),
            RETURN_MODE_LAST => Ok(Self::Last),
            RETURN_MODE_DUAL => Ok(Self::Dual),
            other => Err(ContractError::UnsupportedReturnMode(other)),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Strongest => RETURN_MODE_STRONGEST,
            Self::Last => RETURN_MODE_LAST,
            Self::Dual => RETURN_MODE_DUAL,
        }
    }
}

/// Header fields the decoder exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub protocol_major: u8,
    pub protocol_minor: u8,
    pub laser_num: u8,
    pub block_num: u8,
}

/// Tail fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTail {
    pub return_mode: ReturnMode,
    pub motor_speed_rpm: u16,
    /// year-1900, month, day, hour, minute, second
    pub utc: [u8; 6],
    pub timestamp_us: u32,
    pub factory: u8,
    pub sequence: u32,
}

/// Fully decoded packet
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub header: PacketHeader,

    /// Per-block azimuth, hundredths of a degree in [0, 36000)
    pub azimuths: [u16; BLOCK_COUNT],

    /// `returns[block][laser]`
    pub returns: [[LaserReturn; LASER_COUNT]; BLOCK_COUNT],

    pub tail: PacketTail,
}

impl DecodedPacket {
    /// Iterate `(azimuth, laser, return)` in block-major, laser-minor order
    pub fn iter_returns(&self) -> impl Iterator<Item = (u16, usize, LaserReturn)> + '_ {
        self.azimuths
            .iter()
            .zip(self.returns.iter())
            .flat_map(|(&azimuth, block)| {
                block
                    .iter()
                    .enumerate()
                    .map(move |(laser, &unit)| (azimuth, laser, unit))
            })
    }
}

/// Wrap any azimuth reading into [0, 36000)
pub fn normalize_azimuth(raw: i64) -> u16 {
    raw.rem_euclid(ROTATION_MAX_UNITS as i64) as u16
}

/// Decode one packet
///
/// # Errors
/// - `Framing` if `data` is not exactly `PACKET_SIZE` bytes
/// - `BadStartOfPacket` if the marker is missing
/// - `UnsupportedReturnMode` for echo modes other than strongest/last/dual
pub fn decode_packet(data: &[u8]) -> Result<DecodedPacket, ContractError> {
    if data.len() != PACKET_SIZE {
        return Err(ContractError::framing(PACKET_SIZE, data.len()));
    }
    if data[..2] != START_OF_PACKET {
        return Err(ContractError::BadStartOfPacket {
            found: u16::from_be_bytes([data[0], data[1]]),
        });
    }

    let header = parse_header(&data[..HEADER_SIZE]);
    let tail = parse_tail(&data[HEADER_SIZE + BODY_SIZE..])?;

    let mut azimuths = [0u16; BLOCK_COUNT];
    let mut returns = [[LaserReturn::default(); LASER_COUNT]; BLOCK_COUNT];
    let body = &data[HEADER_SIZE..HEADER_SIZE + BODY_SIZE];

    for (block_index, mut block) in body.chunks_exact(BLOCK_SIZE).enumerate() {
        azimuths[block_index] = normalize_azimuth(block.get_u16_le() as i64);
        for unit in returns[block_index].iter_mut() {
            unit.distance = block.get_u16_le();
            unit.reflectivity = block.get_u8();
            block.advance(1); // reserved
        }
    }

    Ok(DecodedPacket {
        header,
        azimuths,
        returns,
        tail,
    })
}

fn parse_header(header: &[u8]) -> PacketHeader {
    PacketHeader {
        protocol_major: header[HEADER_PROTOCOL_MAJOR],
        protocol_minor: header[HEADER_PROTOCOL_MINOR],
        laser_num: header[HEADER_LASER_NUM],
        block_num: header[HEADER_BLOCK_NUM],
    }
}

fn parse_tail(tail: &[u8]) -> Result<PacketTail, ContractError> {
    let mut cursor = &tail[TAIL_RETURN_MODE..];
    let return_mode = ReturnMode::from_byte(cursor.get_u8())?;
    let motor_speed_rpm = cursor.get_u16_le();
    let mut utc = [0u8; 6];
    cursor.copy_to_slice(&mut utc);
    let timestamp_us = cursor.get_u32_le();
    let factory = cursor.get_u8();
    let sequence = cursor.get_u32_le();

    Ok(PacketTail {
        return_mode,
        motor_speed_rpm,
        utc,
        timestamp_us,
        factory,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::PacketBuilder;

    #[test]
    fn test_azimuth_normalization() {
        assert_eq!(normalize_azimuth(-1), 35999);
        assert_eq!(normalize_azimuth(36000), 0);
        assert_eq!(normalize_azimuth(36050), 50);
        assert_eq!(normalize_azimuth(0), 0);
        assert_eq!(normalize_azimuth(35999), 35999);
        assert_eq!(normalize_azimuth(u16::MAX as i64), 29535);
        for raw in [-1_000_000i64, -36001, -36000, 71999, 72000, 1_234_567] {
            assert!(normalize_azimuth(raw) < ROTATION_MAX_UNITS, "raw {raw}");
        }
    }

    #[test]
    fn test_decode_reads_block_values() {
        let packet = PacketBuilder::new()
            .azimuth(0, 1234)
            .azimuth(7, 36050)
            .laser(0, 0, 500, 10)
            .laser(0, 31, 65535, 255)
            .laser(7, 5, 1, 1)
            .build();

        let decoded = decode_packet(&packet).unwrap();
        assert_eq!(decoded.azimuths[0], 1234);
        assert_eq!(decoded.azimuths[7], 50);
        assert_eq!(
            decoded.returns[0][0],
            LaserReturn {
                distance: 500,
                reflectivity: 10
            }
        );
        assert_eq!(decoded.returns[0][31].distance, 65535);
        assert_eq!(decoded.returns[0][31].reflectivity, 255);
        assert_eq!(decoded.returns[7][5].distance, 1);
        assert_eq!(decoded.returns[3][3], LaserReturn::default());
    }

    #[test]
    fn test_decode_header_and_tail() {
        let packet = PacketBuilder::new()
            .return_mode(RETURN_MODE_DUAL)
            .motor_speed(600)
            .sequence(0xDEADBEEF)
            .build();

        let decoded = decode_packet(&packet).unwrap();
        assert_eq!(decoded.header.laser_num, 32);
        assert_eq!(decoded.header.block_num, 8);
        assert_eq!(decoded.header.protocol_major, 6);
        assert_eq!(decoded.tail.return_mode, ReturnMode::Dual);
        assert_eq!(decoded.tail.motor_speed_rpm, 600);
        assert_eq!(decoded.tail.sequence, 0xDEADBEEF);
    }

    #[test]
    fn test_short_buffer_is_framing_error() {
        let packet = PacketBuilder::new().build();
        let result = decode_packet(&packet[..PACKET_SIZE - 1]);
        assert!(matches!(
            result,
            Err(ContractError::Framing {
                expected: PACKET_SIZE,
                actual
            }) if actual == PACKET_SIZE - 1
        ));
        assert!(decode_packet(&[]).is_err());
    }

    #[test]
    fn test_long_buffer_is_framing_error() {
        let mut packet = PacketBuilder::new().build().to_vec();
        packet.push(0);
        assert!(matches!(
            decode_packet(&packet),
            Err(ContractError::Framing { .. })
        ));
    }

    #[test]
    fn test_bad_start_of_packet() {
        let mut packet = PacketBuilder::new().build().to_vec();
        packet[0] = 0x00;
        assert!(matches!(
            decode_packet(&packet),
            Err(ContractError::BadStartOfPacket { found: 0x00FF })
        ));
    }

    #[test]
    fn test_unsupported_return_mode() {
        let packet = PacketBuilder::new().return_mode(0x3B).build();
        assert!(matches!(
            decode_packet(&packet),
            Err(ContractError::UnsupportedReturnMode(0x3B))
        ));
    }

    #[test]
    fn test_iter_returns_order() {
        let packet = PacketBuilder::new()
            .azimuth(0, 100)
            .azimuth(1, 200)
            .build();
        let decoded = decode_packet(&packet).unwrap();
        let order: Vec<(u16, usize)> = decoded
            .iter_returns()
            .map(|(azimuth, laser, _)| (azimuth, laser))
            .collect();
        assert_eq!(order.len(), BLOCK_COUNT * LASER_COUNT);
        assert_eq!(order[0], (100, 0));
        assert_eq!(order[31], (100, 31));
        assert_eq!(order[32], (200, 0));
    }
}
