//! Packet → Frame

use contracts::{ContractError, Frame};
use tracing::trace;

use crate::calibration::Calibration;
use crate::packet::{decode_packet, DecodedPacket};
use crate::transform::transform;

/// Transform every non-zero return of a decoded packet, block-major then laser-minor
pub fn build_frame(
    calibration: &Calibration,
    id: u64,
    captured_at: Option<f64>,
    packet: &DecodedPacket,
) -> Result<Frame, ContractError> {
    let mut frame = Frame::new(id, captured_at);
    for (azimuth, laser, unit) in packet.iter_returns() {
        if unit.distance == 0 {
            continue;
        }
        frame.points.push(transform(
            calibration,
            azimuth,
            unit.distance,
            unit.reflectivity,
            laser,
        )?);
    }
    trace!(frame_id = id, points = frame.len(), "frame built");
    Ok(frame)
}

/// Decode raw packet bytes and build its frame
pub fn decode_frame(
    calibration: &Calibration,
    id: u64,
    captured_at: Option<f64>,
    data: &[u8],
) -> Result<Frame, ContractError> {
    let packet = decode_packet(data)?;
    build_frame(calibration, id, captured_at, &packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::PacketBuilder;

    #[test]
    fn test_all_zero_distances_yield_no_points() {
        let packet = PacketBuilder::new().azimuth(0, 100).build();
        let frame = decode_frame(&Calibration::xt32(), 7, Some(1.0), &packet).unwrap();
        assert_eq!(frame.id, 7);
        assert_eq!(frame.captured_at, Some(1.0));
        assert!(frame.is_empty());
    }

    #[test]
    fn test_points_follow_block_then_laser_order() {
        let calibration = Calibration::xt32();
        let packet = PacketBuilder::new()
            .azimuth(0, 1000)
            .azimuth(2, 2000)
            .laser(2, 0, 300, 3)
            .laser(0, 31, 100, 1)
            .laser(0, 4, 200, 2)
            .build();

        let frame = decode_frame(&calibration, 0, None, &packet).unwrap();
        let expected = vec![
            transform(&calibration, 1000, 200, 2, 4).unwrap(),
            transform(&calibration, 1000, 100, 1, 31).unwrap(),
            transform(&calibration, 2000, 300, 3, 0).unwrap(),
        ];
        assert_eq!(frame.points, expected);
    }

    #[test]
    fn test_framing_error_propagates() {
        let result = decode_frame(&Calibration::xt32(), 0, None, &[0xEE, 0xFF, 0x06]);
        assert!(matches!(result, Err(ContractError::Framing { .. })));
    }
}
