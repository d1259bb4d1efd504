//! # Decoder
//!
//! XT-32 packet decoding and point conversion.
//!
//! Responsibilities:
//! - Calibration tables (elevation angles, reflectivity curve)
//! - Fixed-layout packet decoding with framing checks
//! - Spherical to Cartesian transform
//! - One packet → one `Frame`
//!
//! ## Usage Example
//!
//! ```
//! use decoder::{decode_frame, mock::PacketBuilder, Calibration};
//!
//! let calibration = Calibration::xt32();
//! let packet = PacketBuilder::new().azimuth(0, 9000).laser(0, 15, 250, 12).build();
//! let frame = decode_frame(&calibration, 0, None, &packet).unwrap();
//! assert_eq!(frame.points.len(), 1);
//! ```

pub mod calibration;
mod frame;
pub mod mock;
mod packet;
mod transform;

pub use calibration::Calibration;
pub use frame::{build_frame, decode_frame};
pub use packet::{
    decode_packet, normalize_azimuth, DecodedPacket, LaserReturn, PacketHeader, PacketTail,
    ReturnMode,
};
pub use transform::transform;
