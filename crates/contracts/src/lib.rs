//! # Contracts
//!
//! Shared interface contracts for the capture and unpack crates.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall-clock arrival time, seconds since the Unix epoch (`f64`), is the only clock
//! - On disk the arrival time is stored as a fixed-width ASCII prefix before each packet

mod config;
mod error;
mod frame;
pub mod layout;
mod packet;
mod sink;

pub use config::*;
pub use error::*;
pub use frame::*;
pub use packet::*;
pub use sink::FrameSink;
