//! Configuration validation
//!
//! Rules:
//! - bind_address is an IP address (port 0 requests an ephemeral port)
//! - recv_buffer_size can hold a full packet
//! - queue capacity, packets_per_file and jobs are > 0
//! - an elevation override has exactly 32 finite angles

use std::net::IpAddr;

use contracts::layout::{LASER_COUNT, PACKET_SIZE};
use contracts::{CaptureConfig, ContractError};

/// Validate a CaptureConfig
///
/// Returns the first error encountered.
pub fn validate(config: &CaptureConfig) -> Result<(), ContractError> {
    validate_capture(config)?;
    validate_queue(config)?;
    validate_persist(config)?;
    validate_unpack(config)?;
    validate_calibration(config)?;
    Ok(())
}

fn validate_capture(config: &CaptureConfig) -> Result<(), ContractError> {
    let capture = &config.capture;
    if capture.bind_address.parse::<IpAddr>().is_err() {
        return Err(ContractError::config_validation(
            "capture.bind_address",
            format!("'{}' is not an IP address", capture.bind_address),
        ));
    }
    if capture.recv_buffer_size <= PACKET_SIZE {
        return Err(ContractError::config_validation(
            "capture.recv_buffer_size",
            format!(
                "must be > {PACKET_SIZE} to detect oversized datagrams, got {}",
                capture.recv_buffer_size
            ),
        ));
    }
    Ok(())
}

fn validate_queue(config: &CaptureConfig) -> Result<(), ContractError> {
    if config.queue.capacity == 0 {
        return Err(ContractError::config_validation(
            "queue.capacity",
            "capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_persist(config: &CaptureConfig) -> Result<(), ContractError> {
    if config.persist.packets_per_file == 0 {
        return Err(ContractError::config_validation(
            "persist.packets_per_file",
            "packets_per_file must be > 0",
        ));
    }
    Ok(())
}

fn validate_unpack(config: &CaptureConfig) -> Result<(), ContractError> {
    if config.unpack.jobs == 0 {
        return Err(ContractError::config_validation(
            "unpack.jobs",
            "jobs must be > 0",
        ));
    }
    Ok(())
}

fn validate_calibration(config: &CaptureConfig) -> Result<(), ContractError> {
    let Some(angles) = &config.calibration.elevation_deg else {
        return Ok(());
    };
    if angles.len() != LASER_COUNT {
        return Err(ContractError::config_validation(
            "calibration.elevation_deg",
            format!("expected {LASER_COUNT} angles, got {}", angles.len()),
        ));
    }
    if let Some(idx) = angles.iter().position(|a| !a.is_finite()) {
        return Err(ContractError::config_validation(
            format!("calibration.elevation_deg[{idx}]"),
            "angle must be finite",
        ));
    }
    Ok(())
}
