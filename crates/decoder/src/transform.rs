//! Spherical to Cartesian transform

use contracts::layout::DISTANCE_RESOLUTION_M;
use contracts::{ContractError, Point};

use crate::calibration::Calibration;

/// Convert one laser return into a point.
///
/// `azimuth` is in hundredths of a degree, `distance` in raw 4 mm units.
/// Zero distance is not special-cased here; callers drop those returns first.
///
/// # Errors
/// `CalibrationLookup` if `laser` or `reflectivity` fall outside the tables.
pub fn transform(
    calibration: &Calibration,
    azimuth: u16,
    distance: u16,
    reflectivity: u8,
    laser: usize,
) -> Result<Point, ContractError> {
    let omega = calibration.elevation_deg(laser)?.to_radians();
    let intensity = calibration.intensity(reflectivity as usize)?;

    let r = distance as f64 * DISTANCE_RESOLUTION_M;
    let alpha = (azimuth as f64 / 100.0).to_radians();

    Ok(Point {
        x: r * omega.cos() * alpha.sin(),
        y: r * omega.cos() * alpha.cos(),
        z: r * omega.sin(),
        intensity,
    })
}
