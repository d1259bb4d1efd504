//! XT-32 calibration tables
//!
//! Immutable per-laser elevation angles and the reflectivity → intensity curve.
//! A `Calibration` is built once and passed by reference to the decoder.

use contracts::layout::LASER_COUNT;
use contracts::ContractError;

/// Factory elevation angles in degrees, laser 0 fires highest
pub const XT32_ELEVATION_DEG: [f64; LASER_COUNT] = [
    15.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0,
    -1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0, -8.0, -9.0, -10.0, -11.0, -12.0, -13.0, -14.0,
    -15.0, -16.0,
];

/// Calibrated reflectivity (percent) for each raw reflectivity byte
pub const XT32_REFLECTIVITY_CURVE: [f64; 256] = [
    0.0, 2.89, 4.08, 5.0, 5.77, 6.45, 7.07, 7.64, 8.16, 8.66,
    9.13, 9.57, 10.0, 10.41, 10.8, 11.18, 11.55, 11.9, 12.25, 12.58,
    12.91, 13.23, 13.54, 13.84, 14.14, 14.43, 14.72, 15.0, 15.28, 15.57,
    15.86, 16.16, 16.46, 16.77, 17.09, 17.42, 17.75, 18.1, 18.45, 18.82,
    19.2, 19.59, 20.0, 20.43, 20.87, 21.34, 21.84, 22.36, 22.93, 23.55,
    24.23, 25.0, 25.92, 27.09, 28.22, 29.35, 30.47, 31.6, 32.73, 33.86,
    34.99, 36.12, 37.25, 38.37, 39.5, 40.63, 41.76, 42.89, 44.02, 45.15,
    46.28, 47.4, 48.53, 49.66, 50.79, 51.92, 53.05, 54.18, 55.3, 56.43,
    57.56, 58.69, 59.82, 60.95, 62.08, 63.21, 64.33, 65.46, 66.59, 67.72,
    68.85, 69.98, 71.11, 72.23, 73.36, 74.49, 75.62, 76.65, 77.88, 79.01,
    80.14, 81.26, 82.39, 83.52, 84.65, 85.78, 86.91, 88.04, 89.16, 90.29,
    91.42, 92.55, 93.68, 94.81, 95.94, 97.07, 98.19, 99.32, 100.45, 101.58,
    102.71, 103.84, 104.97, 106.09, 107.22, 108.35, 109.48, 110.61, 111.74, 112.87,
    114.0, 115.12, 116.25, 117.38, 118.51, 119.64, 120.77, 121.9, 123.02, 124.15,
    125.28, 126.41, 127.54, 128.67, 129.8, 130.93, 132.05, 133.18, 134.31, 135.44,
    136.57, 137.7, 138.83, 139.95, 141.08, 142.21, 143.34, 144.47, 145.6, 146.73,
    147.86, 148.9, 150.11, 151.24, 152.37, 153.5, 154.63, 155.76, 156.88, 158.01,
    159.14, 160.27, 161.4, 162.53, 163.66, 164.79, 165.91, 167.04, 168.17, 169.3,
    170.43, 171.6, 172.69, 173.81, 174.94, 176.07, 177.2, 178.33, 179.46, 180.59,
    181.72, 182.84, 183.97, 185.1, 186.23, 187.36, 188.49, 189.62, 190.74, 191.87,
    193.0, 194.13, 195.26, 196.39, 197.52, 198.65, 199.77, 200.9, 202.03, 203.16,
    204.29, 205.42, 206.55, 207.67, 208.8, 209.93, 211.06, 212.19, 213.32, 214.45,
    215.58, 216.7, 217.83, 218.96, 220.09, 221.22, 222.35, 223.48, 224.6, 225.73,
    226.86, 227.99, 229.12, 230.25, 231.38, 232.51, 233.63, 234.76, 235.89, 237.02,
    238.15, 239.28, 240.41, 241.53, 242.66, 243.79, 244.92, 246.05, 247.18, 248.31,
    249.44, 250.56, 251.69, 252.82, 253.95, 255.08,
];

/// Calibration tables for one sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    elevation_deg: [f64; LASER_COUNT],
    reflectivity: [f64; 256],
}

impl Calibration {
    /// Factory XT-32 tables
    pub fn xt32() -> Self {
        Self {
            elevation_deg: XT32_ELEVATION_DEG,
            reflectivity: XT32_REFLECTIVITY_CURVE,
        }
    }

    /// XT-32 reflectivity curve with a custom elevation table
    ///
    /// # Errors
    /// `ConfigValidation` unless `angles` holds exactly 32 finite values.
    pub fn with_elevation(angles: &[f64]) -> Result<Self, ContractError> {
        let elevation_deg: [f64; LASER_COUNT] = angles.try_into().map_err(|_| {
            ContractError::config_validation(
                "calibration.elevation_deg",
                format!("expected {} angles, got {}", LASER_COUNT, angles.len()),
            )
        })?;
        if let Some(bad) = elevation_deg.iter().find(|a| !a.is_finite()) {
            return Err(ContractError::config_validation(
                "calibration.elevation_deg",
                format!("angle {bad} is not finite"),
            ));
        }
        Ok(Self {
            elevation_deg,
            reflectivity: XT32_REFLECTIVITY_CURVE,
        })
    }

    /// Elevation angle of `laser` in degrees
    pub fn elevation_deg(&self, laser: usize) -> Result<f64, ContractError> {
        self.elevation_deg
            .get(laser)
            .copied()
            .ok_or_else(|| ContractError::calibration_lookup("elevation", laser, LASER_COUNT))
    }

    /// Calibrated intensity for a raw reflectivity value
    pub fn intensity(&self, reflectivity: usize) -> Result<f64, ContractError> {
        self.reflectivity.get(reflectivity).copied().ok_or_else(|| {
            ContractError::calibration_lookup("reflectivity", reflectivity, self.reflectivity.len())
        })
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::xt32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reflectivity_byte_has_an_entry() {
        let calibration = Calibration::xt32();
        for byte in 0..=u8::MAX {
            assert!(calibration.intensity(byte as usize).is_ok(), "byte {byte}");
        }
        assert_eq!(calibration.intensity(0).unwrap(), 0.0);
        assert_eq!(calibration.intensity(255).unwrap(), 255.08);
    }

    #[test]
    fn test_reflectivity_curve_is_monotonic() {
        assert!(XT32_REFLECTIVITY_CURVE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_out_of_range_lookups_fail() {
        let calibration = Calibration::xt32();
        assert!(matches!(
            calibration.elevation_deg(32),
            Err(ContractError::CalibrationLookup { index: 32, .. })
        ));
        assert!(matches!(
            calibration.intensity(256),
            Err(ContractError::CalibrationLookup { index: 256, .. })
        ));
    }

    #[test]
    fn test_elevation_table_endpoints() {
        let calibration = Calibration::xt32();
        assert_eq!(calibration.elevation_deg(0).unwrap(), 15.0);
        assert_eq!(calibration.elevation_deg(15).unwrap(), 0.0);
        assert_eq!(calibration.elevation_deg(31).unwrap(), -16.0);
    }

    #[test]
    fn test_custom_elevation_table() {
        let angles: Vec<f64> = (0..32).map(|i| i as f64 * 0.5).collect();
        let calibration = Calibration::with_elevation(&angles).unwrap();
        assert_eq!(calibration.elevation_deg(3).unwrap(), 1.5);

        assert!(Calibration::with_elevation(&angles[..31]).is_err());
        let mut bad = angles.clone();
        bad[4] = f64::NAN;
        assert!(Calibration::with_elevation(&bad).is_err());
    }
}
