//! Point / Frame - decoder output
//!
//! A frame is the set of points decoded from exactly one packet.

use serde::{Deserialize, Serialize};

/// Cartesian point with calibrated intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// meters
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Calibrated reflectivity (percent)
    pub intensity: f64,
}

/// Points decoded from one packet, block-major then laser-minor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Run-wide unique frame number
    pub id: u64,

    /// Arrival time taken from the record prefix, if it parsed
    pub captured_at: Option<f64>,

    /// Points, zero-distance returns excluded
    pub points: Vec<Point>,
}

impl Frame {
    /// Create empty frame
    pub fn new(id: u64, captured_at: Option<f64>) -> Self {
        Self {
            id,
            captured_at,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
