use serde::{Deserialize, Serialize};
use sio_types::Precision;

use crate::error::{ShiftError, ShiftResult};

/// Configuration for global shift detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    /// Width of the coordinates as read from the source.
    pub source_precision: Precision,
    /// Width of the store the coordinates are written into.
    pub destination_precision: Precision,
    /// Coordinates at or above this magnitude are considered at risk.
    pub max_abs_coordinate: f64,
    /// Bounding-box diagonals at or above this value are reported as too large.
    pub max_bounding_box_diagonal: f64,
    /// Suggested shifts are rounded to a multiple of this step.
    pub shift_rounding: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            source_precision: Precision::Double,
            destination_precision: Precision::Single,
            max_abs_coordinate: 1.0e4,
            max_bounding_box_diagonal: 1.0e6,
            shift_rounding: 100.0,
        }
    }
}

impl ShiftConfig {
    /// A configuration for a destination store as wide as the source.
    ///
    /// Shift handling is a no-op under this configuration.
    pub fn full_precision() -> Self {
        Self {
            destination_precision: Precision::Double,
            ..Default::default()
        }
    }

    /// Returns `true` if storing coordinates can lose precision.
    pub fn is_lossy(&self) -> bool {
        self.destination_precision
            .is_narrower_than(self.source_precision)
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> ShiftResult<()> {
        let checks = [
            ("max_abs_coordinate", self.max_abs_coordinate),
            ("max_bounding_box_diagonal", self.max_bounding_box_diagonal),
            ("shift_rounding", self.shift_rounding),
        ];
        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(ShiftError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}
