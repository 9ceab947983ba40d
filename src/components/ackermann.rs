use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axle geometry used for Ackermann steer correction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct AckermannGeometry {
    /// Blend between equal steer angles (0) and perfect Ackermann (1)
    pub accuracy: f32,

    /// Distance between the front wheels (m)
    pub front_width: f32,

    /// Distance between the rear wheels (m)
    pub rear_width: f32,

    /// Distance between front and rear axles (m)
    pub axle_separation: f32,
}

impl Default for AckermannGeometry {
    fn default() -> Self {
        Self {
            accuracy: 1.0,
            front_width: 1.6,
            rear_width: 1.6,
            axle_separation: 2.6,
        }
    }
}

impl AckermannGeometry {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(VehicleError::InvalidAckermann("accuracy must lie in [0, 1]".into()));
        }
        if !(self.front_width > 0.0 && self.rear_width > 0.0 && self.axle_separation > 0.0) {
            return Err(VehicleError::InvalidAckermann(
                "widths and axle separation must be positive".into(),
            ));
        }
        Ok(())
    }
}
