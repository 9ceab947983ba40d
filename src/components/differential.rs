use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How a four-wheel differential routes torque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DifferentialType {
    /// Limited slip, all four wheels driven
    #[default]
    LimitedSlip4WD,
    /// Limited slip, front wheels driven
    LimitedSlipFrontWD,
    /// Limited slip, rear wheels driven
    LimitedSlipRearWD,
    /// Open, all four wheels driven
    Open4WD,
    /// Open, front wheels driven
    OpenFrontWD,
    /// Open, rear wheels driven
    OpenRearWD,
}

impl DifferentialType {
    /// Returns true for the limited slip variants
    pub fn is_limited_slip(self) -> bool {
        matches!(
            self,
            DifferentialType::LimitedSlip4WD
                | DifferentialType::LimitedSlipFrontWD
                | DifferentialType::LimitedSlipRearWD
        )
    }
}

/// Four-wheel differential parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Differential4WConfig {
    /// Differential type
    pub kind: DifferentialType,

    /// Fraction of torque sent to the front axle (4WD only)
    pub front_rear_split: f32,

    /// Fraction of front axle torque sent to the front-left wheel
    pub front_left_right_split: f32,

    /// Fraction of rear axle torque sent to the rear-left wheel
    pub rear_left_right_split: f32,

    /// Largest allowed ratio of front to rear axle speed (limited slip)
    pub centre_bias: f32,

    /// Largest allowed ratio of front wheel speeds (limited slip)
    pub front_bias: f32,

    /// Largest allowed ratio of rear wheel speeds (limited slip)
    pub rear_bias: f32,
}

impl Default for Differential4WConfig {
    fn default() -> Self {
        Self {
            kind: DifferentialType::LimitedSlip4WD,
            front_rear_split: 0.45,
            front_left_right_split: 0.5,
            rear_left_right_split: 0.5,
            centre_bias: 1.3,
            front_bias: 1.3,
            rear_bias: 1.3,
        }
    }
}

impl Differential4WConfig {
    /// Checks split ratios and bias factors
    pub fn validate(&self) -> Result<()> {
        let split = 0.0..=1.0;
        if !split.contains(&self.front_rear_split)
            || !split.contains(&self.front_left_right_split)
            || !split.contains(&self.rear_left_right_split)
        {
            return Err(VehicleError::InvalidDifferential(
                "split ratios must lie in [0, 1]".into(),
            ));
        }
        if self.kind.is_limited_slip()
            && !(self.centre_bias >= 1.0 && self.front_bias >= 1.0 && self.rear_bias >= 1.0)
        {
            return Err(VehicleError::InvalidDifferential(
                "limited slip bias factors must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Thrust range of a tracked vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TankDriveModel {
    /// Thrust in [0, 1]; turning relies on the per-side brakes
    #[default]
    Standard,
    /// Thrust in [-1, 1]; tracks may counter-rotate
    Special,
}

impl TankDriveModel {
    /// Clamps a thrust input to the model's range
    #[inline]
    pub fn clamp_thrust(self, thrust: f32) -> f32 {
        match self {
            TankDriveModel::Standard => thrust.clamp(0.0, 1.0),
            TankDriveModel::Special => thrust.clamp(-1.0, 1.0),
        }
    }
}

/// Track a tank wheel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TrackSide {
    Left,
    Right,
}
