use crate::error::VehicleError;
use crate::math::LookupTable;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Engine torque and damping description
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Torque at the peak of the torque curve (N m)
    pub peak_torque: f32,

    /// Maximum engine rotation speed (rad/s)
    pub max_omega: f32,

    /// Fraction of peak torque against engine speed / max speed
    pub torque_curve: LookupTable,

    /// Moment of inertia of the engine (kg m²)
    pub moi: f32,

    /// Damping rate at full throttle
    pub damping_rate_full_throttle: f32,

    /// Damping rate at zero throttle with the clutch engaged
    pub damping_rate_zero_throttle_clutch_engaged: f32,

    /// Damping rate at zero throttle with the clutch disengaged (in neutral)
    pub damping_rate_zero_throttle_clutch_disengaged: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            peak_torque: 500.0,
            max_omega: 600.0, // roughly 6000 rpm
            torque_curve: LookupTable::from_pairs(&[(0.0, 0.8), (0.33, 1.0), (1.0, 0.8)]),
            moi: 1.0,
            damping_rate_full_throttle: 0.15,
            damping_rate_zero_throttle_clutch_engaged: 2.0,
            damping_rate_zero_throttle_clutch_disengaged: 0.35,
        }
    }
}

impl EngineConfig {
    /// Drive torque for a throttle position and engine speed
    #[inline]
    pub fn drive_torque(&self, accel: f32, omega: f32) -> f32 {
        accel * self.peak_torque * self.torque_curve.evaluate(omega / self.max_omega)
    }

    /// Damping rate blended between full and zero throttle
    #[inline]
    pub fn damping_rate(&self, accel: f32, clutch_engaged: bool) -> f32 {
        let zero_throttle = if clutch_engaged {
            self.damping_rate_zero_throttle_clutch_engaged
        } else {
            self.damping_rate_zero_throttle_clutch_disengaged
        };
        self.damping_rate_full_throttle * accel + zero_throttle * (1.0 - accel)
    }

    /// Checks ranges and the torque curve
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| Err(VehicleError::InvalidEngine(reason.to_string()));

        if !(self.peak_torque >= 0.0) {
            return fail("peak torque must be non-negative");
        }
        if !(self.max_omega > 0.0) {
            return fail("max omega must be positive");
        }
        if !(self.moi > 0.0) {
            return fail("moment of inertia must be positive");
        }
        if self.damping_rate_full_throttle < 0.0
            || self.damping_rate_zero_throttle_clutch_engaged < 0.0
            || self.damping_rate_zero_throttle_clutch_disengaged < 0.0
        {
            return fail("damping rates must be non-negative");
        }
        if self.torque_curve.is_empty() || !self.torque_curve.is_ascending() {
            return fail("torque curve needs ascending normalized speeds");
        }
        if self.torque_curve.pairs().any(|(_, y)| y < 0.0) {
            return fail("torque curve values must be non-negative");
        }
        Ok(())
    }
}
