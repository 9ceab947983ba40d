use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Physical description of one wheel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct WheelConfig {
    /// Radius of the wheel including the tire (m)
    pub radius: f32,

    /// Width of the tire (m), used only for rendering
    pub width: f32,

    /// Mass of wheel and tire (kg)
    pub mass: f32,

    /// Moment of inertia about the axle (kg m²)
    pub moi: f32,

    /// Damping applied to the wheel's angular speed
    pub damping_rate: f32,

    /// Brake torque at full brake input (N m)
    pub max_brake_torque: f32,

    /// Brake torque at full handbrake input (N m)
    pub max_hand_brake_torque: f32,

    /// Steer angle at full steer input (rad)
    pub max_steer: f32,

    /// Static toe angle added to the steer angle (rad)
    pub toe_angle: f32,

    recip_radius: f32,
    recip_moi: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self::new(0.3, 0.2, 20.0, 0.9) // 0.5 * m * r² for a 20 kg disc
    }
}

impl WheelConfig {
    /// Creates a wheel with no brakes, steering or toe
    pub fn new(radius: f32, width: f32, mass: f32, moi: f32) -> Self {
        Self {
            radius,
            width,
            mass,
            moi,
            damping_rate: 0.25,
            max_brake_torque: 1500.0,
            max_hand_brake_torque: 0.0,
            max_steer: 0.0,
            toe_angle: 0.0,
            recip_radius: recip(radius),
            recip_moi: recip(moi),
        }
    }

    /// Sets the brake and handbrake torques
    pub fn with_brakes(mut self, brake: f32, hand_brake: f32) -> Self {
        self.max_brake_torque = brake;
        self.max_hand_brake_torque = hand_brake;
        self
    }

    /// Sets the maximum steer angle
    pub fn with_max_steer(mut self, max_steer: f32) -> Self {
        self.max_steer = max_steer;
        self
    }

    /// Sets the static toe angle
    pub fn with_toe(mut self, toe_angle: f32) -> Self {
        self.toe_angle = toe_angle;
        self
    }

    /// Recomputes the cached reciprocals after `radius` or `moi` changed
    pub fn refresh_reciprocals(&mut self) {
        self.recip_radius = recip(self.radius);
        self.recip_moi = recip(self.moi);
    }

    /// Returns 1 / radius
    #[inline]
    pub fn recip_radius(&self) -> f32 {
        self.recip_radius
    }

    /// Returns 1 / moment of inertia
    #[inline]
    pub fn recip_moi(&self) -> f32 {
        self.recip_moi
    }

    /// Checks ranges and the cached reciprocals
    pub fn validate(&self, wheel: usize) -> Result<()> {
        let fail = |reason: &str| {
            Err(VehicleError::InvalidWheel {
                wheel,
                reason: reason.to_string(),
            })
        };

        if !(self.radius > 0.0) {
            return fail("radius must be positive");
        }
        if !(self.mass > 0.0) {
            return fail("mass must be positive");
        }
        if !(self.moi > 0.0) {
            return fail("moment of inertia must be positive");
        }
        if self.width < 0.0 || self.damping_rate < 0.0 {
            return fail("width and damping rate must be non-negative");
        }
        if self.max_brake_torque < 0.0 || self.max_hand_brake_torque < 0.0 {
            return fail("brake torques must be non-negative");
        }
        if self.max_steer < 0.0 || self.max_steer >= std::f32::consts::FRAC_PI_2 {
            return fail("max steer must be in [0, pi/2)");
        }
        if (self.radius * self.recip_radius - 1.0).abs() > 1.0e-3
            || (self.moi * self.recip_moi - 1.0).abs() > 1.0e-3
        {
            return fail("cached reciprocals are stale, call refresh_reciprocals");
        }
        Ok(())
    }
}

#[inline]
fn recip(v: f32) -> f32 {
    if v != 0.0 { 1.0 / v } else { 0.0 }
}
