use crate::math::LookupTable;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Analog controls of a four-wheel drive vehicle, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DriveInputs4W {
    pub accel: f32,
    pub brake: f32,
    pub handbrake: f32,
    pub steer_left: f32,
    pub steer_right: f32,
}

impl DriveInputs4W {
    /// Net steer command in [-1, 1], positive turning left
    #[inline]
    pub fn steer(&self) -> f32 {
        (self.steer_left - self.steer_right).clamp(-1.0, 1.0)
    }

    /// Copy with every input clamped to [0, 1]
    pub fn clamped(&self) -> Self {
        Self {
            accel: self.accel.clamp(0.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
            handbrake: self.handbrake.clamp(0.0, 1.0),
            steer_left: self.steer_left.clamp(0.0, 1.0),
            steer_right: self.steer_right.clamp(0.0, 1.0),
        }
    }
}

/// Controls of a tracked vehicle
///
/// Thrusts are clamped by the vehicle's [`TankDriveModel`](crate::components::TankDriveModel);
/// everything else lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TankInputs {
    pub accel: f32,
    pub thrust_left: f32,
    pub thrust_right: f32,
    pub brake_left: f32,
    pub brake_right: f32,
}

/// Direct per-wheel torques and steer angles for vehicles without an engine
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct NoDriveInputs {
    /// Drive torque per wheel (N m)
    pub drive_torques: Vec<f32>,

    /// Brake torque magnitude per wheel (N m)
    pub brake_torques: Vec<f32>,

    /// Steer angle per wheel before toe (rad)
    pub steer_angles: Vec<f32>,
}

impl NoDriveInputs {
    /// All-zero inputs for `wheels` wheels
    pub fn zeroed(wheels: usize) -> Self {
        Self {
            drive_torques: vec![0.0; wheels],
            brake_torques: vec![0.0; wheels],
            steer_angles: vec![0.0; wheels],
        }
    }
}

/// Controls for any drive type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DriveInputs {
    FourWheel(DriveInputs4W),
    Tank(TankInputs),
    NoDrive(NoDriveInputs),
}

/// Rise and fall rates (per second) of accel, brake, handbrake, steer left, steer right
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct InputSmoothing {
    pub rise_rates: [f32; 5],
    pub fall_rates: [f32; 5],
}

impl InputSmoothing {
    /// Rates for digital (keyboard) input
    pub fn keyboard() -> Self {
        Self {
            rise_rates: [6.0, 6.0, 6.0, 2.5, 2.5],
            fall_rates: [10.0, 10.0, 10.0, 5.0, 5.0],
        }
    }

    /// Rates for analog (gamepad) input
    pub fn gamepad() -> Self {
        Self {
            rise_rates: [6.0, 6.0, 12.0, 2.5, 2.5],
            fall_rates: [10.0, 10.0, 12.0, 5.0, 5.0],
        }
    }
}

impl Default for InputSmoothing {
    fn default() -> Self {
        Self::gamepad()
    }
}

#[inline]
fn approach(current: f32, target: f32, rise: f32, fall: f32, dt: f32) -> f32 {
    if target > current {
        (current + rise * dt).min(target)
    } else {
        (current - fall * dt).max(target)
    }
}

/// Moves `current` toward `raw` at the smoothing rates
///
/// Steer targets are scaled by `steer_vs_speed` evaluated at the absolute
/// forward speed, so the same stick deflection steers less at speed. An
/// empty table leaves steering unscaled.
pub fn smooth_inputs_4w(
    raw: &DriveInputs4W,
    current: &DriveInputs4W,
    smoothing: &InputSmoothing,
    steer_vs_speed: &LookupTable,
    forward_speed: f32,
    dt: f32,
) -> DriveInputs4W {
    let raw = raw.clamped();
    let steer_scale = if steer_vs_speed.is_empty() {
        1.0
    } else {
        steer_vs_speed.evaluate(forward_speed.abs())
    };
    let r = &smoothing.rise_rates;
    let f = &smoothing.fall_rates;

    DriveInputs4W {
        accel: approach(current.accel, raw.accel, r[0], f[0], dt),
        brake: approach(current.brake, raw.brake, r[1], f[1], dt),
        handbrake: approach(current.handbrake, raw.handbrake, r[2], f[2], dt),
        steer_left: approach(current.steer_left, raw.steer_left * steer_scale, r[3], f[3], dt),
        steer_right: approach(current.steer_right, raw.steer_right * steer_scale, r[4], f[4], dt),
    }
}
