use crate::error::VehicleError;
use crate::math::{is_unit, lerp, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Spring, damper and mounting geometry of one wheel's suspension
///
/// All offsets are expressed in the chassis centre of mass frame. A jounce
/// of zero is the rest position under the static load of `sprung_mass`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SuspensionConfig {
    /// Spring strength (N/m)
    pub spring_strength: f32,

    /// Damper rate (N s/m)
    pub spring_damper_rate: f32,

    /// Travel above the rest position before the bump stop (m)
    pub max_compression: f32,

    /// Travel below the rest position before the wheel hangs free (m)
    pub max_droop: f32,

    /// Chassis mass supported by this spring (kg)
    pub sprung_mass: f32,

    /// Unit direction of suspension travel, pointing down
    pub travel_direction: Vector3,

    /// Wheel centre at rest
    pub wheel_centre_offset: Vector3,

    /// Point where the suspension force acts on the chassis
    pub force_app_point_offset: Vector3,

    /// Point where the tire force acts on the chassis
    pub tire_force_app_point_offset: Vector3,

    /// Camber at rest (rad)
    pub camber_at_rest: f32,

    /// Camber at maximum compression (rad)
    pub camber_at_max_compression: f32,

    /// Camber at maximum droop (rad)
    pub camber_at_max_droop: f32,
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            spring_strength: 35000.0,
            spring_damper_rate: 4500.0,
            max_compression: 0.3,
            max_droop: 0.1,
            sprung_mass: 375.0, // quarter of a 1500 kg chassis
            travel_direction: Vector3::new(0.0, -1.0, 0.0),
            wheel_centre_offset: Vector3::zeros(),
            force_app_point_offset: Vector3::zeros(),
            tire_force_app_point_offset: Vector3::zeros(),
            camber_at_rest: 0.0,
            camber_at_max_compression: 0.0,
            camber_at_max_droop: 0.0,
        }
    }
}

impl SuspensionConfig {
    /// Creates a suspension mounted at `wheel_centre_offset`
    ///
    /// Both force application points start a little above the wheel centre,
    /// which is a reasonable default for road cars.
    pub fn at(wheel_centre_offset: Vector3) -> Self {
        let app = wheel_centre_offset + Vector3::new(0.0, 0.3, 0.0);
        Self {
            wheel_centre_offset,
            force_app_point_offset: app,
            tire_force_app_point_offset: app,
            ..Self::default()
        }
    }

    /// Camber for a given jounce
    pub fn camber_at(&self, jounce: f32) -> f32 {
        if jounce > 0.0 && self.max_compression > 0.0 {
            lerp(self.camber_at_rest, self.camber_at_max_compression, jounce / self.max_compression)
        } else if jounce < 0.0 && self.max_droop > 0.0 {
            lerp(self.camber_at_rest, self.camber_at_max_droop, -jounce / self.max_droop)
        } else {
            self.camber_at_rest
        }
    }

    /// Checks every quantity is non-negative and the travel direction is unit length
    pub fn validate(&self, wheel: usize) -> Result<()> {
        let fail = |reason: &str| {
            Err(VehicleError::InvalidSuspension {
                wheel,
                reason: reason.to_string(),
            })
        };

        if self.spring_strength < 0.0 || self.spring_damper_rate < 0.0 {
            return fail("spring strength and damper rate must be non-negative");
        }
        if self.max_compression < 0.0 || self.max_droop < 0.0 {
            return fail("travel limits must be non-negative");
        }
        if !(self.sprung_mass > 0.0) {
            return fail("sprung mass must be positive");
        }
        if !is_unit(&self.travel_direction) {
            return fail("travel direction must be a unit vector");
        }
        Ok(())
    }
}
