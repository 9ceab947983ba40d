use crate::error::VehicleError;
use crate::math::{is_unit, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Scene-wide tuning shared by every vehicle stepped with it
///
/// Holds the chassis-space basis and the speed thresholds used by the
/// tire and wheel integration code. One value normally lives with the
/// owning scene and is passed into each update.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct VehicleTuningContext {
    /// Chassis-space up direction
    up: Vector3,

    /// Chassis-space forward direction
    forward: Vector3,

    /// Forward speed below which wheel rotation blends toward pure rolling (m/s)
    pub threshold_forward_speed_for_wheel_angle_integration: f32,

    /// Added to the longitudinal speed when computing the lateral slip angle (m/s)
    pub min_lat_speed_for_tire_model: f32,

    /// Floor on the longitudinal slip denominator when no drive or brake torque acts (m/s)
    pub min_long_slip_denominator: f32,

    /// Speed below which a tire is considered at rest for sticky friction (m/s)
    pub sticky_tire_threshold_speed: f32,

    /// Time a tire must stay at rest before sticky friction engages (s)
    pub sticky_tire_timeout: f32,

    /// Damping the external solver applies to sticky tire velocity targets
    pub sticky_tire_damping: f32,

    /// Smallest |normal · travel direction| treated as a valid suspension contact
    pub min_contact_cosine: f32,
}

impl Default for VehicleTuningContext {
    fn default() -> Self {
        Self {
            up: Vector3::new(0.0, 1.0, 0.0),
            forward: Vector3::new(0.0, 0.0, 1.0),
            threshold_forward_speed_for_wheel_angle_integration: 5.0,
            min_lat_speed_for_tire_model: 1.0,
            min_long_slip_denominator: 4.0,
            sticky_tire_threshold_speed: 0.2,
            sticky_tire_timeout: 1.0,
            sticky_tire_damping: 10.0,
            min_contact_cosine: 1.0e-3,
        }
    }
}

impl VehicleTuningContext {
    /// Creates a context with a custom chassis basis
    pub fn with_basis(up: Vector3, forward: Vector3) -> Result<Self> {
        let context = Self {
            up,
            forward,
            ..Self::default()
        };
        context.validate()?;
        Ok(context)
    }

    /// Chassis-space up direction
    #[inline]
    pub fn up(&self) -> Vector3 {
        self.up
    }

    /// Chassis-space forward direction
    #[inline]
    pub fn forward(&self) -> Vector3 {
        self.forward
    }

    /// Chassis-space lateral direction, pointing to the vehicle's left
    #[inline]
    pub fn lateral(&self) -> Vector3 {
        self.up.cross(&self.forward)
    }

    /// Checks the basis is orthonormal and every threshold is usable
    pub fn validate(&self) -> Result<()> {
        if !is_unit(&self.up) || !is_unit(&self.forward) {
            return Err(VehicleError::InvalidTuning(
                "up and forward must be unit vectors".into(),
            ));
        }
        if self.up.dot(&self.forward).abs() > 1.0e-3 {
            return Err(VehicleError::InvalidTuning(
                "up and forward must be perpendicular".into(),
            ));
        }
        if self.threshold_forward_speed_for_wheel_angle_integration <= 0.0 {
            return Err(VehicleError::InvalidTuning(
                "wheel angle integration threshold must be positive".into(),
            ));
        }
        if self.min_lat_speed_for_tire_model <= 0.0 || self.min_long_slip_denominator <= 0.0 {
            return Err(VehicleError::InvalidTuning(
                "slip denominators must be positive".into(),
            ));
        }
        if self.sticky_tire_threshold_speed < 0.0 || self.sticky_tire_timeout < 0.0 {
            return Err(VehicleError::InvalidTuning(
                "sticky tire thresholds must be non-negative".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.min_contact_cosine) {
            return Err(VehicleError::InvalidTuning(
                "min_contact_cosine must be in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// Chooses how many substeps an update is split into
///
/// Slow vehicles get more substeps because the tire model is stiffest
/// near zero speed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SubstepConfig {
    /// Forward speed separating the low and high speed regimes (m/s)
    pub threshold_speed: f32,

    /// Substeps used below the threshold
    pub low_speed_count: u32,

    /// Substeps used at or above the threshold
    pub high_speed_count: u32,
}

impl Default for SubstepConfig {
    fn default() -> Self {
        Self {
            threshold_speed: 5.0,
            low_speed_count: 3,
            high_speed_count: 2,
        }
    }
}

impl SubstepConfig {
    /// Substep policy for tracked vehicles
    pub fn tank() -> Self {
        Self {
            threshold_speed: 5.0,
            low_speed_count: 4,
            high_speed_count: 4,
        }
    }

    /// Returns the substep count for a forward speed
    #[inline]
    pub fn count_for(&self, forward_speed: f32) -> u32 {
        let count = if forward_speed.abs() < self.threshold_speed {
            self.low_speed_count
        } else {
            self.high_speed_count
        };
        count.max(1)
    }

    /// Checks that both counts are at least one
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold_speed >= 0.0) {
            return Err(VehicleError::InvalidTuning(
                "substep threshold speed must be non-negative".to_string(),
            ));
        }
        if self.low_speed_count == 0 || self.high_speed_count == 0 {
            return Err(VehicleError::InvalidTuning(
                "substep counts must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}
