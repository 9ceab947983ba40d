use crate::error::VehicleError;
use crate::surface::TireType;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Tire stiffness and friction description
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TireConfig {
    /// Normalized load at which lateral stiffness stops growing
    pub lat_stiff_x: f32,

    /// Maximum lateral stiffness per unit rest load (per radian)
    pub lat_stiff_y: f32,

    /// Longitudinal stiffness per unit gravity (N per unit slip per m/s²)
    pub longitudinal_stiffness_per_unit_gravity: f32,

    /// Camber stiffness per unit gravity (N per radian per m/s²)
    pub camber_stiffness_per_unit_gravity: f32,

    /// Friction against |longitudinal slip|: three (slip, friction) points
    pub friction_vs_slip: [[f32; 2]; 3],

    /// Row of the surface friction table used by this tire
    pub tire_type: TireType,
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            lat_stiff_x: 2.0,
            lat_stiff_y: 0.3125 * (180.0 / std::f32::consts::PI),
            longitudinal_stiffness_per_unit_gravity: 1000.0,
            camber_stiffness_per_unit_gravity: 0.1 * (180.0 / std::f32::consts::PI),
            friction_vs_slip: [[0.0, 1.0], [0.1, 1.0], [1.0, 1.0]],
            tire_type: TireType(0),
        }
    }
}

impl TireConfig {
    /// Evaluates the friction curve at a longitudinal slip
    ///
    /// Linear between the three points and flat beyond the last one, so the
    /// result is never negative when the y values are not.
    pub fn friction_at(&self, long_slip: f32) -> f32 {
        let s = long_slip.abs();
        let [[x0, y0], [x1, y1], [x2, y2]] = self.friction_vs_slip;
        if s <= x0 {
            y0
        } else if s < x1 {
            y0 + (y1 - y0) * (s - x0) / (x1 - x0)
        } else if s < x2 {
            y1 + (y2 - y1) * (s - x1) / (x2 - x1)
        } else {
            y2
        }
    }

    /// Checks stiffnesses are positive and the friction curve is well formed
    pub fn validate(&self, wheel: usize) -> Result<()> {
        let fail = |reason: &str| {
            Err(VehicleError::InvalidTire {
                wheel,
                reason: reason.to_string(),
            })
        };

        if !(self.lat_stiff_x > 0.0) || !(self.lat_stiff_y > 0.0) {
            return fail("lateral stiffness coefficients must be positive");
        }
        if !(self.longitudinal_stiffness_per_unit_gravity > 0.0) {
            return fail("longitudinal stiffness must be positive");
        }
        if self.camber_stiffness_per_unit_gravity < 0.0 {
            return fail("camber stiffness must be non-negative");
        }
        let curve = &self.friction_vs_slip;
        if curve[0][0] < 0.0 || !(curve[0][0] < curve[1][0] && curve[1][0] < curve[2][0]) {
            return fail("friction curve x values must be non-negative and ascending");
        }
        if curve.iter().any(|p| !(p[1] >= 0.0)) {
            return fail("friction curve y values must be non-negative");
        }
        Ok(())
    }
}

/// Maps normalized tire load to the load handed to the tire model
///
/// Loads at or below `min_normalized_load` give zero, loads between the
/// limits scale linearly up to `max_filtered_normalized_load`, and loads
/// above `max_normalized_load` saturate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TireLoadFilter {
    pub min_normalized_load: f32,
    pub max_normalized_load: f32,
    pub max_filtered_normalized_load: f32,
}

impl Default for TireLoadFilter {
    fn default() -> Self {
        Self {
            min_normalized_load: 0.0,
            max_normalized_load: 3.0,
            max_filtered_normalized_load: 3.0,
        }
    }
}

impl TireLoadFilter {
    /// Filters a normalized load
    #[inline]
    pub fn filter(&self, normalized_load: f32) -> f32 {
        if normalized_load <= self.min_normalized_load {
            0.0
        } else if normalized_load >= self.max_normalized_load {
            self.max_filtered_normalized_load
        } else {
            let t = (normalized_load - self.min_normalized_load)
                / (self.max_normalized_load - self.min_normalized_load);
            t * self.max_filtered_normalized_load
        }
    }

    /// Checks the limits are ordered
    pub fn validate(&self) -> Result<()> {
        if self.min_normalized_load < 0.0
            || !(self.max_normalized_load > self.min_normalized_load)
            || self.max_filtered_normalized_load < 0.0
        {
            return Err(VehicleError::InvalidParameter(
                "tire load filter needs 0 <= min < max and a non-negative filtered max".into(),
            ));
        }
        Ok(())
    }
}
