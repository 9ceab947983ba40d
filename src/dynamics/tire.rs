//! Tire slip and force models.
//!
//! [`compute_slips`] turns contact-patch velocities into slips. A
//! [`TireForceModel`] turns slips, load and friction into forces; the
//! default [`CombinedSlipTireModel`] blends longitudinal and lateral slip
//! through one resultant slip `K`.

use std::f32::consts::PI;
use std::fmt;

use crate::components::TireConfig;
use crate::math::EPSILON;

/// Longitudinal and lateral slip of one tire
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TireSlips {
    /// Normalized difference between wheel surface speed and ground speed
    pub long: f32,

    /// Slip angle (rad)
    pub lat: f32,
}

/// Computes tire slips from contact-patch speeds
///
/// `drive_or_brake` selects the denominator floor: while torque acts on
/// the wheel only an epsilon guards the division, otherwise the
/// denominator is at least `min_long_slip_denominator` so a free-rolling
/// wheel near rest cannot produce a large slip.
pub fn compute_slips(
    long_speed: f32,
    lat_speed: f32,
    omega: f32,
    radius: f32,
    drive_or_brake: bool,
    min_long_slip_denominator: f32,
    min_lat_speed: f32,
) -> TireSlips {
    let long_speed_abs = long_speed.abs();
    let lat = (lat_speed / (long_speed_abs + min_lat_speed)).atan();

    if long_speed == 0.0 && omega == 0.0 {
        return TireSlips { long: 0.0, lat };
    }

    let wheel_speed = omega * radius;
    let wheel_speed_abs = wheel_speed.abs();
    let floor = if drive_or_brake { EPSILON } else { min_long_slip_denominator };

    let long = if long_speed_abs >= wheel_speed_abs {
        // Ground faster than the tire surface: braking or free rolling
        (wheel_speed - long_speed) / long_speed_abs.max(floor)
    } else {
        // Tire surface faster than the ground: wheel spin
        (wheel_speed - long_speed) / wheel_speed_abs.max(floor)
    };

    TireSlips { long, lat }
}

/// Inputs to a tire force model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TireForceInput {
    /// Friction coefficient: curve value times surface multiplier
    pub friction: f32,
    pub long_slip: f32,
    pub lat_slip: f32,

    /// Camber of the wheel against the contact plane (rad)
    pub camber: f32,

    pub omega: f32,
    pub radius: f32,

    /// Load at rest (N)
    pub rest_load: f32,

    /// Filtered load divided by rest load
    pub normalized_load: f32,

    /// Filtered load (N)
    pub load: f32,

    /// Gravity magnitude
    pub gravity: f32,
}

/// Tire output for one wheel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TireForces {
    /// Reaction torque on the wheel about its axle
    pub wheel_torque: f32,

    /// Force along the tire's rolling direction
    pub long_force: f32,

    /// Force along the tire's lateral direction
    pub lat_force: f32,

    /// Aligning moment about the contact normal
    pub align_moment: f32,
}

/// Tire force strategy, chosen per vehicle
pub trait TireForceModel: fmt::Debug + Send + Sync {
    fn compute(&self, tire: &TireConfig, input: &TireForceInput) -> TireForces;
}

/// Normalized force against resultant slip, reaching 1 at K = 3
#[inline]
pub fn smoothing_force(k: f32) -> f32 {
    if k >= 3.0 {
        1.0
    } else {
        k - k * k / 3.0 + k * k * k / 27.0
    }
}

/// Normalized aligning moment against resultant slip, zero again from K = 3
#[inline]
pub fn smoothing_moment(k: f32) -> f32 {
    if k >= 3.0 {
        0.0
    } else {
        k - k * k + k * k * k / 3.0 - k * k * k * k / 27.0
    }
}

/// Closed-form combined slip model
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedSlipTireModel;

impl TireForceModel for CombinedSlipTireModel {
    fn compute(&self, tire: &TireConfig, input: &TireForceInput) -> TireForces {
        if input.long_slip == 0.0 && input.lat_slip == 0.0 && input.camber == 0.0 {
            return TireForces::default();
        }
        let max_force = input.friction * input.load;
        if !(max_force > 0.0) {
            return TireForces::default();
        }

        let lat_stiff = input.rest_load
            * tire.lat_stiff_y
            * smoothing_force(input.normalized_load * 3.0 / tire.lat_stiff_x);
        let long_stiff = tire.longitudinal_stiffness_per_unit_gravity * input.gravity;
        let camber_stiff = tire.camber_stiffness_per_unit_gravity * input.gravity;
        if !(lat_stiff > EPSILON && long_stiff > EPSILON) {
            return TireForces::default();
        }

        // Camber shifts the effective slip angle
        let t_eff = (input.lat_slip - input.camber * camber_stiff / lat_stiff).tan();
        let long = input.long_slip;

        let k = ((lat_stiff * t_eff).powi(2) + (long_stiff * long).powi(2)).sqrt() / max_force;
        let f_bar = smoothing_force(k);
        let m_bar = smoothing_moment(k);

        let nu = if k <= 2.0 * PI {
            let lat_over_long = lat_stiff / long_stiff;
            0.5 * (1.0 + lat_over_long - (1.0 - lat_over_long) * (k * 0.5).cos())
        } else {
            1.0
        };

        let f_zero = max_force / ((long * long + (nu * t_eff).powi(2)).sqrt() + EPSILON);
        let long_force = long * f_bar * f_zero;
        let lat_force = -nu * t_eff * f_bar * f_zero;
        let pneumatic_trail = 1.0;
        let align_moment = nu * pneumatic_trail * t_eff * m_bar * f_zero;

        TireForces {
            wheel_torque: -long_force * input.radius,
            long_force,
            lat_force,
            align_moment,
        }
    }
}

/// Linear stiffness model clamped to the friction circle
///
/// Cheaper and easier to reason about than [`CombinedSlipTireModel`];
/// useful for arcade handling and as a reference in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTireModel;

impl TireForceModel for LinearTireModel {
    fn compute(&self, tire: &TireConfig, input: &TireForceInput) -> TireForces {
        if input.long_slip == 0.0 && input.lat_slip == 0.0 && input.camber == 0.0 {
            return TireForces::default();
        }
        let max_force = input.friction * input.load;
        if !(max_force > 0.0) {
            return TireForces::default();
        }

        let lat_stiff = input.rest_load * tire.lat_stiff_y;
        let long_stiff = tire.longitudinal_stiffness_per_unit_gravity * input.gravity;
        let camber_stiff = tire.camber_stiffness_per_unit_gravity * input.gravity;

        let mut long_force = long_stiff * input.long_slip;
        let mut lat_force = -lat_stiff * input.lat_slip + camber_stiff * input.camber;

        let magnitude = (long_force * long_force + lat_force * lat_force).sqrt();
        if magnitude > max_force {
            let scale = max_force / magnitude;
            long_force *= scale;
            lat_force *= scale;
        }

        TireForces {
            wheel_torque: -long_force * input.radius,
            long_force,
            lat_force,
            align_moment: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_endpoints() {
        assert_eq!(smoothing_force(0.0), 0.0);
        assert!((smoothing_force(3.0) - 1.0).abs() < 1e-6);
        assert!((smoothing_force(2.999) - 1.0).abs() < 1e-5);
        assert_eq!(smoothing_moment(0.0), 0.0);
        assert!(smoothing_moment(2.9999).abs() < 1e-3);
    }
}
