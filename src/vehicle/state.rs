use crate::core::{RaycastHit, SuspensionRay, WheelIndex};
use crate::dynamics::{GearboxState, StickyTireState};
use crate::math::{Point3, Vector3};
use crate::surface::SurfaceType;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Runtime state of one wheel, rewritten every substep
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct WheelState {
    /// Angular speed about the axle (rad/s)
    pub omega: f32,

    /// Accumulated rotation, wrapped to [0, 2π)
    pub rotation_angle: f32,

    /// Speed used to advance `rotation_angle`; blended toward rolling at low speed
    pub corrected_omega: f32,

    /// Steer angle including toe (rad)
    pub steer_angle: f32,

    /// Suspension compression from rest (m)
    pub jounce: f32,

    /// Compression beyond the bump stop (m)
    pub suspension_limit_error: f32,

    /// Camber of the wheel against the ground (rad)
    pub camber: f32,

    pub in_contact: bool,
    pub long_slip: f32,
    pub lat_slip: f32,

    /// Friction coefficient including the surface multiplier
    pub friction: f32,

    /// Filtered tire load (N)
    pub tire_load: f32,
    pub normalized_load: f32,

    pub long_force: f32,
    pub lat_force: f32,
    pub align_moment: f32,

    /// Ground speed along the tire's rolling direction (m/s)
    pub long_speed: f32,

    /// Ground speed across the tire (m/s)
    pub lat_speed: f32,

    /// World rolling direction of the tire on the contact plane
    pub long_dir: Vector3,

    /// World lateral direction of the tire on the contact plane
    pub lat_dir: Vector3,

    /// World contact point
    pub contact_point: Point3,

    /// Surface type of the last hit
    pub surface_type: SurfaceType,

    pub sticky: StickyTireState,

    /// Last suspension ray cast for this wheel
    pub ray: Option<SuspensionRay>,

    /// Last raycast hit, if any
    pub hit: Option<RaycastHit>,
}

impl Default for WheelState {
    fn default() -> Self {
        Self {
            omega: 0.0,
            rotation_angle: 0.0,
            corrected_omega: 0.0,
            steer_angle: 0.0,
            jounce: 0.0,
            suspension_limit_error: 0.0,
            camber: 0.0,
            in_contact: false,
            long_slip: 0.0,
            lat_slip: 0.0,
            friction: 0.0,
            tire_load: 0.0,
            normalized_load: 0.0,
            long_force: 0.0,
            lat_force: 0.0,
            align_moment: 0.0,
            long_speed: 0.0,
            lat_speed: 0.0,
            long_dir: Vector3::zeros(),
            lat_dir: Vector3::zeros(),
            contact_point: Point3::origin(),
            surface_type: SurfaceType::DEFAULT,
            sticky: StickyTireState::default(),
            ray: None,
            hit: None,
        }
    }
}

impl WheelState {
    /// Clears the per-substep tire outputs of an airborne wheel
    pub(crate) fn clear_contact(&mut self) {
        self.in_contact = false;
        self.long_slip = 0.0;
        self.lat_slip = 0.0;
        self.friction = 0.0;
        self.tire_load = 0.0;
        self.normalized_load = 0.0;
        self.long_force = 0.0;
        self.lat_force = 0.0;
        self.align_moment = 0.0;
        self.long_speed = 0.0;
        self.lat_speed = 0.0;
        self.sticky = StickyTireState::default();
    }
}

/// Runtime state of a whole vehicle
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct VehicleState {
    pub wheels: Vec<WheelState>,

    /// Engine angular speed (rad/s)
    pub engine_omega: f32,

    pub gearbox: GearboxState,
}

impl VehicleState {
    /// All-zero state for `wheel_count` wheels
    pub fn at_rest(wheel_count: usize) -> Self {
        Self {
            wheels: vec![WheelState::default(); wheel_count],
            engine_omega: 0.0,
            gearbox: GearboxState::new(),
        }
    }
}

/// Keeps a compressed suspension from sinking past its bump stop
///
/// The external solver should push the chassis at `point` along `-direction`
/// until `error` reaches zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SuspensionLimitConstraint {
    pub wheel: WheelIndex,

    /// World travel direction of the suspension, pointing down
    pub direction: Vector3,

    /// World point on the chassis where the suspension acts
    pub point: Point3,

    /// Penetration past max compression (m)
    pub error: f32,
}

/// Holds a slow tire at rest along one direction
///
/// The external solver drives the chassis velocity at `point` along
/// `direction` toward zero with the given damping.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct StickyTireConstraint {
    pub wheel: WheelIndex,
    pub direction: Vector3,
    pub point: Point3,
    pub target_speed: f32,
    pub damping: f32,
}

/// Constraint rows produced by the last update
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct VehicleConstraints {
    pub suspension_limits: Vec<SuspensionLimitConstraint>,
    pub sticky_tires: Vec<StickyTireConstraint>,
}

impl VehicleConstraints {
    pub fn clear(&mut self) {
        self.suspension_limits.clear();
        self.sticky_tires.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.suspension_limits.is_empty() && self.sticky_tires.is_empty()
    }
}
