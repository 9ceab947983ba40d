//! Raycast suspension.
//!
//! One ray per wheel runs from the top of the wheel at maximum compression
//! down the travel direction. The hit plane decides the jounce; the spring
//! and damper turn it into a chassis force and a tire normal load.

use crate::components::{SuspensionConfig, TireLoadFilter, WheelConfig};
use crate::core::{ActorId, RaycastHit, SuspensionRay};
use crate::math::{Point3, Transform, Vector3, EPSILON};

/// Builds the suspension ray of a wheel
///
/// `com_pose` is the world transform of the chassis centre of mass. The
/// ray covers full compression to full droop plus an extra radius of
/// margin.
pub fn suspension_ray(
    com_pose: &Transform,
    suspension: &SuspensionConfig,
    wheel: &WheelConfig,
) -> SuspensionRay {
    let direction = com_pose.rotation * suspension.travel_direction;
    let centre = com_pose * Point3::from(suspension.wheel_centre_offset);
    let origin = centre - direction * (wheel.radius + suspension.max_compression);
    let length = wheel.radius + suspension.max_compression + suspension.max_droop + wheel.radius * 2.0;
    SuspensionRay { origin, direction, length }
}

/// Everything the resolver reads for one wheel
#[derive(Debug, Clone, Copy)]
pub struct SuspensionInput<'a> {
    pub wheel: &'a WheelConfig,
    pub suspension: &'a SuspensionConfig,
    pub load_filter: &'a TireLoadFilter,
    pub hit: Option<&'a RaycastHit>,

    /// World transform of the chassis centre of mass
    pub com_pose: &'a Transform,

    /// Jounce resolved on the previous substep, `None` if the wheel was airborne
    pub prev_jounce: Option<f32>,

    /// Substep duration
    pub dt: f32,

    pub gravity: Vector3,

    /// Contacts with |n · w| below this are ignored
    pub min_contact_cosine: f32,
}

/// Suspension state of one wheel for one substep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionContact {
    /// True if the tire touches the ground this substep
    pub in_contact: bool,

    /// Compression from rest, in [-max_droop, max_compression]
    pub jounce: f32,

    /// Compression beyond max_compression, handed to the external solver
    pub limit_error: f32,

    /// Scalar spring and damper force along the travel direction
    pub spring_force: f32,

    /// Force on the chassis
    pub force: Vector3,

    /// Torque on the chassis about its centre of mass
    pub torque: Vector3,

    /// Filtered tire normal load (N)
    pub tire_load: f32,

    /// Filtered tire load divided by the rest load
    pub normalized_load: f32,

    /// Load of the wheel at rest, (sprung mass + wheel mass) * |g|
    pub rest_load: f32,

    /// Contact normal in world space
    pub normal: Vector3,

    /// Contact point on the tire in world space
    pub contact_point: Point3,

    /// Body that should receive `-force`, if dynamic
    pub reaction_actor: Option<ActorId>,

    /// World point where the reaction acts
    pub reaction_point: Point3,
}

impl SuspensionContact {
    /// Fully extended suspension with no load
    pub fn airborne(suspension: &SuspensionConfig) -> Self {
        Self {
            in_contact: false,
            jounce: -suspension.max_droop,
            limit_error: 0.0,
            spring_force: 0.0,
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
            tire_load: 0.0,
            normalized_load: 0.0,
            rest_load: 0.0,
            normal: Vector3::zeros(),
            contact_point: Point3::origin(),
            reaction_actor: None,
            reaction_point: Point3::origin(),
        }
    }
}

/// Resolves jounce, suspension force and tire load for one wheel
pub fn resolve(input: &SuspensionInput<'_>) -> SuspensionContact {
    let suspension = input.suspension;
    let wheel = input.wheel;
    let hit = match input.hit {
        Some(hit) => hit,
        None => return SuspensionContact::airborne(suspension),
    };

    let w = input.com_pose.rotation * suspension.travel_direction;
    let n = hit.normal;
    let n_dot_w = n.dot(&w);
    if n_dot_w.abs() < input.min_contact_cosine {
        log::trace!("suspension ray parallel to contact plane (n.w = {})", n_dot_w);
        return SuspensionContact::airborne(suspension);
    }

    // Move the rest wheel centre along w until the tire's lowest point
    // touches the hit plane: n.(c + w t - n r) + d = 0
    let centre = input.com_pose * Point3::from(suspension.wheel_centre_offset);
    let d = -n.dot(&hit.point.coords);
    let t = (wheel.radius - d - n.dot(&centre.coords)) / n_dot_w;
    let dx = -t;

    if dx <= -suspension.max_droop {
        return SuspensionContact::airborne(suspension);
    }
    let jounce = dx.min(suspension.max_compression);
    let limit_error = (dx - suspension.max_compression).max(0.0);

    // Compression speed from the jounce change since the last substep. The
    // chassis velocity already carries this step's spring impulses but not
    // yet its gravity, so it cannot drive the damper.
    let closing_speed = match input.prev_jounce {
        Some(prev) if input.dt > 0.0 => (jounce - prev) / input.dt,
        _ => 0.0,
    };

    let spring_force = suspension.sprung_mass * input.gravity.dot(&w)
        + suspension.spring_strength * jounce
        + suspension.spring_damper_rate * closing_speed;

    let force = n * (spring_force * -n_dot_w);
    let app_point = input.com_pose.rotation * suspension.force_app_point_offset;
    let torque = app_point.cross(&force);

    let rest_load = ((suspension.sprung_mass + wheel.mass) * input.gravity.norm()).max(EPSILON);
    let raw_load = -spring_force * n_dot_w - wheel.mass * input.gravity.dot(&n);
    let normalized_load = input.load_filter.filter(raw_load / rest_load);

    let reaction_actor = hit.actor.filter(|_| hit.actor_type.receives_reactions());

    SuspensionContact {
        in_contact: true,
        jounce,
        limit_error,
        spring_force,
        force,
        torque,
        tire_load: normalized_load * rest_load,
        normalized_load,
        rest_load,
        normal: n,
        contact_point: centre - w * jounce - n * wheel.radius,
        reaction_actor,
        reaction_point: hit.point,
    }
}
