//! Boundaries to the host engine.
//!
//! The vehicle never owns its chassis or the scene. It reads the chassis
//! through [`ChassisBody`], casts suspension rays through [`SceneQuery`],
//! pushes reaction impulses into hit bodies through [`ContactReaction`] and
//! hands wheel transforms to a [`WheelPoseSink`].

use crate::bodies::RigidBodyType;
use crate::core::WheelIndex;
use crate::math::{Point3, Transform, Vector3};
use crate::surface::MaterialId;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Host-side identifier of a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ActorId(pub u32);

/// A suspension ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SuspensionRay {
    /// Start of the ray: top of the wheel at maximum compression
    pub origin: Point3,

    /// Unit direction of suspension travel
    pub direction: Vector3,

    /// Maximum distance to search
    pub length: f32,
}

impl SuspensionRay {
    /// Returns the point at distance `t` along the ray
    #[inline]
    pub fn point_at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Filtering data handed to the raycast collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct QueryFilter {
    /// Actor whose shapes must be ignored, normally the chassis itself
    pub exclude_actor: Option<ActorId>,

    /// Collision group mask; zero means every group
    pub group_mask: u32,
}

/// Result of a suspension raycast
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RaycastHit {
    /// Distance from the ray origin
    pub distance: f32,

    /// World-space contact point
    pub point: Point3,

    /// World-space unit surface normal
    pub normal: Vector3,

    /// Material of the shape that was hit
    pub material: MaterialId,

    /// Body that owns the hit shape, if any
    pub actor: Option<ActorId>,

    /// How the hit body is simulated
    pub actor_type: RigidBodyType,
}

/// Scene raycast collaborator
pub trait SceneQuery {
    /// Casts one ray and returns the closest hit, if any
    fn raycast(&self, ray: &SuspensionRay, filter: &QueryFilter) -> Option<RaycastHit>;
}

/// Rigid-body collaborator that owns the chassis
///
/// Impulses must change the reported velocities immediately; the vehicle
/// re-reads them after every substep.
pub trait ChassisBody {
    /// Identifier used to exclude the chassis from its own raycasts
    fn actor_id(&self) -> Option<ActorId> {
        None
    }

    /// World transform of the actor frame
    fn global_pose(&self) -> Transform;

    /// Centre of mass frame relative to the actor frame
    fn center_of_mass_local(&self) -> Transform;

    /// Linear velocity of the centre of mass
    fn linear_velocity(&self) -> Vector3;

    /// Angular velocity in world space
    fn angular_velocity(&self) -> Vector3;

    /// Total mass
    fn mass(&self) -> f32;

    /// Applies a linear impulse at the centre of mass and an angular impulse
    fn apply_impulse(&mut self, linear: Vector3, angular: Vector3);
}

/// Receives reaction impulses for dynamic bodies the wheels stand on
pub trait ContactReaction {
    /// Applies `impulse` to `actor` at the world-space `point`
    fn apply_impulse_at_point(&mut self, actor: ActorId, impulse: Vector3, point: Point3);
}

/// Discards every reaction impulse
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContactReaction;

impl ContactReaction for NoContactReaction {
    fn apply_impulse_at_point(&mut self, _actor: ActorId, _impulse: Vector3, _point: Point3) {}
}

/// Buffered reaction impulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionImpulse {
    pub actor: ActorId,
    pub impulse: Vector3,
    pub point: Point3,
}

impl ContactReaction for Vec<ReactionImpulse> {
    fn apply_impulse_at_point(&mut self, actor: ActorId, impulse: Vector3, point: Point3) {
        self.push(ReactionImpulse { actor, impulse, point });
    }
}

/// Receives the world transform of every wheel shape
pub trait WheelPoseSink {
    fn set_wheel_pose(&mut self, wheel: WheelIndex, pose: &Transform);
}

/// Ignores wheel poses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPoseSink;

impl WheelPoseSink for NoPoseSink {
    fn set_wheel_pose(&mut self, _wheel: WheelIndex, _pose: &Transform) {}
}

/// Stores the latest pose of each wheel
#[derive(Debug, Clone, Default)]
pub struct WheelPoses(pub Vec<Transform>);

impl WheelPoses {
    /// Returns the pose written for a wheel, if any
    pub fn get(&self, wheel: WheelIndex) -> Option<&Transform> {
        self.0.get(wheel.get())
    }
}

impl WheelPoseSink for WheelPoses {
    fn set_wheel_pose(&mut self, wheel: WheelIndex, pose: &Transform) {
        let i = wheel.get();
        if self.0.len() <= i {
            self.0.resize(i + 1, Transform::identity());
        }
        self.0[i] = *pose;
    }
}
