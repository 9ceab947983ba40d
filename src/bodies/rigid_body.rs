use crate::bodies::{BodyFlags, RigidBodyType};
use crate::core::{ActorId, ChassisBody};
use crate::math::{Point3, Quaternion, Transform, Vector3};
use nalgebra::{Matrix3, Translation3, Unit};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A minimal rigid body that can carry a vehicle
///
/// Hosts with their own solver implement [`ChassisBody`] on their bodies
/// directly. This one integrates with semi-implicit Euler and is what the
/// tests, benches and demos drive.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimpleRigidBody {
    /// Host identifier, used to exclude the body from its own raycasts
    id: Option<ActorId>,

    /// The actor frame in world space
    pose: Transform,

    /// The centre of mass frame relative to the actor frame
    center_of_mass: Transform,

    /// The linear velocity of the centre of mass
    linear_velocity: Vector3,

    /// The angular velocity in world space
    angular_velocity: Vector3,

    /// The mass of the body
    mass: f32,

    /// The inverse mass (0 for kinematic bodies)
    inv_mass: f32,

    /// Principal moments of inertia in the centre of mass frame
    inertia: Vector3,

    /// Linear damping factor per second
    linear_damping: f32,

    /// Angular damping factor per second
    angular_damping: f32,

    /// Behaviour flags
    flags: BodyFlags,
}

impl SimpleRigidBody {
    /// Creates a dynamic body with the given mass and principal inertia
    pub fn new(mass: f32, inertia: Vector3, pose: Transform) -> Self {
        Self {
            id: None,
            pose,
            center_of_mass: Transform::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            linear_damping: 0.0,
            angular_damping: 0.05,
            flags: BodyFlags::AFFECTED_BY_GRAVITY,
        }
    }

    /// Creates a box-shaped dynamic body with uniform density
    pub fn new_box(mass: f32, half_extents: Vector3, pose: Transform) -> Self {
        let (x2, y2, z2) = (
            4.0 * half_extents.x * half_extents.x,
            4.0 * half_extents.y * half_extents.y,
            4.0 * half_extents.z * half_extents.z,
        );
        let inertia = Vector3::new(y2 + z2, x2 + z2, x2 + y2) * (mass / 12.0);
        Self::new(mass, inertia, pose)
    }

    /// Sets the host identifier
    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = Some(id);
        self
    }

    /// Offsets the centre of mass from the actor origin
    pub fn with_center_of_mass(mut self, offset: Vector3) -> Self {
        self.center_of_mass = Transform::from_parts(Translation3::from(offset), Quaternion::identity());
        self
    }

    /// Returns the type of this body
    pub fn get_body_type(&self) -> RigidBodyType {
        if self.flags.contains(BodyFlags::KINEMATIC) {
            RigidBodyType::Kinematic
        } else {
            RigidBodyType::Dynamic
        }
    }

    /// Returns the flags
    pub fn get_flags(&self) -> BodyFlags {
        self.flags
    }

    /// Replaces the flags
    pub fn set_flags(&mut self, flags: BodyFlags) {
        self.flags = flags;
        self.inv_mass = if self.is_kinematic() || self.mass <= 0.0 { 0.0 } else { 1.0 / self.mass };
    }

    /// Returns true if impulses are ignored
    pub fn is_kinematic(&self) -> bool {
        self.flags.contains(BodyFlags::KINEMATIC)
    }

    /// Returns the actor pose
    pub fn get_pose(&self) -> Transform {
        self.pose
    }

    /// Sets the actor pose
    pub fn set_pose(&mut self, pose: Transform) {
        self.pose = pose;
    }

    /// Returns the world-space centre of mass
    pub fn get_center_of_mass_world(&self) -> Point3 {
        (self.pose * self.center_of_mass) * Point3::origin()
    }

    /// Sets the linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector3) {
        self.linear_velocity = velocity;
    }

    /// Sets the angular velocity
    pub fn set_angular_velocity(&mut self, velocity: Vector3) {
        self.angular_velocity = velocity;
    }

    /// Sets the damping factors
    pub fn set_damping(&mut self, linear: f32, angular: f32) {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
    }

    /// Returns the inverse inertia tensor in world space
    pub fn get_inv_inertia_world(&self) -> Matrix3<f32> {
        if self.is_kinematic() || self.flags.contains(BodyFlags::LOCK_ROTATION) {
            return Matrix3::zeros();
        }
        let inv = |v: f32| if v > 0.0 { 1.0 / v } else { 0.0 };
        let local = Matrix3::from_diagonal(&Vector3::new(
            inv(self.inertia.x),
            inv(self.inertia.y),
            inv(self.inertia.z),
        ));
        let r = (self.pose.rotation * self.center_of_mass.rotation).to_rotation_matrix();
        r.matrix() * local * r.matrix().transpose()
    }

    /// Applies an impulse at a world-space point
    pub fn apply_impulse_at_point(&mut self, impulse: Vector3, point: Point3) {
        let r = point - self.get_center_of_mass_world();
        self.apply_impulse(impulse, r.cross(&impulse));
    }

    /// Advances the body by `dt`, adding gravity if enabled
    pub fn integrate(&mut self, dt: f32, gravity: Vector3) {
        if self.is_kinematic() {
            return;
        }

        if self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY) {
            self.linear_velocity += gravity * dt;
        }
        self.linear_velocity /= 1.0 + dt * self.linear_damping;
        self.angular_velocity /= 1.0 + dt * self.angular_damping;
        if self.flags.contains(BodyFlags::LOCK_ROTATION) {
            self.angular_velocity = Vector3::zeros();
        }

        // Integrate the centre of mass frame, then recover the actor frame
        let mut com = self.pose * self.center_of_mass;
        com.translation.vector += self.linear_velocity * dt;
        let angle = self.angular_velocity.norm() * dt;
        if angle > 0.0 {
            let axis = Unit::new_normalize(self.angular_velocity);
            com.rotation = Quaternion::from_axis_angle(&axis, angle) * com.rotation;
            com.rotation.renormalize();
        }
        self.pose = com * self.center_of_mass.inverse();
    }
}

impl ChassisBody for SimpleRigidBody {
    fn actor_id(&self) -> Option<ActorId> {
        self.id
    }

    fn global_pose(&self) -> Transform {
        self.pose
    }

    fn center_of_mass_local(&self) -> Transform {
        self.center_of_mass
    }

    fn linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn apply_impulse(&mut self, linear: Vector3, angular: Vector3) {
        if self.is_kinematic() {
            return;
        }
        // Δv = J / m, Δω = I⁻¹ L
        self.linear_velocity += linear * self.inv_mass;
        self.angular_velocity += self.get_inv_inertia_world() * angular;
    }
}
