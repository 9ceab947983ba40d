use crate::bodies::RigidBodyType;
use crate::core::{ActorId, QueryFilter, RaycastHit, SceneQuery, SuspensionRay};
use crate::math::{Point3, Vector3, EPSILON};
use crate::surface::MaterialId;

/// An infinite plane defined by a normal and distance from origin
#[derive(Debug, Clone)]
pub struct GroundPlane {
    /// The normal vector of the plane (always normalized)
    normal: Vector3,

    /// The distance from the origin to the plane along the normal
    distance: f32,

    /// Surface material reported to the tire model
    material: MaterialId,

    /// Owning body, if the plane is part of one
    actor: Option<ActorId>,

    /// How the owning body is simulated
    actor_type: RigidBodyType,
}

impl GroundPlane {
    /// Creates a new plane with the given normal and distance
    pub fn new(normal: Vector3, distance: f32, material: MaterialId) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
            material,
            actor: None,
            actor_type: RigidBodyType::Static,
        }
    }

    /// Creates a horizontal plane at height `y`
    pub fn horizontal(y: f32, material: MaterialId) -> Self {
        Self::new(Vector3::new(0.0, 1.0, 0.0), y, material)
    }

    /// Creates a new plane from a normal and a point on the plane
    pub fn from_point_normal(point: Point3, normal: Vector3, material: MaterialId) -> Self {
        let normal = normal.normalize();
        let distance = normal.dot(&point.coords);
        Self::new(normal, distance, material)
    }

    /// Attaches the plane to a body
    pub fn with_actor(mut self, actor: ActorId, actor_type: RigidBodyType) -> Self {
        self.actor = Some(actor);
        self.actor_type = actor_type;
        self
    }

    /// Returns the normal of the plane
    pub fn get_normal(&self) -> Vector3 {
        self.normal
    }

    /// Returns the signed distance from a point to the plane
    pub fn signed_distance_to(&self, point: &Point3) -> f32 {
        self.normal.dot(&point.coords) - self.distance
    }

    /// Intersects a ray with the front face of the plane
    pub fn raycast(&self, ray: &SuspensionRay) -> Option<RaycastHit> {
        let denom = self.normal.dot(&ray.direction);
        // Rays parallel to or leaving the front face miss
        if denom > -EPSILON {
            return None;
        }

        let t = -self.signed_distance_to(&ray.origin) / denom;
        if t < 0.0 || t > ray.length {
            return None;
        }

        Some(RaycastHit {
            distance: t,
            point: ray.point_at(t),
            normal: self.normal,
            material: self.material,
            actor: self.actor,
            actor_type: self.actor_type,
        })
    }
}

/// A scene made of ground planes
#[derive(Debug, Clone, Default)]
pub struct PlaneScene {
    planes: Vec<GroundPlane>,
}

impl PlaneScene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plane
    pub fn add_plane(&mut self, plane: GroundPlane) -> &mut Self {
        self.planes.push(plane);
        self
    }

    /// Returns the planes
    pub fn planes(&self) -> &[GroundPlane] {
        &self.planes
    }
}

impl SceneQuery for PlaneScene {
    fn raycast(&self, ray: &SuspensionRay, filter: &QueryFilter) -> Option<RaycastHit> {
        self.planes
            .iter()
            .filter(|p| p.actor.is_none() || p.actor != filter.exclude_actor)
            .filter_map(|p| p.raycast(ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
