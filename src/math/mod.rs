pub mod linear;
mod lookup;

pub use lookup::LookupTable;

/// Three component vector used for positions, directions, forces and velocities
pub type Vector3 = nalgebra::Vector3<f32>;

/// World or local space point
pub type Point3 = nalgebra::Point3<f32>;

/// Unit quaternion rotation
pub type Quaternion = nalgebra::UnitQuaternion<f32>;

/// Rigid transform (rotation followed by translation)
pub type Transform = nalgebra::Isometry3<f32>;

/// Floor used to keep denominators and normalizations away from zero
pub const EPSILON: f32 = 1.0e-6;

/// Linearly interpolates between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Returns the sign of a value, with zero mapping to zero
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Returns true if the vector has unit length within a loose tolerance
#[inline]
pub fn is_unit(v: &Vector3) -> bool {
    (v.norm_squared() - 1.0).abs() < 1.0e-3
}

/// Rotation of `angle` radians about `axis`, which must be unit length
#[inline]
pub fn axis_angle(axis: &Vector3, angle: f32) -> Quaternion {
    Quaternion::from_axis_angle(&nalgebra::Unit::new_unchecked(*axis), angle)
}
