//! Reference raycast collaborators made of infinite planes.

mod plane;

pub use self::plane::{GroundPlane, PlaneScene};
