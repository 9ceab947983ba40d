pub mod math;
pub mod core;
pub mod bodies;
pub mod scene;
pub mod surface;
pub mod components;
pub mod dynamics;
pub mod vehicle;

/// Re-export common types for easier usage
pub use crate::core::{VehicleTuningContext, WheelIndex, SceneQuery, ChassisBody, WheelPoseSink};
pub use crate::bodies::{SimpleRigidBody, RigidBodyType};
pub use crate::surface::{FrictionPairs, MaterialId, SurfaceType, TireType};
pub use crate::vehicle::{Vehicle, VehicleDesc, DriveDesc, UpdateContext};
pub use crate::math::Vector3;

/// Error types for vehicle setup
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum VehicleError {
        #[error("Invalid wheel {wheel}: {reason}")]
        InvalidWheel { wheel: usize, reason: String },

        #[error("Invalid suspension {wheel}: {reason}")]
        InvalidSuspension { wheel: usize, reason: String },

        #[error("Invalid tire {wheel}: {reason}")]
        InvalidTire { wheel: usize, reason: String },

        #[error("Invalid engine: {0}")]
        InvalidEngine(String),

        #[error("Invalid gears: {0}")]
        InvalidGears(String),

        #[error("Invalid autobox: {0}")]
        InvalidAutobox(String),

        #[error("Invalid clutch: {0}")]
        InvalidClutch(String),

        #[error("Invalid differential: {0}")]
        InvalidDifferential(String),

        #[error("Invalid Ackermann geometry: {0}")]
        InvalidAckermann(String),

        #[error("Invalid tuning: {0}")]
        InvalidTuning(String),

        #[error("Invalid friction table: {0}")]
        InvalidFrictionTable(String),

        #[error("Expected {expected} wheels, found {found}")]
        WheelCountMismatch { expected: usize, found: usize },

        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),
    }
}

/// Result type for vehicle setup operations
pub type Result<T> = std::result::Result<T, error::VehicleError>;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
