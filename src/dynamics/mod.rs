//! Per-substep vehicle models.
//!
//! Each module here is a pure function of configuration plus the state it
//! is handed; the vehicle stepper in [`crate::vehicle`] calls them in order.

pub mod steering;
pub mod suspension;
pub mod tire;
pub mod sticky;
pub mod differential;
pub mod drivetrain;
pub mod gearbox;

pub use self::steering::{ackermann_steer_angles, AxleSteer};
pub use self::suspension::{SuspensionContact, SuspensionInput};
pub use self::tire::{
    CombinedSlipTireModel, LinearTireModel, TireForceInput, TireForceModel, TireForces, TireSlips,
};
pub use self::sticky::StickyTireState;
pub use self::drivetrain::{DrivenWheel, DrivetrainSolution, EngineInput};
pub use self::gearbox::{GearboxOutput, GearboxState};
